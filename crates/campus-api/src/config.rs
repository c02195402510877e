// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::{Argon2Config, JwtConfig, MIN_PASSWORD_LENGTH};
use crate::authz::EngineConfig;

// =============================================================================
// ApiConfig
// =============================================================================

/// Configuration for the API server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host address.
    pub host: IpAddr,
    /// Server port.
    pub port: u16,
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Allowed CORS origins. Empty or `"*"` allows any origin.
    pub cors_origins: Vec<String>,
    /// Token configuration.
    pub jwt: JwtConfig,
    /// Password hashing cost.
    pub password: Argon2Config,
    /// Minimum password length.
    pub min_password_length: usize,
    /// Authorization engine settings.
    pub authorization: EngineConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 3000,
            request_timeout_secs: 30,
            cors_origins: Vec::new(),
            jwt: JwtConfig::default(),
            password: Argon2Config::default(),
            min_password_length: MIN_PASSWORD_LENGTH,
            authorization: EngineConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns the request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Sets the host address.
    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the token configuration.
    pub fn with_jwt(mut self, jwt: JwtConfig) -> Self {
        self.jwt = jwt;
        self
    }

    /// Sets the password hashing cost.
    pub fn with_password(mut self, password: Argon2Config) -> Self {
        self.password = password;
        self
    }

    /// Sets the authorization engine settings.
    pub fn with_authorization(mut self, authorization: EngineConfig) -> Self {
        self.authorization = authorization;
        self
    }

    /// Returns `true` if any origin may call the API.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == "*")
    }
}
