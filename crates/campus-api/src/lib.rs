// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # campus-api
//!
//! REST API for the campus student-management service.
//!
//! Requests pass two route layers before reaching a handler:
//!
//! 1. [`middleware::AuthLayer`] verifies the bearer token and attaches the
//!    principal, unless the endpoint is exempt.
//! 2. [`middleware::AuthorizeLayer`] looks up the endpoint's
//!    [`authz::EndpointPolicy`] and asks the [`authz::AuthorizationEngine`]
//!    for a decision.
//!
//! ## Example
//!
//! ```rust,ignore
//! use campus_api::{ApiConfig, ApiServer, AppState};
//!
//! let state = AppState::builder()
//!     .config(ApiConfig::default().with_jwt(JwtConfig::new(secret)))
//!     .store(Arc::new(store))
//!     .build()?;
//!
//! ApiServer::new(state).run_with_shutdown(shutdown).await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod authz;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;
pub mod state;

pub use auth::{
    Argon2Config, Argon2Hasher, AuthContext, CredentialVerifier, Credentials, JwtConfig,
    PasswordHasher, RoleResolver, TokenService,
};
pub use authz::{
    default_policies, AuthorizationEngine, ConflictResolution, Decision, EndpointPolicy,
    EngineConfig, PolicyTable, Voter,
};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use server::{served_routes, ApiServer};
pub use state::{AppState, AppStateBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
