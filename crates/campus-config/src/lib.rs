// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # campus-config
//!
//! Configuration management for the campus access-control service.
//!
//! ## Features
//!
//! - **Schema Definition**: server, security, authorization, logging and seed sections
//! - **Multi-Format Support**: YAML, TOML, and JSON configuration files
//! - **Environment Overrides**: `CAMPUS_*` variables and `${VAR:default}` placeholders
//! - **Startup Validation**: missing secrets and broken seed references fail fast
//!
//! ## Quick Start
//!
//! ```no_run
//! use campus_config::loader::load_config;
//!
//! let config = load_config("campus.yaml").unwrap();
//! println!("Listening on {}", config.server.socket_addr());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, load_config_str, ConfigFormat, ConfigLoader};
pub use schema::{
    AuthorizationConfig, CampusConfig, ConflictResolution, DefaultDecision, JwtAlgorithm,
    JwtConfig, LogFormat, LogLevel, LoggingConfig, PasswordConfig, SecretValue, SecurityConfig,
    SeedAccount, SeedClass, SeedConfig, SeedRole, SeedStudent, ServerConfig,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
