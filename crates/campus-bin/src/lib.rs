// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # campus-bin
//!
//! CLI binary for the campus access-control service.
//!
//! - CLI argument parsing with clap
//! - Configuration mapping and store seeding
//! - Graceful shutdown handling
//! - Logging initialization
//!
//! ## Architecture
//!
//! ```text
//!                    ┌─────────────┐
//!                    │   main.rs   │
//!                    └──────┬──────┘
//!                    ┌──────▼──────┐
//!                    │    cli.rs   │
//!                    └──────┬──────┘
//!               ┌───────────┼───────────┐
//!               ▼           ▼           ▼
//!        ┌──────────┐ ┌──────────┐ ┌──────────┐
//!        │ commands │ │ runtime  │ │ logging  │
//!        └──────────┘ └────┬─────┘ └──────────┘
//!                     ┌────▼─────┐
//!                     │ shutdown │
//!                     └──────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the server (default command)
//! campus -c /etc/campus/campus.yaml
//!
//! # Validate configuration and policies
//! campus validate --show-config
//!
//! # Pre-hash a seed password
//! campus hash-password --stdin < password.txt
//!
//! # Generate a signing secret
//! campus gen-secret
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::init_logging;
pub use runtime::{api_config, build_state, seed_store, CampusRuntime, RuntimeBuilder};
pub use shutdown::{ShutdownCoordinator, ShutdownGuard};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
