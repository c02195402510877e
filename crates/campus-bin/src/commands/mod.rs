// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI command implementations.
//!
//! - `run`: Start the API server
//! - `validate`: Validate configuration and policies
//! - `version`: Show version information
//! - `hash-password` / `gen-secret`: Secret helpers for operators

mod run;
mod secret;
mod validate;
mod version;

pub use run::run;
pub use secret::{gen_secret, hash_password};
pub use validate::validate;
pub use version::version;

use crate::cli::{Cli, Commands};
use crate::error::BinResult;

/// Executes the appropriate command based on CLI arguments.
pub async fn execute(cli: Cli) -> BinResult<()> {
    match cli.effective_command() {
        Commands::Run => run::run(&cli).await,
        Commands::Validate(args) => validate::validate(&cli, args).await,
        Commands::Version => version::version(&cli),
        Commands::HashPassword(args) => secret::hash_password(&cli, args),
        Commands::GenSecret(args) => secret::gen_secret(&cli, args),
    }
}
