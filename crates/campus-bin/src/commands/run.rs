// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `run` command.

use tracing::info;

use crate::cli::Cli;
use crate::error::{BinError, BinResult};
use crate::logging::init_logging;
use crate::runtime::RuntimeBuilder;

/// Executes the `run` command to start the API server.
///
/// Logging is installed after the configuration loads so the file's
/// `logging` section applies; command-line flags still take precedence.
pub async fn run(cli: &Cli) -> BinResult<()> {
    let config = campus_config::load_config(&cli.config).map_err(|e| {
        BinError::from(e).with_context(format!("loading {}", cli.config.display()))
    })?;

    let level = cli.effective_log_level(config.logging.level.as_str());
    let format = cli.effective_log_format(config.logging.format.into());
    init_logging(level, format)?;

    info!(config = %cli.config.display(), "Starting campus service...");

    let runtime = RuntimeBuilder::new().config(config).build()?;
    runtime.run().await
}
