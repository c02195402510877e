// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use campus_api::ApiServer;
use campus_config::{CampusConfig, SecretValue};

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};
use crate::runtime::build_state;

/// Executes the `validate` command.
///
/// Loads the file, seeds a throwaway store and checks the endpoint policy
/// table against the seeded roles, without binding a port.
pub async fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;

    if !config_path.exists() {
        return Err(BinError::config(format!(
            "Configuration file not found: {}",
            config_path.display()
        )));
    }

    let config = campus_config::load_config(config_path)
        .map_err(|e| BinError::from(e).with_context("Configuration validation failed"))?;

    let state = build_state(&config)?;
    ApiServer::new(state)
        .validate()
        .await
        .map_err(|e| BinError::from(e).with_context("Policy validation failed"))?;

    let warnings = collect_warnings(&config);
    let shown = args.show_config.then(|| redacted(&config));

    match args.format {
        OutputFormat::Text => {
            println!("✓ Configuration is valid: {}", config_path.display());
            println!();
            println!("Summary:");
            println!("  Listen: {}", config.server.socket_addr());
            println!("  Token issuer: {}", config.security.jwt.issuer);
            println!("  Token lifetime: {}s", config.security.jwt.ttl_secs);
            println!(
                "  Default decision: {:?}",
                config.authorization.default_decision
            );
            println!(
                "  Conflict resolution: {:?}",
                config.authorization.conflict_resolution
            );
            println!("  Roles: {}", config.seed.roles.len());
            println!("  Accounts: {}", config.seed.accounts.len());

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }

            if let Some(shown) = shown {
                println!();
                println!("Parsed configuration:");
                println!("{}", to_pretty_json(&shown)?);
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": config_path.display().to_string(),
                "summary": {
                    "listen": config.server.socket_addr().to_string(),
                    "issuer": config.security.jwt.issuer,
                    "ttl_secs": config.security.jwt.ttl_secs,
                    "default_decision": config.authorization.default_decision,
                    "conflict_resolution": config.authorization.conflict_resolution,
                    "role_count": config.seed.roles.len(),
                    "account_count": config.seed.accounts.len(),
                },
                "warnings": warnings,
                "config": shown,
            });
            println!("{}", to_pretty_json(&output)?);
        }
    }

    Ok(())
}

/// Returns non-fatal findings worth reporting.
fn collect_warnings(config: &CampusConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.seed.accounts.is_empty() {
        warnings.push("No seed accounts configured; nobody can log in".to_string());
    }
    let has_admin = config
        .seed
        .accounts
        .iter()
        .any(|a| a.roles.iter().any(|r| r == campus_core::role_names::ADMIN));
    if !config.seed.accounts.is_empty() && !has_admin {
        warnings.push("No seed account holds the admin role".to_string());
    }
    if config
        .security
        .jwt
        .secret
        .as_ref()
        .is_some_and(|s| s.raw().len() < 32)
    {
        warnings.push("Token signing secret is shorter than 32 bytes".to_string());
    }
    if config.server.cors_origins.iter().any(|o| o == "*") {
        warnings.push("CORS allows any origin".to_string());
    }

    warnings
}

/// Clones the configuration with every secret masked.
fn redacted(config: &CampusConfig) -> CampusConfig {
    let mut config = config.clone();
    if config.security.jwt.secret.is_some() {
        config.security.jwt.secret = Some(SecretValue::new("***"));
    }
    for account in &mut config.seed.accounts {
        account.password = SecretValue::new("***");
    }
    config
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> BinResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| BinError::runtime(format!("Failed to render output: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_config::SeedAccount;

    fn config_with_secret(secret: &str) -> CampusConfig {
        let mut config = CampusConfig::default();
        config.security.jwt.secret = Some(SecretValue::new(secret));
        config
    }

    #[test]
    fn test_warnings_for_empty_seed() {
        let warnings = collect_warnings(&config_with_secret("x".repeat(48).as_str()));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("nobody can log in"));
    }

    #[test]
    fn test_warnings_for_short_secret_and_missing_admin() {
        let mut config = config_with_secret("short");
        config.seed.accounts.push(SeedAccount {
            username: "teacher".to_string(),
            password: SecretValue::new("teacher-password"),
            roles: vec!["teacher".to_string()],
            student_id: None,
        });

        let warnings = collect_warnings(&config);
        assert!(warnings.iter().any(|w| w.contains("admin role")));
        assert!(warnings.iter().any(|w| w.contains("shorter than 32 bytes")));
    }

    #[test]
    fn test_redacted_masks_secrets() {
        let mut config = config_with_secret("do-not-print-me");
        config.seed.accounts.push(SeedAccount {
            username: "admin".to_string(),
            password: SecretValue::new("admin-password"),
            roles: vec!["admin".to_string()],
            student_id: None,
        });

        let rendered = to_pretty_json(&redacted(&config)).unwrap();
        assert!(!rendered.contains("do-not-print-me"));
        assert!(!rendered.contains("admin-password"));
        assert!(rendered.contains("***"));
    }
}
