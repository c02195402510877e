// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema definitions.
//!
//! # Schema Structure
//!
//! ```text
//! CampusConfig
//! ├── server: ServerConfig
//! ├── security: SecurityConfig
//! │   ├── jwt: JwtConfig
//! │   └── password: PasswordConfig
//! ├── authorization: AuthorizationConfig
//! ├── logging: LoggingConfig
//! └── seed: SeedConfig
//! ```

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

// =============================================================================
// Constants
// =============================================================================

/// Default HTTP port.
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default token lifetime in seconds.
pub const DEFAULT_JWT_TTL_SECS: u64 = 3600;

/// Default token issuer.
pub const DEFAULT_JWT_ISSUER: &str = "campus";

/// Minimum password length accepted for accounts.
pub const DEFAULT_PASSWORD_MIN_LENGTH: usize = 8;

/// Default argon2 memory cost in KiB.
pub const DEFAULT_ARGON2_MEMORY_KIB: u32 = 19_456;

/// Default argon2 iteration count.
pub const DEFAULT_ARGON2_ITERATIONS: u32 = 2;

/// Default argon2 lane count.
pub const DEFAULT_ARGON2_PARALLELISM: u32 = 1;

// =============================================================================
// Top-Level Configuration
// =============================================================================

/// The root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CampusConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Token and password settings.
    #[serde(default)]
    pub security: SecurityConfig,

    /// Authorization engine settings.
    #[serde(default)]
    pub authorization: AuthorizationConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Reference data loaded into the store at startup.
    #[serde(default)]
    pub seed: SeedConfig,
}

impl CampusConfig {
    /// Validates the entire configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.server.validate()?;
        self.security.validate()?;
        self.seed.validate(self.security.password.min_length)?;
        Ok(())
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Allowed CORS origins. Empty disables CORS handling.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))
}

fn default_port() -> u16 {
    DEFAULT_SERVER_PORT
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl ServerConfig {
    /// Validates the server configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout_secs",
                "cannot be zero",
            ));
        }
        Ok(())
    }

    /// Returns the request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns the socket address.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: DEFAULT_SERVER_PORT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            cors_origins: Vec::new(),
        }
    }
}

// =============================================================================
// Security Configuration
// =============================================================================

/// Token and password settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityConfig {
    /// Token configuration.
    #[serde(default)]
    pub jwt: JwtConfig,

    /// Password hashing configuration.
    #[serde(default)]
    pub password: PasswordConfig,
}

impl SecurityConfig {
    /// Validates the security configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.jwt.validate()?;
        self.password.validate()?;
        Ok(())
    }
}

/// Token configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JwtConfig {
    /// Signing secret. Required.
    #[serde(default)]
    pub secret: Option<SecretValue>,

    /// Token issuer.
    #[serde(default = "default_jwt_issuer")]
    pub issuer: String,

    /// Token lifetime in seconds.
    #[serde(default = "default_jwt_ttl")]
    pub ttl_secs: u64,

    /// Signing algorithm.
    #[serde(default)]
    pub algorithm: JwtAlgorithm,

    /// Clock skew tolerance in seconds.
    #[serde(default)]
    pub leeway_secs: u64,
}

fn default_jwt_issuer() -> String {
    DEFAULT_JWT_ISSUER.to_string()
}

fn default_jwt_ttl() -> u64 {
    DEFAULT_JWT_TTL_SECS
}

impl JwtConfig {
    /// Validates the token configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        match &self.secret {
            None => return Err(ConfigError::missing_field("security.jwt.secret")),
            Some(secret) if secret.raw().is_empty() => {
                return Err(ConfigError::validation(
                    "security.jwt.secret",
                    "cannot be empty",
                ))
            }
            Some(_) => {}
        }
        if self.ttl_secs == 0 {
            return Err(ConfigError::validation("security.jwt.ttl_secs", "cannot be zero"));
        }
        if self.issuer.trim().is_empty() {
            return Err(ConfigError::validation("security.jwt.issuer", "cannot be empty"));
        }
        Ok(())
    }

    /// Returns the token lifetime as a Duration.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: None,
            issuer: default_jwt_issuer(),
            ttl_secs: DEFAULT_JWT_TTL_SECS,
            algorithm: JwtAlgorithm::default(),
            leeway_secs: 0,
        }
    }
}

/// Token signing algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JwtAlgorithm {
    /// HMAC using SHA-256.
    #[default]
    HS256,
    /// HMAC using SHA-384.
    HS384,
    /// HMAC using SHA-512.
    HS512,
}

/// Password hashing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PasswordConfig {
    /// Minimum accepted password length.
    #[serde(default = "default_min_length")]
    pub min_length: usize,

    /// Argon2 memory cost in KiB.
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,

    /// Argon2 iteration count.
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Argon2 degree of parallelism.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

fn default_min_length() -> usize {
    DEFAULT_PASSWORD_MIN_LENGTH
}

fn default_memory_kib() -> u32 {
    DEFAULT_ARGON2_MEMORY_KIB
}

fn default_iterations() -> u32 {
    DEFAULT_ARGON2_ITERATIONS
}

fn default_parallelism() -> u32 {
    DEFAULT_ARGON2_PARALLELISM
}

impl PasswordConfig {
    /// Validates the password configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.min_length == 0 {
            return Err(ConfigError::validation(
                "security.password.min_length",
                "cannot be zero",
            ));
        }
        if self.iterations == 0 {
            return Err(ConfigError::validation(
                "security.password.iterations",
                "cannot be zero",
            ));
        }
        if self.parallelism == 0 {
            return Err(ConfigError::validation(
                "security.password.parallelism",
                "cannot be zero",
            ));
        }
        if self.memory_kib < 8 * self.parallelism {
            return Err(ConfigError::validation(
                "security.password.memory_kib",
                "must be at least 8 KiB per lane",
            ));
        }
        Ok(())
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_PASSWORD_MIN_LENGTH,
            memory_kib: DEFAULT_ARGON2_MEMORY_KIB,
            iterations: DEFAULT_ARGON2_ITERATIONS,
            parallelism: DEFAULT_ARGON2_PARALLELISM,
        }
    }
}

// =============================================================================
// Authorization Configuration
// =============================================================================

/// Authorization engine settings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthorizationConfig {
    /// Decision used when neither roles nor voters decide.
    #[serde(default)]
    pub default_decision: DefaultDecision,

    /// How a role grant interacts with voter denials.
    #[serde(default)]
    pub conflict_resolution: ConflictResolution,
}

/// Fallback decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultDecision {
    /// Grant access.
    Allow,
    /// Refuse access.
    #[default]
    Deny,
}

impl DefaultDecision {
    /// Parses `allow` or `deny`, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "allow" => Some(DefaultDecision::Allow),
            "deny" => Some(DefaultDecision::Deny),
            _ => None,
        }
    }
}

/// Resolution between a role-based grant and a voter denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictResolution {
    /// A matching role grants access; voters are skipped.
    #[default]
    RoleAllowWins,
    /// Voters run even after a role grant; an explicit denial wins.
    VoterDenyWins,
}

// =============================================================================
// Logging Configuration
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the level as a filter directive.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parses a level name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Single-line compact text.
    Compact,
    /// JSON lines.
    Json,
}

// =============================================================================
// Seed Data
// =============================================================================

/// Reference data loaded into the store at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedConfig {
    /// Roles. Defaults to the four built-in roles.
    #[serde(default = "default_seed_roles")]
    pub roles: Vec<SeedRole>,

    /// University classes.
    #[serde(default)]
    pub classes: Vec<SeedClass>,

    /// Students.
    #[serde(default)]
    pub students: Vec<SeedStudent>,

    /// Accounts, typically at least one administrator.
    #[serde(default)]
    pub accounts: Vec<SeedAccount>,
}

/// A seeded role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedRole {
    /// Role ID.
    pub id: i64,
    /// Role name.
    pub name: String,
}

/// A seeded class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedClass {
    /// Class ID.
    pub id: i64,
    /// Display name.
    pub name: String,
}

/// A seeded student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedStudent {
    /// Student ID.
    pub id: String,
    /// Full name.
    pub name: String,
    /// Class ID, if assigned.
    #[serde(default)]
    pub class_id: Option<i64>,
}

/// A seeded account. The password is hashed when the store is populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedAccount {
    /// Login name.
    pub username: String,
    /// Plaintext password.
    pub password: SecretValue,
    /// Role names.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Linked student ID.
    #[serde(default)]
    pub student_id: Option<String>,
}

/// The built-in roles with their canonical IDs.
pub fn default_seed_roles() -> Vec<SeedRole> {
    ["admin", "teacher", "student_member", "student_monitor"]
        .iter()
        .zip(1..)
        .map(|(name, id)| SeedRole {
            id,
            name: name.to_string(),
        })
        .collect()
}

impl SeedConfig {
    /// Validates referential integrity of the seed data.
    pub fn validate(&self, min_password_length: usize) -> ConfigResult<()> {
        let mut role_ids = HashSet::new();
        let mut role_names = HashSet::new();
        for role in &self.roles {
            if role.name.trim().is_empty() {
                return Err(ConfigError::validation("seed.roles.name", "cannot be empty"));
            }
            if !role_ids.insert(role.id) {
                return Err(ConfigError::duplicate_seed("role id", role.id));
            }
            if !role_names.insert(role.name.as_str()) {
                return Err(ConfigError::duplicate_seed("role", &role.name));
            }
        }

        let mut class_ids = HashSet::new();
        for class in &self.classes {
            if !class_ids.insert(class.id) {
                return Err(ConfigError::duplicate_seed("class", class.id));
            }
        }

        let mut student_ids = HashSet::new();
        for student in &self.students {
            if !student_ids.insert(student.id.as_str()) {
                return Err(ConfigError::duplicate_seed("student", &student.id));
            }
            if let Some(class_id) = student.class_id {
                if !class_ids.contains(&class_id) {
                    return Err(ConfigError::validation(
                        format!("seed.students.{}.class_id", student.id),
                        format!("unknown class {}", class_id),
                    ));
                }
            }
        }

        let mut usernames = HashSet::new();
        for account in &self.accounts {
            if account.username.trim().is_empty() {
                return Err(ConfigError::validation(
                    "seed.accounts.username",
                    "cannot be empty",
                ));
            }
            if !usernames.insert(account.username.as_str()) {
                return Err(ConfigError::duplicate_seed("account", &account.username));
            }
            if account.password.raw().chars().count() < min_password_length {
                return Err(ConfigError::validation(
                    format!("seed.accounts.{}.password", account.username),
                    format!("must be at least {} characters", min_password_length),
                ));
            }
            if let Some(role) = account.roles.iter().find(|r| !role_names.contains(r.as_str())) {
                return Err(ConfigError::validation(
                    format!("seed.accounts.{}.roles", account.username),
                    format!("unknown role '{}'", role),
                ));
            }
            if let Some(student_id) = &account.student_id {
                if !student_ids.contains(student_id.as_str()) {
                    return Err(ConfigError::validation(
                        format!("seed.accounts.{}.student_id", account.username),
                        format!("unknown student '{}'", student_id),
                    ));
                }
            }
        }

        Ok(())
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            roles: default_seed_roles(),
            classes: Vec::new(),
            students: Vec::new(),
            accounts: Vec::new(),
        }
    }
}

// =============================================================================
// Secret Value
// =============================================================================

/// A secret string that never appears in logs or debug output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretValue(String);

impl SecretValue {
    /// Creates a new secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the plain value.
    pub fn raw(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretValue(***)")
    }
}

impl std::fmt::Display for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("***")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> CampusConfig {
        let mut config = CampusConfig::default();
        config.security.jwt.secret = Some(SecretValue::new("a-secret-that-is-long-enough-for-hs256"));
        config
    }

    fn admin_account() -> SeedAccount {
        SeedAccount {
            username: "admin".to_string(),
            password: SecretValue::new("admin-password"),
            roles: vec!["admin".to_string()],
            student_id: None,
        }
    }

    #[test]
    fn test_campus_config_default() {
        let config = CampusConfig::default();
        assert_eq!(config.server.port, DEFAULT_SERVER_PORT);
        assert_eq!(config.authorization.default_decision, DefaultDecision::Deny);
        assert_eq!(
            config.authorization.conflict_resolution,
            ConflictResolution::RoleAllowWins
        );
        assert_eq!(config.seed.roles.len(), 4);
        assert_eq!(config.seed.roles[0], SeedRole { id: 1, name: "admin".to_string() });
    }

    #[test]
    fn test_jwt_secret_required() {
        let config = CampusConfig::default();
        assert!(matches!(config.validate(), Err(ConfigError::MissingField { .. })));

        let mut config = valid_config();
        config.security.jwt.secret = Some(SecretValue::new(""));
        assert!(matches!(config.validate(), Err(ConfigError::Validation { .. })));

        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_jwt_ttl_nonzero() {
        let mut config = valid_config();
        config.security.jwt.ttl_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_password_config_validation() {
        let mut config = valid_config();
        config.security.password.parallelism = 4;
        config.security.password.memory_kib = 16;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_seed_account_unknown_role() {
        let mut config = valid_config();
        let mut account = admin_account();
        account.roles = vec!["janitor".to_string()];
        config.seed.accounts.push(account);

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("janitor"));
    }

    #[test]
    fn test_seed_account_weak_password() {
        let mut config = valid_config();
        let mut account = admin_account();
        account.password = SecretValue::new("short");
        config.seed.accounts.push(account);

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_seed_duplicates() {
        let mut config = valid_config();
        config.seed.accounts.push(admin_account());
        config.seed.accounts.push(admin_account());
        assert!(matches!(config.validate(), Err(ConfigError::DuplicateSeed { .. })));

        let mut config = valid_config();
        config.seed.roles.push(SeedRole { id: 1, name: "other".to_string() });
        assert!(matches!(config.validate(), Err(ConfigError::DuplicateSeed { .. })));
    }

    #[test]
    fn test_seed_student_references() {
        let mut config = valid_config();
        config.seed.students.push(SeedStudent {
            id: "S1".to_string(),
            name: "Dana".to_string(),
            class_id: Some(7),
        });
        assert!(config.validate().is_err());

        config.seed.classes.push(SeedClass { id: 7, name: "CS-7".to_string() });
        assert!(config.validate().is_ok());

        let mut account = admin_account();
        account.student_id = Some("S404".to_string());
        config.seed.accounts.push(account);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_decision_parse() {
        assert_eq!(DefaultDecision::parse("ALLOW"), Some(DefaultDecision::Allow));
        assert_eq!(DefaultDecision::parse(" deny "), Some(DefaultDecision::Deny));
        assert_eq!(DefaultDecision::parse("abstain"), None);
    }

    #[test]
    fn test_secret_value_redacted() {
        let secret = SecretValue::new("hunter22");
        assert_eq!(secret.to_string(), "***");
        assert!(!format!("{:?}", secret).contains("hunter22"));
        assert_eq!(secret.raw(), "hunter22");
    }

    #[test]
    fn test_log_level() {
        assert_eq!(LogLevel::Info.as_str(), "info");
        assert_eq!(LogLevel::parse("warning"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("loud"), None);
    }
}
