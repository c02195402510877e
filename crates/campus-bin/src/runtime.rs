// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Service runtime orchestration.
//!
//! Turns a loaded [`CampusConfig`] into a running API server:
//!
//! - Map configuration sections onto [`ApiConfig`]
//! - Seed the in-memory store with roles, classes, students and accounts
//! - Build the shared [`AppState`] and validate the policy table
//! - Serve until a shutdown signal arrives

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use tracing::{debug, info};

use campus_api::{
    ApiConfig, ApiServer, AppState, Argon2Config, Argon2Hasher, ConflictResolution, Decision,
    EngineConfig, JwtConfig, PasswordHasher,
};
use campus_config::{load_config, CampusConfig, DefaultDecision, JwtAlgorithm};
use campus_core::{
    AccountId, ClassId, MemoryStore, NewAccount, Role, RoleId, Student, StudentId,
    UniversityClass,
};

use crate::error::{BinError, BinResult};
use crate::shutdown::{ShutdownCoordinator, ShutdownGuard};

// =============================================================================
// Configuration Mapping
// =============================================================================

/// Maps the file configuration onto the API server configuration.
///
/// # Errors
///
/// Returns a configuration error if no signing secret is set or the token
/// lifetime does not fit the claim range.
pub fn api_config(config: &CampusConfig) -> BinResult<ApiConfig> {
    let jwt = &config.security.jwt;
    let secret = jwt
        .secret
        .as_ref()
        .ok_or_else(|| BinError::config("security.jwt.secret is required"))?;

    if i64::try_from(jwt.ttl_secs).is_err() {
        return Err(BinError::config("security.jwt.ttl_secs is out of range"));
    }

    let algorithm = match jwt.algorithm {
        JwtAlgorithm::HS256 => Algorithm::HS256,
        JwtAlgorithm::HS384 => Algorithm::HS384,
        JwtAlgorithm::HS512 => Algorithm::HS512,
    };

    let default_decision = match config.authorization.default_decision {
        DefaultDecision::Allow => Decision::Allow,
        DefaultDecision::Deny => Decision::Deny,
    };
    let conflict_resolution = match config.authorization.conflict_resolution {
        campus_config::ConflictResolution::RoleAllowWins => ConflictResolution::RoleAllowWins,
        campus_config::ConflictResolution::VoterDenyWins => ConflictResolution::VoterDenyWins,
    };

    let password = &config.security.password;

    Ok(ApiConfig {
        host: config.server.host,
        port: config.server.port,
        request_timeout_secs: config.server.request_timeout_secs,
        cors_origins: config.server.cors_origins.clone(),
        jwt: JwtConfig::new(secret.raw())
            .with_issuer(jwt.issuer.clone())
            .with_ttl(Duration::from_secs(jwt.ttl_secs))
            .with_algorithm(algorithm)
            .with_leeway(jwt.leeway_secs),
        password: Argon2Config {
            memory_kib: password.memory_kib,
            iterations: password.iterations,
            parallelism: password.parallelism,
        },
        min_password_length: password.min_length,
        authorization: EngineConfig::new(default_decision, conflict_resolution)?,
    })
}

// =============================================================================
// Seeding
// =============================================================================

const ARGON2_PHC_PREFIX: &str = "$argon2";

/// Parses a pre-hashed seed password the way login will read it.
fn check_phc_hash(hash: &str) -> Result<(), argon2::password_hash::Error> {
    let parsed = argon2::PasswordHash::new(hash)?;
    argon2::Params::try_from(&parsed)?;
    Ok(())
}

/// Builds an in-memory store populated from the seed section.
///
/// Accounts receive sequential IDs starting at 1 in file order; their roles
/// are looked up by name. Passwords already in Argon2 PHC form (as printed
/// by `campus hash-password`) are stored as-is.
pub fn seed_store(config: &CampusConfig, hasher: &dyn PasswordHasher) -> BinResult<MemoryStore> {
    let seed = &config.seed;
    let store = MemoryStore::new();

    for role in &seed.roles {
        store.insert_role(Role::new(role.id, role.name.clone()));
    }
    for class in &seed.classes {
        store.insert_class(UniversityClass {
            id: ClassId::new(class.id),
            name: class.name.clone(),
        });
    }
    for student in &seed.students {
        store.insert_student(Student {
            id: StudentId::new(student.id.clone()),
            name: student.name.clone(),
            class_id: student.class_id.map(ClassId::new),
        });
    }

    for (index, account) in seed.accounts.iter().enumerate() {
        let role_ids = account
            .roles
            .iter()
            .map(|name| {
                seed.roles
                    .iter()
                    .find(|role| &role.name == name)
                    .map(|role| RoleId::new(role.id))
                    .ok_or_else(|| {
                        BinError::config(format!(
                            "Account '{}' references unknown role '{}'",
                            account.username, name
                        ))
                    })
            })
            .collect::<BinResult<Vec<_>>>()?;

        let password = account.password.raw();
        let password_hash = if password.starts_with(ARGON2_PHC_PREFIX) {
            check_phc_hash(password).map_err(|reason| {
                BinError::config(format!(
                    "Account '{}' has an unusable password hash: {}",
                    account.username, reason
                ))
            })?;
            password.to_string()
        } else {
            hasher.hash(password)?
        };
        let id = AccountId::new(index as i64 + 1);

        store.insert_account(
            id,
            NewAccount {
                username: account.username.clone(),
                password_hash,
                student_id: account.student_id.clone().map(StudentId::new),
            },
            &role_ids,
        )?;
        debug!(account = %account.username, id = %id, roles = ?account.roles, "Seeded account");
    }

    info!(
        roles = seed.roles.len(),
        classes = seed.classes.len(),
        students = seed.students.len(),
        accounts = seed.accounts.len(),
        "Store seeded"
    );

    Ok(store)
}

/// Builds the shared application state from configuration.
pub fn build_state(config: &CampusConfig) -> BinResult<AppState> {
    let api = api_config(config)?;
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new(api.password)?);
    let store = seed_store(config, hasher.as_ref())?;

    let state = AppState::builder()
        .config(api)
        .store(Arc::new(store))
        .hasher(hasher)
        .build()?;

    Ok(state)
}

// =============================================================================
// CampusRuntime
// =============================================================================

/// Runs the API server until shutdown is signaled.
pub struct CampusRuntime {
    config: Arc<CampusConfig>,
    shutdown: ShutdownCoordinator,
}

impl CampusRuntime {
    /// Creates a new runtime.
    pub fn new(config: CampusConfig) -> Self {
        Self {
            config: Arc::new(config),
            shutdown: ShutdownCoordinator::new(),
        }
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &CampusConfig {
        &self.config
    }

    /// Returns the shutdown coordinator.
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Builds the server and serves until shutdown.
    pub async fn run(self) -> BinResult<()> {
        info!("Starting campus service v{}", crate::VERSION);

        let state = build_state(&self.config)?;
        let server = ApiServer::new(state);
        info!(
            addr = %server.addr(),
            default_decision = ?self.config.authorization.default_decision,
            "Campus service initialized"
        );

        let signals = {
            let coordinator = self.shutdown.clone();
            tokio::spawn(async move { coordinator.wait_for_shutdown().await })
        };

        let guard = ShutdownGuard::new(self.shutdown.clone());
        let result = server
            .run_with_shutdown(self.shutdown.shutdown_signal())
            .await
            .map_err(|e| BinError::from(e).with_context("API server"));
        guard.disarm();

        signals.abort();
        info!("Campus service shutdown complete");

        result
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for constructing the runtime.
#[derive(Default)]
pub struct RuntimeBuilder {
    config_path: Option<PathBuf>,
    config: Option<CampusConfig>,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration file path.
    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the configuration directly.
    pub fn config(mut self, config: CampusConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Builds the runtime, loading the configuration file if needed.
    pub fn build(self) -> BinResult<CampusRuntime> {
        let config = match self.config {
            Some(config) => config,
            None => {
                let path = self
                    .config_path
                    .ok_or_else(|| BinError::config("No configuration provided"))?;
                load_config(&path).map_err(|e| {
                    BinError::from(e).with_context(format!("loading {}", path.display()))
                })?
            }
        };

        Ok(CampusRuntime::new(config))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use campus_config::{SecretValue, SeedAccount, SeedClass, SeedStudent};
    use campus_core::{AccountStore, DirectoryStore};

    fn test_config() -> CampusConfig {
        let mut config = CampusConfig::default();
        config.security.jwt.secret = Some(SecretValue::new("runtime-test-secret-with-enough-bytes"));
        config.security.password.memory_kib = 8;
        config.security.password.iterations = 1;
        config.security.password.parallelism = 1;
        config.seed.classes = vec![SeedClass {
            id: 7,
            name: "Physics 101".to_string(),
        }];
        config.seed.students = vec![SeedStudent {
            id: "S-1".to_string(),
            name: "Ada".to_string(),
            class_id: Some(7),
        }];
        config.seed.accounts = vec![
            SeedAccount {
                username: "admin".to_string(),
                password: SecretValue::new("admin-password"),
                roles: vec!["admin".to_string()],
                student_id: None,
            },
            SeedAccount {
                username: "ada".to_string(),
                password: SecretValue::new("student-password"),
                roles: vec!["student_member".to_string(), "student_monitor".to_string()],
                student_id: Some("S-1".to_string()),
            },
        ];
        config
    }

    #[test]
    fn test_api_config_requires_secret() {
        let config = CampusConfig::default();
        let err = api_config(&config).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_api_config_maps_sections() {
        let mut config = test_config();
        config.security.jwt.algorithm = JwtAlgorithm::HS512;
        config.security.jwt.ttl_secs = 600;
        config.authorization.default_decision = DefaultDecision::Allow;
        config.authorization.conflict_resolution = campus_config::ConflictResolution::VoterDenyWins;

        let api = api_config(&config).unwrap();
        assert_eq!(api.jwt.algorithm, Algorithm::HS512);
        assert_eq!(api.jwt.ttl_secs, 600);
        assert_eq!(api.authorization.default_decision, Decision::Allow);
        assert_eq!(
            api.authorization.conflict_resolution,
            ConflictResolution::VoterDenyWins
        );
        assert_eq!(api.port, config.server.port);
        assert_eq!(api.min_password_length, config.security.password.min_length);
    }

    #[tokio::test]
    async fn test_seed_store_assigns_ids_and_roles() {
        let config = test_config();
        let hasher = Argon2Hasher::for_testing();
        let store = seed_store(&config, &hasher).unwrap();

        let ada = store.find_account_by_username("ada").await.unwrap().unwrap();
        assert_eq!(ada.id, AccountId::new(2));
        assert_eq!(ada.student_id, Some(StudentId::new("S-1")));
        assert!(hasher.verify("student-password", &ada.password_hash).unwrap());

        let roles = store.find_roles_for_account(ada.id).await.unwrap();
        let names: Vec<_> = roles.iter().map(|r| r.name.as_str()).collect();
        assert!(names.contains(&"student_member"));
        assert!(names.contains(&"student_monitor"));

        assert!(store.class_exists(ClassId::new(7)).await.unwrap());
        assert_eq!(store.students_in_class(ClassId::new(7)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_seed_store_keeps_prehashed_password() {
        let hasher = Argon2Hasher::for_testing();
        let hash = hasher.hash("prehashed-password").unwrap();
        let mut config = test_config();
        config.seed.accounts[0].password = SecretValue::new(hash.clone());

        let store = seed_store(&config, &hasher).unwrap();
        let admin = store.find_account_by_username("admin").await.unwrap().unwrap();
        assert_eq!(admin.password_hash, hash);
        assert!(hasher.verify("prehashed-password", &admin.password_hash).unwrap());
    }

    #[test]
    fn test_seed_store_rejects_malformed_prehashed_password() {
        for hash in [
            "$argon2id$v=19$m=bad$xx$yy",
            "$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ$!!!",
        ] {
            let mut config = test_config();
            config.seed.accounts[0].password = SecretValue::new(hash);

            let result = seed_store(&config, &Argon2Hasher::for_testing());
            assert!(matches!(result, Err(BinError::Configuration(_))), "{hash}");
        }
    }

    #[test]
    fn test_seed_store_rejects_unknown_role() {
        let mut config = test_config();
        config.seed.accounts[0].roles = vec!["janitor".to_string()];

        let result = seed_store(&config, &Argon2Hasher::for_testing());
        assert!(matches!(result, Err(BinError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_build_state_validates_policies() {
        let state = build_state(&test_config()).unwrap();
        ApiServer::new(state).validate().await.unwrap();
    }

    #[test]
    fn test_builder_requires_config() {
        assert!(RuntimeBuilder::new().build().is_err());
        let runtime = RuntimeBuilder::new().config(test_config()).build().unwrap();
        assert!(!runtime.shutdown().is_shutdown_initiated());
    }

    #[test]
    fn test_builder_loads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("campus.yaml");
        std::fs::write(
            &path,
            "server:\n  port: 9099\nsecurity:\n  jwt:\n    secret: \"runtime-file-secret-with-enough-bytes\"\n",
        )
        .unwrap();

        let runtime = RuntimeBuilder::new().config_path(&path).build().unwrap();
        assert_eq!(runtime.config().server.port, 9099);

        let missing = RuntimeBuilder::new()
            .config_path(dir.path().join("absent.yaml"))
            .build();
        assert!(missing.is_err());
    }
}
