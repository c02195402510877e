// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use campus_core::{AccountStore, DirectoryStore};

use crate::auth::{Argon2Hasher, CredentialVerifier, PasswordHasher, RoleResolver, TokenService};
use crate::authz::{default_policies, AuthorizationEngine, PolicyTable};
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
///
/// Every service is built once at startup and shared through `Arc`s.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// Token issuing and verification.
    pub tokens: Arc<TokenService>,
    /// Credential checks.
    pub credentials: Arc<CredentialVerifier>,
    /// Role lookup.
    pub roles: RoleResolver,
    /// Authorization engine.
    pub engine: Arc<AuthorizationEngine>,
    /// Endpoint policies.
    pub policies: Arc<PolicyTable>,
    /// Account directory.
    pub directory: Arc<dyn DirectoryStore>,
}

impl AppState {
    /// Creates a new app state builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Returns the token service.
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Returns the password hasher.
    pub fn hasher(&self) -> &Arc<dyn PasswordHasher> {
        self.credentials.hasher()
    }

    /// Returns the account directory.
    pub fn directory(&self) -> &dyn DirectoryStore {
        self.directory.as_ref()
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing [`AppState`].
#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<ApiConfig>,
    accounts: Option<Arc<dyn AccountStore>>,
    directory: Option<Arc<dyn DirectoryStore>>,
    hasher: Option<Arc<dyn PasswordHasher>>,
    policies: Option<PolicyTable>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the backing store.
    pub fn store<S>(mut self, store: Arc<S>) -> Self
    where
        S: DirectoryStore + 'static,
    {
        let accounts: Arc<dyn AccountStore> = store.clone();
        let directory: Arc<dyn DirectoryStore> = store;
        self.accounts = Some(accounts);
        self.directory = Some(directory);
        self
    }

    /// Sets the password hasher. Defaults to Argon2id with the configured cost.
    pub fn hasher(mut self, hasher: Arc<dyn PasswordHasher>) -> Self {
        self.hasher = Some(hasher);
        self
    }

    /// Sets the policy table. Defaults to [`default_policies`].
    pub fn policies(mut self, policies: PolicyTable) -> Self {
        self.policies = Some(policies);
        self
    }

    /// Builds the state.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no store is set or any service
    /// rejects its configuration.
    pub fn build(self) -> ApiResult<AppState> {
        let config = self.config.unwrap_or_default();

        let (Some(accounts), Some(directory)) = (self.accounts, self.directory) else {
            return Err(ApiError::configuration("No account store configured"));
        };

        let tokens = Arc::new(TokenService::new(config.jwt.clone())?);

        let hasher: Arc<dyn PasswordHasher> = match self.hasher {
            Some(hasher) => hasher,
            None => Arc::new(Argon2Hasher::new(config.password)?),
        };

        let credentials = CredentialVerifier::new(accounts.clone(), hasher)?
            .with_min_password_length(config.min_password_length);

        let engine = AuthorizationEngine::new(config.authorization, accounts.clone())?;

        Ok(AppState {
            config: Arc::new(config),
            tokens,
            credentials: Arc::new(credentials),
            roles: RoleResolver::new(accounts),
            engine: Arc::new(engine),
            policies: Arc::new(self.policies.unwrap_or_else(default_policies)),
            directory,
        })
    }
}

// =============================================================================
// FromRef implementations for extracting parts of state
// =============================================================================

impl axum::extract::FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<ApiConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

// =============================================================================
// Tests
// =============================================================================
