// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Username/password verification.

use std::sync::Arc;

use campus_core::{Account, AccountStore, Principal};
use serde::Deserialize;

use super::password::PasswordHasher;
use crate::error::{ApiError, ApiResult};

/// Returned when the submitted credentials fail the input policy.
pub const INVALID_CREDENTIALS: &str = "Invalid username or password.";

/// Returned for both an unknown username and a wrong password.
pub const INCORRECT_CREDENTIALS: &str = "Incorrect username or password.";

/// Default minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// A username/password pair as submitted by a client.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    /// Login name.
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

impl Credentials {
    /// Creates a credentials pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Checks credentials against stored password hashes.
#[derive(Clone)]
pub struct CredentialVerifier {
    store: Arc<dyn AccountStore>,
    hasher: Arc<dyn PasswordHasher>,
    min_password_length: usize,
    dummy_hash: Arc<str>,
}

impl CredentialVerifier {
    /// Creates a verifier.
    ///
    /// Hashes a throwaway password once so that lookups of unknown users
    /// still pay for one hash verification.
    pub fn new(store: Arc<dyn AccountStore>, hasher: Arc<dyn PasswordHasher>) -> ApiResult<Self> {
        let dummy_hash = hasher.hash("campus-dummy-password")?;

        Ok(Self {
            store,
            hasher,
            min_password_length: MIN_PASSWORD_LENGTH,
            dummy_hash: dummy_hash.into(),
        })
    }

    /// Sets the minimum password length.
    pub fn with_min_password_length(mut self, length: usize) -> Self {
        self.min_password_length = length;
        self
    }

    /// Returns the password hasher.
    pub fn hasher(&self) -> &Arc<dyn PasswordHasher> {
        &self.hasher
    }

    /// Returns `true` if the password satisfies the length policy.
    pub fn validate_password(&self, password: &str) -> bool {
        password.chars().count() >= self.min_password_length
    }

    /// Rejects a blank username or a password that fails the policy.
    pub fn validate_credentials(&self, credentials: &Credentials) -> ApiResult<()> {
        if credentials.username.trim().is_empty() || !self.validate_password(&credentials.password) {
            return Err(ApiError::bad_request(INVALID_CREDENTIALS));
        }
        Ok(())
    }

    /// Validates the credentials and returns the matching account.
    ///
    /// Unknown usernames and wrong passwords produce the same error.
    pub async fn verify_credentials(&self, credentials: &Credentials) -> ApiResult<Account> {
        self.validate_credentials(credentials)?;

        let account = self
            .store
            .find_account_by_username(&credentials.username)
            .await?;

        let Some(account) = account else {
            // Keep the cost of the unknown-user path equal to a real check.
            let _ = self.hasher.verify(&credentials.password, &self.dummy_hash);
            tracing::debug!(username = %credentials.username, "Login for unknown username");
            return Err(ApiError::unauthorized(INCORRECT_CREDENTIALS));
        };

        match self.hasher.verify(&credentials.password, &account.password_hash) {
            Ok(true) => Ok(account),
            Ok(false) => {
                tracing::debug!(account_id = %account.id, "Login with wrong password");
                Err(ApiError::unauthorized(INCORRECT_CREDENTIALS))
            }
            Err(e) => {
                tracing::error!(account_id = %account.id, error = %e, "Stored password hash is unusable");
                Err(ApiError::unauthorized(INCORRECT_CREDENTIALS))
            }
        }
    }

    /// Maps an account to the principal attached to its requests.
    pub fn convert_to_principal(account: &Account) -> Principal {
        Principal::new(account.id, account.username.clone(), account.roles.iter().cloned())
    }
}

impl std::fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVerifier")
            .field("store", &self.store.name())
            .field("min_password_length", &self.min_password_length)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::Argon2Hasher;
    use campus_core::{AccountId, MemoryStore, NewAccount, Role, RoleId};

    fn verifier() -> CredentialVerifier {
        let hasher = Arc::new(Argon2Hasher::for_testing());
        let store = MemoryStore::new();
        store.insert_role(Role::new(1, "admin"));
        store
            .insert_account(
                AccountId::new(1),
                NewAccount {
                    username: "admin".to_string(),
                    password_hash: hasher.hash("admin-password").unwrap(),
                    student_id: None,
                },
                &[RoleId::new(1)],
            )
            .unwrap();

        CredentialVerifier::new(Arc::new(store), hasher).unwrap()
    }

    #[test]
    fn test_validate_password() {
        let verifier = verifier();
        assert!(verifier.validate_password("12345678"));
        assert!(!verifier.validate_password("1234567"));
        assert!(!verifier.validate_password(""));
    }

    #[test]
    fn test_validate_credentials() {
        let verifier = verifier();

        let err = verifier
            .validate_credentials(&Credentials::new("  ", "long-enough"))
            .unwrap_err();
        assert_eq!(err.user_message(), INVALID_CREDENTIALS);

        let err = verifier
            .validate_credentials(&Credentials::new("admin", "short"))
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest { .. }));

        assert!(verifier
            .validate_credentials(&Credentials::new("admin", "long-enough"))
            .is_ok());
    }

    #[tokio::test]
    async fn test_verify_credentials_success() {
        let verifier = verifier();
        let account = verifier
            .verify_credentials(&Credentials::new("admin", "admin-password"))
            .await
            .unwrap();

        let principal = CredentialVerifier::convert_to_principal(&account);
        assert_eq!(principal.id, AccountId::new(1));
        assert!(principal.has_role("admin"));
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_password_are_indistinguishable() {
        let verifier = verifier();

        let unknown = verifier
            .verify_credentials(&Credentials::new("nobody", "admin-password"))
            .await
            .unwrap_err();
        let wrong = verifier
            .verify_credentials(&Credentials::new("admin", "wrong-password"))
            .await
            .unwrap_err();

        assert_eq!(unknown.status_code(), wrong.status_code());
        assert_eq!(unknown.user_message(), wrong.user_message());
        assert_eq!(unknown.user_message(), INCORRECT_CREDENTIALS);
    }

    #[tokio::test]
    async fn test_weak_password_rejected_before_lookup() {
        let verifier = verifier();
        let err = verifier
            .verify_credentials(&Credentials::new("admin", "short"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest { .. }));
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let rendered = format!("{:?}", Credentials::new("admin", "admin-password"));
        assert!(!rendered.contains("admin-password"));
    }
}
