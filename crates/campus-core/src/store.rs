// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Storage traits.
//!
//! [`AccountStore`] holds the read accessors the authentication and
//! authorization paths depend on. [`DirectoryStore`] adds the account
//! management operations used by the HTTP handlers.
//!
//! Both traits are object safe and used behind `Arc<dyn ...>`.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{
    Account, AccountId, ClassId, NewAccount, Role, RoleId, Student, StudentId, StudentLink,
};

/// Result type alias for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// AccountStore
// =============================================================================

/// Read access to accounts and their relations.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Looks up an account by login name, roles included.
    ///
    /// Returns `Ok(None)` when no account has that name.
    async fn find_account_by_username(&self, username: &str) -> StoreResult<Option<Account>>;

    /// Looks up an account by ID, roles included.
    async fn find_account_by_id(&self, id: AccountId) -> StoreResult<Option<Account>>;

    /// Returns the roles assigned to an account.
    ///
    /// An unknown account has no roles.
    async fn find_roles_for_account(&self, id: AccountId) -> StoreResult<Vec<Role>>;

    /// Returns the student linked to an account together with the student's
    /// class, or `None` if the account is not linked to a student.
    async fn find_student_and_class_for_account(
        &self,
        id: AccountId,
    ) -> StoreResult<Option<StudentLink>>;

    /// Returns the store name for logging.
    fn name(&self) -> &str {
        "store"
    }
}

// =============================================================================
// DirectoryStore
// =============================================================================

/// Account management and directory lookups.
#[async_trait]
pub trait DirectoryStore: AccountStore {
    /// Lists all roles.
    async fn list_roles(&self) -> StoreResult<Vec<Role>>;

    /// Looks up a role by ID.
    async fn find_role(&self, id: RoleId) -> StoreResult<Option<Role>>;

    /// Inserts a new account.
    ///
    /// Fails with [`StoreError::Conflict`] if the username is taken.
    async fn create_account(&self, account: NewAccount) -> StoreResult<Account>;

    /// Inserts a new account together with its role mappings.
    ///
    /// Either both are stored or neither is. Fails with
    /// [`StoreError::NotFound`] if any role is unknown.
    async fn create_account_with_roles(
        &self,
        account: NewAccount,
        roles: &[RoleId],
    ) -> StoreResult<Account>;

    /// Replaces the role mappings of an account.
    ///
    /// Fails with [`StoreError::NotFound`] if the account or any role is unknown.
    async fn assign_roles(&self, id: AccountId, roles: &[RoleId]) -> StoreResult<()>;

    /// Lists all accounts, ordered by ID.
    async fn list_accounts(&self) -> StoreResult<Vec<Account>>;

    /// Overwrites the stored password hash.
    async fn update_password(&self, id: AccountId, password_hash: String) -> StoreResult<()>;

    /// Removes an account and its role mappings.
    async fn delete_account(&self, id: AccountId) -> StoreResult<()>;

    /// Looks up a student record.
    async fn find_student(&self, id: &StudentId) -> StoreResult<Option<Student>>;

    /// Returns `true` if the class exists.
    async fn class_exists(&self, id: ClassId) -> StoreResult<bool>;

    /// Lists the students assigned to a class, ordered by ID.
    async fn students_in_class(&self, id: ClassId) -> StoreResult<Vec<Student>>;
}
