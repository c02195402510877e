// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory store.
//!
//! Implements [`AccountStore`] and [`DirectoryStore`] over a single
//! `parking_lot::RwLock`. Used by the binary (seeded from configuration)
//! and by tests. Data is lost when the store is dropped.
//!
//! # Example
//!
//! ```rust,ignore
//! use campus_core::memory::MemoryStore;
//! use campus_core::types::{Role, UniversityClass, ClassId};
//!
//! let store = MemoryStore::new();
//! store.insert_role(Role::new(1, "admin"));
//! store.insert_class(UniversityClass { id: ClassId::new(1), name: "CS-1".into() });
//! ```

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;

use crate::error::StoreError;
use crate::store::{AccountStore, DirectoryStore, StoreResult};
use crate::types::{
    Account, AccountId, ClassId, NewAccount, Role, RoleId, RoleMapping, Student, StudentId,
    StudentLink, UniversityClass,
};

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, Clone)]
struct AccountRow {
    id: AccountId,
    username: String,
    password_hash: String,
    student_id: Option<StudentId>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    accounts: BTreeMap<AccountId, AccountRow>,
    roles: BTreeMap<RoleId, Role>,
    mappings: BTreeSet<(AccountId, RoleId)>,
    students: BTreeMap<StudentId, Student>,
    classes: BTreeMap<ClassId, UniversityClass>,
    next_account_id: i64,
}

impl Tables {
    fn roles_of(&self, id: AccountId) -> Vec<Role> {
        self.mappings
            .range((id, RoleId::new(i64::MIN))..=(id, RoleId::new(i64::MAX)))
            .filter_map(|(_, role_id)| self.roles.get(role_id).cloned())
            .collect()
    }

    fn hydrate(&self, row: &AccountRow) -> Account {
        Account {
            id: row.id,
            username: row.username.clone(),
            password_hash: row.password_hash.clone(),
            student_id: row.student_id.clone(),
            roles: self.roles_of(row.id),
            created_at: row.created_at,
        }
    }

    fn username_taken(&self, username: &str) -> bool {
        self.accounts.values().any(|a| a.username == username)
    }

    fn allocate_account_id(&mut self) -> AccountId {
        self.next_account_id += 1;
        AccountId::new(self.next_account_id)
    }

    /// Inserts an account and its mappings after all checks pass.
    fn create(&mut self, account: NewAccount, roles: &[RoleId]) -> StoreResult<Account> {
        if self.username_taken(&account.username) {
            return Err(StoreError::conflict("account", &account.username));
        }
        if let Some(student_id) = &account.student_id {
            if !self.students.contains_key(student_id) {
                return Err(StoreError::not_found("student", student_id));
            }
        }
        if let Some(missing) = roles.iter().find(|r| !self.roles.contains_key(r)) {
            return Err(StoreError::not_found("role", missing));
        }

        let id = self.allocate_account_id();
        let row = AccountRow {
            id,
            username: account.username,
            password_hash: account.password_hash,
            student_id: account.student_id,
            created_at: Utc::now(),
        };
        self.accounts.insert(id, row);
        for role_id in roles {
            self.mappings.insert((id, *role_id));
        }

        let created = self.hydrate(&self.accounts[&id]);
        debug!(account_id = %id, username = %created.username, roles = roles.len(), "Account created");
        Ok(created)
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// Thread-safe in-memory implementation of the storage traits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a role.
    pub fn insert_role(&self, role: Role) {
        self.tables.write().roles.insert(role.id, role);
    }

    /// Inserts or replaces a class.
    pub fn insert_class(&self, class: UniversityClass) {
        self.tables.write().classes.insert(class.id, class);
    }

    /// Inserts or replaces a student.
    pub fn insert_student(&self, student: Student) {
        self.tables.write().students.insert(student.id.clone(), student);
    }

    /// Inserts an account with a fixed ID, bypassing ID allocation.
    ///
    /// Later allocations continue above the highest inserted ID.
    pub fn insert_account(
        &self,
        id: AccountId,
        account: NewAccount,
        roles: &[RoleId],
    ) -> StoreResult<()> {
        let mut tables = self.tables.write();

        if tables.accounts.contains_key(&id) {
            return Err(StoreError::conflict("account", id));
        }
        if tables.username_taken(&account.username) {
            return Err(StoreError::conflict("account", &account.username));
        }
        if let Some(missing) = roles.iter().find(|r| !tables.roles.contains_key(r)) {
            return Err(StoreError::not_found("role", missing));
        }

        tables.accounts.insert(
            id,
            AccountRow {
                id,
                username: account.username,
                password_hash: account.password_hash,
                student_id: account.student_id,
                created_at: Utc::now(),
            },
        );
        for role_id in roles {
            tables.mappings.insert((id, *role_id));
        }
        tables.next_account_id = tables.next_account_id.max(id.get());

        Ok(())
    }

    /// Returns all role mappings.
    pub fn mappings(&self) -> Vec<RoleMapping> {
        self.tables
            .read()
            .mappings
            .iter()
            .map(|(account_id, role_id)| RoleMapping {
                account_id: *account_id,
                role_id: *role_id,
            })
            .collect()
    }

    /// Returns the number of stored accounts.
    pub fn account_count(&self) -> usize {
        self.tables.read().accounts.len()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_account_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        let tables = self.tables.read();
        Ok(tables
            .accounts
            .values()
            .find(|a| a.username == username)
            .map(|row| tables.hydrate(row)))
    }

    async fn find_account_by_id(&self, id: AccountId) -> StoreResult<Option<Account>> {
        let tables = self.tables.read();
        Ok(tables.accounts.get(&id).map(|row| tables.hydrate(row)))
    }

    async fn find_roles_for_account(&self, id: AccountId) -> StoreResult<Vec<Role>> {
        Ok(self.tables.read().roles_of(id))
    }

    async fn find_student_and_class_for_account(
        &self,
        id: AccountId,
    ) -> StoreResult<Option<StudentLink>> {
        let tables = self.tables.read();
        let Some(student_id) = tables.accounts.get(&id).and_then(|a| a.student_id.as_ref()) else {
            return Ok(None);
        };

        Ok(tables.students.get(student_id).map(|student| StudentLink {
            student_id: student.id.clone(),
            class_id: student.class_id,
        }))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[async_trait]
impl DirectoryStore for MemoryStore {
    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        Ok(self.tables.read().roles.values().cloned().collect())
    }

    async fn find_role(&self, id: RoleId) -> StoreResult<Option<Role>> {
        Ok(self.tables.read().roles.get(&id).cloned())
    }

    async fn create_account(&self, account: NewAccount) -> StoreResult<Account> {
        self.tables.write().create(account, &[])
    }

    async fn create_account_with_roles(
        &self,
        account: NewAccount,
        roles: &[RoleId],
    ) -> StoreResult<Account> {
        self.tables.write().create(account, roles)
    }

    async fn assign_roles(&self, id: AccountId, roles: &[RoleId]) -> StoreResult<()> {
        let mut tables = self.tables.write();

        if !tables.accounts.contains_key(&id) {
            return Err(StoreError::not_found("account", id));
        }
        if let Some(missing) = roles.iter().find(|r| !tables.roles.contains_key(r)) {
            return Err(StoreError::not_found("role", missing));
        }

        tables.mappings.retain(|(account_id, _)| *account_id != id);
        for role_id in roles {
            tables.mappings.insert((id, *role_id));
        }

        debug!(account_id = %id, roles = roles.len(), "Roles assigned");
        Ok(())
    }

    async fn list_accounts(&self) -> StoreResult<Vec<Account>> {
        let tables = self.tables.read();
        Ok(tables.accounts.values().map(|row| tables.hydrate(row)).collect())
    }

    async fn update_password(&self, id: AccountId, password_hash: String) -> StoreResult<()> {
        let mut tables = self.tables.write();
        let row = tables
            .accounts
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("account", id))?;
        row.password_hash = password_hash;
        Ok(())
    }

    async fn delete_account(&self, id: AccountId) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if tables.accounts.remove(&id).is_none() {
            return Err(StoreError::not_found("account", id));
        }
        tables.mappings.retain(|(account_id, _)| *account_id != id);

        debug!(account_id = %id, "Account deleted");
        Ok(())
    }

    async fn find_student(&self, id: &StudentId) -> StoreResult<Option<Student>> {
        Ok(self.tables.read().students.get(id).cloned())
    }

    async fn class_exists(&self, id: ClassId) -> StoreResult<bool> {
        Ok(self.tables.read().classes.contains_key(&id))
    }

    async fn students_in_class(&self, id: ClassId) -> StoreResult<Vec<Student>> {
        Ok(self
            .tables
            .read()
            .students
            .values()
            .filter(|s| s.class_id == Some(id))
            .cloned()
            .collect())
    }
}

// =============================================================================
// Tests
// =============================================================================
