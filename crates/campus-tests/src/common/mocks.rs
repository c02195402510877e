// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! Stores that fail on demand and voters that return scripted decisions.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use campus_api::authz::InvocationParams;
use campus_api::{Decision, Voter};
use campus_core::{
    Account, AccountId, AccountStore, ClassId, DirectoryStore, MemoryStore, NewAccount,
    Principal, Role, RoleId, StoreError, StoreResult, Student, StudentId, StudentLink,
};

// =============================================================================
// FailingStore
// =============================================================================

/// Store operations that [`FailingStore`] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    /// `find_account_by_username`
    FindByUsername,
    /// `find_account_by_id`
    FindById,
    /// `find_roles_for_account`
    FindRoles,
    /// `find_student_and_class_for_account`
    FindStudentLink,
    /// `list_roles`
    ListRoles,
    /// Any write: create, assign, update, delete.
    Write,
    /// Student and class lookups.
    Directory,
}

/// Wraps a [`MemoryStore`] and fails selected operations with
/// [`StoreError::Unavailable`].
pub struct FailingStore {
    inner: MemoryStore,
    failing: HashSet<StoreOp>,
}

impl FailingStore {
    /// Wraps a store with no failing operations.
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            failing: HashSet::new(),
        }
    }

    /// Wraps an empty store that fails every operation.
    pub fn always() -> Self {
        Self::new(MemoryStore::new())
            .failing(StoreOp::FindByUsername)
            .failing(StoreOp::FindById)
            .failing(StoreOp::FindRoles)
            .failing(StoreOp::FindStudentLink)
            .failing(StoreOp::ListRoles)
            .failing(StoreOp::Write)
            .failing(StoreOp::Directory)
    }

    /// Makes `op` fail.
    pub fn failing(mut self, op: StoreOp) -> Self {
        self.failing.insert(op);
        self
    }

    fn check(&self, op: StoreOp) -> StoreResult<()> {
        if self.failing.contains(&op) {
            Err(StoreError::unavailable(format!("{op:?} disabled by test")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AccountStore for FailingStore {
    async fn find_account_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        self.check(StoreOp::FindByUsername)?;
        self.inner.find_account_by_username(username).await
    }

    async fn find_account_by_id(&self, id: AccountId) -> StoreResult<Option<Account>> {
        self.check(StoreOp::FindById)?;
        self.inner.find_account_by_id(id).await
    }

    async fn find_roles_for_account(&self, id: AccountId) -> StoreResult<Vec<Role>> {
        self.check(StoreOp::FindRoles)?;
        self.inner.find_roles_for_account(id).await
    }

    async fn find_student_and_class_for_account(
        &self,
        id: AccountId,
    ) -> StoreResult<Option<StudentLink>> {
        self.check(StoreOp::FindStudentLink)?;
        self.inner.find_student_and_class_for_account(id).await
    }

    fn name(&self) -> &str {
        "failing"
    }
}

#[async_trait]
impl DirectoryStore for FailingStore {
    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        self.check(StoreOp::ListRoles)?;
        self.inner.list_roles().await
    }

    async fn find_role(&self, id: RoleId) -> StoreResult<Option<Role>> {
        self.check(StoreOp::ListRoles)?;
        self.inner.find_role(id).await
    }

    async fn create_account(&self, account: NewAccount) -> StoreResult<Account> {
        self.check(StoreOp::Write)?;
        self.inner.create_account(account).await
    }

    async fn create_account_with_roles(
        &self,
        account: NewAccount,
        roles: &[RoleId],
    ) -> StoreResult<Account> {
        self.check(StoreOp::Write)?;
        self.inner.create_account_with_roles(account, roles).await
    }

    async fn assign_roles(&self, id: AccountId, roles: &[RoleId]) -> StoreResult<()> {
        self.check(StoreOp::Write)?;
        self.inner.assign_roles(id, roles).await
    }

    async fn list_accounts(&self) -> StoreResult<Vec<Account>> {
        self.check(StoreOp::Directory)?;
        self.inner.list_accounts().await
    }

    async fn update_password(&self, id: AccountId, password_hash: String) -> StoreResult<()> {
        self.check(StoreOp::Write)?;
        self.inner.update_password(id, password_hash).await
    }

    async fn delete_account(&self, id: AccountId) -> StoreResult<()> {
        self.check(StoreOp::Write)?;
        self.inner.delete_account(id).await
    }

    async fn find_student(&self, id: &StudentId) -> StoreResult<Option<Student>> {
        self.check(StoreOp::Directory)?;
        self.inner.find_student(id).await
    }

    async fn class_exists(&self, id: ClassId) -> StoreResult<bool> {
        self.check(StoreOp::Directory)?;
        self.inner.class_exists(id).await
    }

    async fn students_in_class(&self, id: ClassId) -> StoreResult<Vec<Student>> {
        self.check(StoreOp::Directory)?;
        self.inner.students_in_class(id).await
    }
}

// =============================================================================
// ScriptedVoter
// =============================================================================

/// A voter that always returns the same decision and counts its calls.
#[derive(Debug, Clone)]
pub struct ScriptedVoter {
    name: String,
    decision: Decision,
    calls: Arc<AtomicUsize>,
}

impl ScriptedVoter {
    /// Creates a voter named `name` that always votes `decision`.
    pub fn new(name: impl Into<String>, decision: Decision) -> Self {
        Self {
            name: name.into(),
            decision,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns how often the voter was consulted, shared across clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Voter for ScriptedVoter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn vote(
        &self,
        _principal: &Principal,
        _params: &InvocationParams,
        _store: &dyn AccountStore,
    ) -> StoreResult<Decision> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.decision)
    }
}
