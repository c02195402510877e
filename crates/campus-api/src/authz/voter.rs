// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Resource-level voters.
//!
//! A voter inspects the principal and the request parameters and returns
//! ALLOW, DENY or ABSTAIN. Voters get read access to the account store so
//! they can resolve relations such as class membership.

use std::collections::BTreeMap;
use std::str::FromStr;

use async_trait::async_trait;
use campus_core::{AccountStore, ClassId, Principal, StoreResult};

use super::decision::Decision;

/// Path parameter both built-in voters read by default.
pub const DEFAULT_ID_PARAM: &str = "id";

// =============================================================================
// InvocationParams
// =============================================================================

/// Named parameters of the invoked endpoint, taken from the matched route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationParams {
    values: BTreeMap<String, String>,
}

impl InvocationParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Returns the raw value of a parameter.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Parses a parameter. Missing and unparsable values are both `None`.
    pub fn parse<T: FromStr>(&self, name: &str) -> Option<T> {
        self.get(name).and_then(|v| v.parse().ok())
    }

    /// Returns `true` if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for InvocationParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

// =============================================================================
// Voter
// =============================================================================

/// A pluggable resource-level authorization check.
#[async_trait]
pub trait Voter: Send + Sync {
    /// Returns the voter name used in policies and logs.
    fn name(&self) -> &str;

    /// Casts a vote. A store error is treated as DENY by the engine.
    async fn vote(
        &self,
        principal: &Principal,
        params: &InvocationParams,
        store: &dyn AccountStore,
    ) -> StoreResult<Decision>;
}

// =============================================================================
// SelfMatchVoter
// =============================================================================

/// Allows a principal to act on its own account only.
#[derive(Debug, Clone)]
pub struct SelfMatchVoter {
    param: String,
}

impl SelfMatchVoter {
    /// Voter name.
    pub const NAME: &'static str = "self-match";

    /// Creates a voter reading the given parameter.
    pub fn new(param: impl Into<String>) -> Self {
        Self { param: param.into() }
    }
}

impl Default for SelfMatchVoter {
    fn default() -> Self {
        Self::new(DEFAULT_ID_PARAM)
    }
}

#[async_trait]
impl Voter for SelfMatchVoter {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn vote(
        &self,
        principal: &Principal,
        params: &InvocationParams,
        _store: &dyn AccountStore,
    ) -> StoreResult<Decision> {
        let matches = params
            .parse::<campus_core::AccountId>(&self.param)
            .is_some_and(|id| id == principal.id);

        Ok(if matches { Decision::Allow } else { Decision::Deny })
    }
}

// =============================================================================
// ClassMembershipVoter
// =============================================================================

/// Allows students to read their own class.
///
/// Abstains for principals without a student record or without a class so
/// that other rules can decide.
#[derive(Debug, Clone)]
pub struct ClassMembershipVoter {
    param: String,
}

impl ClassMembershipVoter {
    /// Voter name.
    pub const NAME: &'static str = "class-membership";

    /// Creates a voter reading the given parameter.
    pub fn new(param: impl Into<String>) -> Self {
        Self { param: param.into() }
    }
}

impl Default for ClassMembershipVoter {
    fn default() -> Self {
        Self::new(DEFAULT_ID_PARAM)
    }
}

#[async_trait]
impl Voter for ClassMembershipVoter {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn vote(
        &self,
        principal: &Principal,
        params: &InvocationParams,
        store: &dyn AccountStore,
    ) -> StoreResult<Decision> {
        let Some(link) = store.find_student_and_class_for_account(principal.id).await? else {
            return Ok(Decision::Abstain);
        };
        let Some(class_id) = link.class_id else {
            return Ok(Decision::Abstain);
        };

        let requested = params.parse::<ClassId>(&self.param);
        tracing::trace!(
            account_id = %principal.id,
            student_id = %link.student_id,
            class_id = %class_id,
            requested = ?requested,
            "Class membership vote"
        );

        Ok(if requested == Some(class_id) {
            Decision::Allow
        } else {
            Decision::Deny
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::{
        AccountId, MemoryStore, NewAccount, Role, Student, StudentId, UniversityClass,
    };

    fn principal(id: i64) -> Principal {
        Principal::new(id, format!("user{id}"), Vec::<Role>::new())
    }

    fn membership_store() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert_class(UniversityClass {
            id: ClassId::new(10),
            name: "CS-1".to_string(),
        });
        store.insert_student(Student {
            id: StudentId::new("S-1"),
            name: "Ana".to_string(),
            class_id: Some(ClassId::new(10)),
        });
        store.insert_student(Student {
            id: StudentId::new("S-2"),
            name: "Ben".to_string(),
            class_id: None,
        });
        for (id, student) in [(1, None), (2, Some("S-1")), (3, Some("S-2"))] {
            store
                .insert_account(
                    AccountId::new(id),
                    NewAccount {
                        username: format!("user{id}"),
                        password_hash: "x".to_string(),
                        student_id: student.map(StudentId::new),
                    },
                    &[],
                )
                .unwrap();
        }
        store
    }

    #[test]
    fn test_invocation_params() {
        let params = InvocationParams::new().with("id", "42").with("name", "abc");
        assert_eq!(params.get("id"), Some("42"));
        assert_eq!(params.parse::<i64>("id"), Some(42));
        assert_eq!(params.parse::<i64>("name"), None);
        assert_eq!(params.parse::<i64>("missing"), None);

        let collected: InvocationParams = vec![("id", "7")].into_iter().collect();
        assert_eq!(collected.get("id"), Some("7"));
    }

    #[tokio::test]
    async fn test_self_match_voter() {
        let store = MemoryStore::new();
        let voter = SelfMatchVoter::default();

        let same = InvocationParams::new().with("id", "5");
        let other = InvocationParams::new().with("id", "6");
        let garbage = InvocationParams::new().with("id", "five");

        assert_eq!(voter.vote(&principal(5), &same, &store).await.unwrap(), Decision::Allow);
        assert_eq!(voter.vote(&principal(5), &other, &store).await.unwrap(), Decision::Deny);
        assert_eq!(voter.vote(&principal(5), &garbage, &store).await.unwrap(), Decision::Deny);
        assert_eq!(
            voter.vote(&principal(5), &InvocationParams::new(), &store).await.unwrap(),
            Decision::Deny
        );
    }

    #[tokio::test]
    async fn test_class_membership_abstains_without_student() {
        let store = membership_store();
        let voter = ClassMembershipVoter::default();
        let params = InvocationParams::new().with("id", "10");

        assert_eq!(voter.vote(&principal(1), &params, &store).await.unwrap(), Decision::Abstain);
    }

    #[tokio::test]
    async fn test_class_membership_abstains_without_class() {
        let store = membership_store();
        let voter = ClassMembershipVoter::default();
        let params = InvocationParams::new().with("id", "10");

        assert_eq!(voter.vote(&principal(3), &params, &store).await.unwrap(), Decision::Abstain);
    }

    #[tokio::test]
    async fn test_class_membership_allow_and_deny() {
        let store = membership_store();
        let voter = ClassMembershipVoter::default();

        let own = InvocationParams::new().with("id", "10");
        let foreign = InvocationParams::new().with("id", "11");

        assert_eq!(voter.vote(&principal(2), &own, &store).await.unwrap(), Decision::Allow);
        assert_eq!(voter.vote(&principal(2), &foreign, &store).await.unwrap(), Decision::Deny);
    }

    #[test]
    fn test_voter_names() {
        assert_eq!(SelfMatchVoter::default().name(), "self-match");
        assert_eq!(ClassMembershipVoter::default().name(), "class-membership");
    }
}
