// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Endpoint policies.
//!
//! Every served route is registered here at startup with the roles and
//! voters that guard it. The table is immutable once the server runs.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use axum::http::Method;
use campus_core::role_names;

use super::voter::{ClassMembershipVoter, SelfMatchVoter, Voter};
use crate::error::{ApiError, ApiResult};

// =============================================================================
// EndpointPolicy
// =============================================================================

/// Access requirements of a single endpoint.
#[derive(Clone, Default)]
pub struct EndpointPolicy {
    exempt: bool,
    allowed_roles: BTreeSet<String>,
    voters: Vec<Arc<dyn Voter>>,
}

impl EndpointPolicy {
    /// Open access; no token required.
    pub fn exempt() -> Self {
        Self {
            exempt: true,
            ..Self::default()
        }
    }

    /// Requires one of the given roles.
    pub fn roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_roles: roles.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Guarded by voters only.
    pub fn voters(voters: Vec<Arc<dyn Voter>>) -> Self {
        Self {
            voters,
            ..Self::default()
        }
    }

    /// Appends a voter. Voters run in the order they were added.
    pub fn with_voter(mut self, voter: impl Voter + 'static) -> Self {
        self.voters.push(Arc::new(voter));
        self
    }

    /// Returns `true` if the endpoint is open.
    pub fn is_exempt(&self) -> bool {
        self.exempt
    }

    /// Returns the roles that grant access.
    pub fn allowed_roles(&self) -> &BTreeSet<String> {
        &self.allowed_roles
    }

    /// Returns the voters in evaluation order.
    pub fn voter_list(&self) -> &[Arc<dyn Voter>] {
        &self.voters
    }
}

impl fmt::Debug for EndpointPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let voters: Vec<&str> = self.voters.iter().map(|v| v.name()).collect();
        f.debug_struct("EndpointPolicy")
            .field("exempt", &self.exempt)
            .field("allowed_roles", &self.allowed_roles)
            .field("voters", &voters)
            .finish()
    }
}

// =============================================================================
// PolicyTable
// =============================================================================

/// Policies keyed by method and route pattern.
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    policies: HashMap<(Method, String), Arc<EndpointPolicy>>,
}

impl PolicyTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a policy, replacing any previous one for the endpoint.
    pub fn register(&mut self, method: Method, route: impl Into<String>, policy: EndpointPolicy) {
        self.policies.insert((method, route.into()), Arc::new(policy));
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, method: Method, route: impl Into<String>, policy: EndpointPolicy) -> Self {
        self.register(method, route, policy);
        self
    }

    /// Looks up the policy of a matched route.
    pub fn lookup(&self, method: &Method, route: &str) -> Option<Arc<EndpointPolicy>> {
        self.policies.get(&(method.clone(), route.to_string())).cloned()
    }

    /// Returns the number of registered endpoints.
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Checks the table against the known roles and the served routes.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a policy names an unknown role, an
    /// exempt policy also declares roles or voters, or a served route has no
    /// policy.
    pub fn validate<'a>(
        &self,
        known_roles: impl IntoIterator<Item = &'a str>,
        routes: &[(Method, &str)],
    ) -> ApiResult<()> {
        let known: BTreeSet<&str> = known_roles.into_iter().collect();

        let mut entries: Vec<_> = self.policies.iter().collect();
        entries.sort_by_key(|((method, route), _)| (route.clone(), method.to_string()));

        for ((method, route), policy) in entries {
            if policy.exempt && (!policy.allowed_roles.is_empty() || !policy.voters.is_empty()) {
                return Err(ApiError::configuration(format!(
                    "Exempt endpoint {method} {route} also declares roles or voters"
                )));
            }

            if let Some(role) = policy.allowed_roles.iter().find(|r| !known.contains(r.as_str())) {
                return Err(ApiError::configuration(format!(
                    "Endpoint {method} {route} references unknown role '{role}'"
                )));
            }
        }

        for (method, route) in routes {
            if self.lookup(method, route).is_none() {
                return Err(ApiError::configuration(format!(
                    "Endpoint {method} {route} has no access policy"
                )));
            }
        }

        tracing::debug!(endpoints = self.policies.len(), "Policy table validated");
        Ok(())
    }
}

/// The access policies of the campus API.
pub fn default_policies() -> PolicyTable {
    use role_names::{ADMIN, STUDENT_MEMBER, STUDENT_MONITOR, TEACHER};

    PolicyTable::new()
        .with(Method::GET, "/health", EndpointPolicy::exempt())
        .with(Method::POST, "/accounts/login", EndpointPolicy::exempt())
        .with(Method::POST, "/accounts", EndpointPolicy::roles([ADMIN]))
        .with(Method::GET, "/accounts", EndpointPolicy::roles([ADMIN]))
        .with(Method::DELETE, "/accounts/{id}", EndpointPolicy::roles([ADMIN]))
        .with(
            Method::PUT,
            "/accounts/{id}/change-password",
            EndpointPolicy::default().with_voter(SelfMatchVoter::default()),
        )
        .with(Method::GET, "/roles", EndpointPolicy::roles([ADMIN]))
        .with(
            Method::GET,
            "/students/{id}",
            EndpointPolicy::roles([ADMIN, TEACHER, STUDENT_MONITOR, STUDENT_MEMBER]),
        )
        .with(
            Method::GET,
            "/classes/{id}/students",
            EndpointPolicy::roles([ADMIN, TEACHER, STUDENT_MONITOR])
                .with_voter(ClassMembershipVoter::default()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routes() -> Vec<(Method, &'static str)> {
        vec![
            (Method::GET, "/health"),
            (Method::POST, "/accounts/login"),
            (Method::GET, "/classes/{id}/students"),
        ]
    }

    #[test]
    fn test_default_policies_validate() {
        let table = default_policies();
        assert_eq!(table.len(), 9);
        table.validate(role_names::ALL.iter().copied(), &routes()).unwrap();
    }

    #[test]
    fn test_lookup() {
        let table = default_policies();

        let health = table.lookup(&Method::GET, "/health").unwrap();
        assert!(health.is_exempt());

        let class = table.lookup(&Method::GET, "/classes/{id}/students").unwrap();
        assert!(!class.is_exempt());
        assert!(class.allowed_roles().contains("teacher"));
        assert!(!class.allowed_roles().contains("student_member"));
        assert_eq!(class.voter_list().len(), 1);
        assert_eq!(class.voter_list()[0].name(), "class-membership");

        let change = table.lookup(&Method::PUT, "/accounts/{id}/change-password").unwrap();
        assert!(change.allowed_roles().is_empty());
        assert_eq!(change.voter_list()[0].name(), "self-match");

        assert!(table.lookup(&Method::POST, "/health").is_none());
    }

    #[test]
    fn test_validate_unknown_role() {
        let table = PolicyTable::new().with(Method::GET, "/x", EndpointPolicy::roles(["dean"]));
        let err = table.validate(["admin"], &[]).unwrap_err();
        assert!(matches!(err, ApiError::Configuration { .. }));
    }

    #[test]
    fn test_validate_exempt_with_roles() {
        let mut policy = EndpointPolicy::exempt();
        policy.allowed_roles.insert("admin".to_string());
        let table = PolicyTable::new().with(Method::GET, "/x", policy);
        assert!(table.validate(["admin"], &[]).is_err());

        let table = PolicyTable::new().with(
            Method::GET,
            "/y",
            EndpointPolicy::exempt().with_voter(SelfMatchVoter::default()),
        );
        assert!(table.validate(["admin"], &[]).is_err());
    }

    #[test]
    fn test_validate_missing_route_policy() {
        let table = PolicyTable::new().with(Method::GET, "/health", EndpointPolicy::exempt());
        let err = table
            .validate(["admin"], &[(Method::GET, "/health"), (Method::GET, "/roles")])
            .unwrap_err();
        assert!(err.to_string().contains("/roles"));
    }

    #[test]
    fn test_policy_debug_lists_voter_names() {
        let policy = EndpointPolicy::default().with_voter(SelfMatchVoter::default());
        assert!(format!("{policy:?}").contains("self-match"));
    }
}
