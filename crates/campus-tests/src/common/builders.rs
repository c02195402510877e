// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Builders
//!
//! Builders for principals and JSON request bodies.

use campus_core::{AccountId, Principal, Role};
use serde_json::{json, Value};

use super::fixtures::CampusFixtures;

// =============================================================================
// PrincipalBuilder
// =============================================================================

/// Builds a [`Principal`] without touching a store.
///
/// # Example
///
/// ```rust,ignore
/// let principal = PrincipalBuilder::new(42).role("teacher").build();
/// ```
#[derive(Debug, Clone)]
pub struct PrincipalBuilder {
    id: AccountId,
    username: String,
    roles: Vec<Role>,
}

impl PrincipalBuilder {
    /// Starts a principal with the given ID and a derived username.
    pub fn new(id: i64) -> Self {
        Self {
            id: AccountId::new(id),
            username: format!("user-{id}"),
            roles: Vec::new(),
        }
    }

    /// Sets the username.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Adds a standard role by name.
    pub fn role(mut self, name: &str) -> Self {
        self.roles.push(CampusFixtures::role(name));
        self
    }

    /// Adds a custom role.
    pub fn custom_role(mut self, id: i64, name: &str) -> Self {
        self.roles.push(Role::new(id, name));
        self
    }

    /// Builds the principal.
    pub fn build(self) -> Principal {
        Principal::new(self.id, self.username, self.roles)
    }
}

// =============================================================================
// SignUpBuilder
// =============================================================================

/// Builds a `POST /accounts` request body.
#[derive(Debug, Clone)]
pub struct SignUpBuilder {
    username: String,
    password: String,
    role_ids: Vec<i64>,
    student_id: Option<String>,
}

impl SignUpBuilder {
    /// Starts a body with the given credentials and no roles.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            role_ids: Vec::new(),
            student_id: None,
        }
    }

    /// Adds a role by ID.
    pub fn role_id(mut self, id: i64) -> Self {
        self.role_ids.push(id);
        self
    }

    /// Adds a standard role by name.
    pub fn role(self, name: &str) -> Self {
        let id = CampusFixtures::role(name).id.get();
        self.role_id(id)
    }

    /// Links the account to a student record.
    pub fn student(mut self, id: impl Into<String>) -> Self {
        self.student_id = Some(id.into());
        self
    }

    /// Builds the JSON body.
    pub fn build(self) -> Value {
        let mut body = json!({
            "username": self.username,
            "password": self.password,
            "role_ids": self.role_ids,
        });
        if let Some(student_id) = self.student_id {
            body["student_id"] = json!(student_id);
        }
        body
    }
}

/// Builds a `PUT /accounts/{id}/change-password` request body.
pub fn change_password_body(current: &str, new: &str) -> Value {
    json!({
        "current_password": current,
        "new_password": new,
    })
}

/// Builds a `POST /accounts/login` request body.
pub fn login_body(username: &str, password: &str) -> Value {
    json!({
        "username": username,
        "password": password,
    })
}
