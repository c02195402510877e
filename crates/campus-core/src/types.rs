// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Core domain types for the campus service.
//!
//! Accounts, roles, students and classes as seen by the access-control layer.
//! These are plain data carriers; persistence lives behind the traits in
//! [`crate::store`].

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Identifiers
// =============================================================================

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates a new identifier.
            #[inline]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw numeric value.
            #[inline]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }
    };
}

numeric_id!(
    /// Identifier of an account (the authenticated principal).
    AccountId
);

numeric_id!(
    /// Identifier of a role.
    RoleId
);

numeric_id!(
    /// Identifier of a university class.
    ClassId
);

/// Identifier of a student record.
///
/// Student ids are institution-issued codes, not generated numbers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(String);

impl StudentId {
    /// Creates a new student ID.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StudentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// =============================================================================
// Roles
// =============================================================================

/// Built-in role names.
pub mod role_names {
    /// Full administrative access.
    pub const ADMIN: &str = "admin";
    /// Teaching staff.
    pub const TEACHER: &str = "teacher";
    /// Regular student.
    pub const STUDENT_MEMBER: &str = "student_member";
    /// Class monitor.
    pub const STUDENT_MONITOR: &str = "student_monitor";

    /// All built-in role names, in seeding order.
    pub const ALL: [&str; 4] = [ADMIN, TEACHER, STUDENT_MEMBER, STUDENT_MONITOR];
}

/// A named permission label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Role {
    /// Role ID.
    pub id: RoleId,
    /// Role name, e.g. `admin`.
    pub name: String,
}

impl Role {
    /// Creates a new role.
    pub fn new(id: impl Into<RoleId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Join row between an account and a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleMapping {
    /// Account side of the mapping.
    pub account_id: AccountId,
    /// Role side of the mapping.
    pub role_id: RoleId,
}

// =============================================================================
// Principal
// =============================================================================

/// The authenticated identity attached to a request.
///
/// A principal is rebuilt for every request from a verified token, or from
/// verified credentials at login. It is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Account ID.
    pub id: AccountId,
    /// Login name.
    pub username: String,
    /// Assigned roles.
    #[serde(default)]
    pub roles: BTreeSet<Role>,
}

impl Principal {
    /// Creates a new principal.
    pub fn new(
        id: impl Into<AccountId>,
        username: impl Into<String>,
        roles: impl IntoIterator<Item = Role>,
    ) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            roles: roles.into_iter().collect(),
        }
    }

    /// Returns `true` if the principal holds a role with the given name.
    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|r| r.name == name)
    }

    /// Returns the names of all roles held by the principal.
    pub fn role_names(&self) -> BTreeSet<&str> {
        self.roles.iter().map(|r| r.name.as_str()).collect()
    }
}

// =============================================================================
// Accounts
// =============================================================================

/// A stored account, fetched together with its roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Account ID.
    pub id: AccountId,
    /// Unique login name.
    pub username: String,
    /// PHC-formatted password hash. Never the plaintext.
    pub password_hash: String,
    /// Linked student record, if the account belongs to a student.
    pub student_id: Option<StudentId>,
    /// Assigned roles.
    pub roles: Vec<Role>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Account data without credentials, safe to return to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountView {
    /// Account ID.
    pub id: AccountId,
    /// Login name.
    pub username: String,
    /// Linked student record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<StudentId>,
    /// Assigned roles.
    pub roles: Vec<Role>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            student_id: account.student_id.clone(),
            roles: account.roles.clone(),
            created_at: account.created_at,
        }
    }
}

/// Data required to insert a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Unique login name.
    pub username: String,
    /// Already-hashed password.
    pub password_hash: String,
    /// Optional student link.
    pub student_id: Option<StudentId>,
}

// =============================================================================
// Students and classes
// =============================================================================

/// A university class (cohort).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniversityClass {
    /// Class ID.
    pub id: ClassId,
    /// Display name.
    pub name: String,
}

/// A student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Student ID.
    pub id: StudentId,
    /// Full name.
    pub name: String,
    /// Assigned class, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<ClassId>,
}

/// The student/class relation of an account, as used by membership checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentLink {
    /// Linked student.
    pub student_id: StudentId,
    /// The student's class, if assigned.
    pub class_id: Option<ClassId>,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_id_parse() {
        assert_eq!("42".parse::<AccountId>().unwrap(), AccountId::new(42));
        assert_eq!(" 7 ".parse::<ClassId>().unwrap().get(), 7);
        assert!("abc".parse::<AccountId>().is_err());
    }

    #[test]
    fn test_principal_roles() {
        let principal = Principal::new(
            1,
            "alice",
            vec![Role::new(1, role_names::ADMIN), Role::new(2, role_names::TEACHER)],
        );

        assert!(principal.has_role("admin"));
        assert!(!principal.has_role("student_member"));
        assert_eq!(
            principal.role_names().into_iter().collect::<Vec<_>>(),
            vec!["admin", "teacher"]
        );
    }

    #[test]
    fn test_principal_roles_are_a_set() {
        let principal = Principal::new(
            1,
            "bob",
            vec![Role::new(2, "teacher"), Role::new(2, "teacher")],
        );
        assert_eq!(principal.roles.len(), 1);
    }

    #[test]
    fn test_account_view_hides_hash() {
        let account = Account {
            id: AccountId::new(3),
            username: "carol".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            student_id: Some(StudentId::new("S-001")),
            roles: vec![],
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&AccountView::from(&account)).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("S-001"));
    }
}
