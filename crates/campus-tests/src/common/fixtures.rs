// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! A small campus: two classes, four students and one account per role mix.
//!
//! | id | username | roles                            | student | class |
//! |----|----------|----------------------------------|---------|-------|
//! | 1  | admin    | admin                            |         |       |
//! | 2  | teacher  | teacher                          |         |       |
//! | 3  | ada      | student_member                   | S-1     | 1     |
//! | 4  | bob      | student_member                   | S-2     | 2     |
//! | 5  | cleo     | student_member, student_monitor  | S-3     | 1     |
//! | 6  | dan      | student_member                   | S-4     |       |

use campus_api::{Argon2Hasher, ApiConfig, JwtConfig, PasswordHasher};
use campus_core::{
    role_names, AccountId, ClassId, MemoryStore, NewAccount, Principal, Role, RoleId, Student,
    StudentId, UniversityClass,
};

/// Signing secret shared by every fixture configuration.
pub const TEST_JWT_SECRET: &str = "campus-integration-secret-at-least-32-bytes";

/// Admin login.
pub const ADMIN_USER: &str = "admin";
/// Admin password.
pub const ADMIN_PASSWORD: &str = "admin-password";
/// Teacher login.
pub const TEACHER_USER: &str = "teacher";
/// Teacher password.
pub const TEACHER_PASSWORD: &str = "teacher-password";
/// Student in class 1.
pub const ADA_USER: &str = "ada";
/// Student in class 2.
pub const BOB_USER: &str = "bob";
/// Student and monitor in class 1.
pub const CLEO_USER: &str = "cleo";
/// Student without a class.
pub const DAN_USER: &str = "dan";
/// Password shared by all student accounts.
pub const STUDENT_PASSWORD: &str = "student-password";

/// First class.
pub const CLASS_ALGORITHMS: i64 = 1;
/// Second class.
pub const CLASS_DATABASES: i64 = 2;

/// A seeded account.
#[derive(Debug, Clone, Copy)]
pub struct FixtureAccount {
    /// Fixed account ID.
    pub id: i64,
    /// Login name.
    pub username: &'static str,
    /// Plain password.
    pub password: &'static str,
    /// Role names.
    pub roles: &'static [&'static str],
    /// Linked student record.
    pub student_id: Option<&'static str>,
}

/// Fixture factory for the seeded campus.
pub struct CampusFixtures;

impl CampusFixtures {
    /// The four standard roles with IDs 1..=4.
    pub fn roles() -> Vec<Role> {
        role_names::ALL
            .iter()
            .enumerate()
            .map(|(i, name)| Role::new(i as i64 + 1, *name))
            .collect()
    }

    /// Looks up a standard role by name.
    pub fn role(name: &str) -> Role {
        Self::roles()
            .into_iter()
            .find(|r| r.name == name)
            .unwrap_or_else(|| panic!("unknown fixture role '{name}'"))
    }

    /// The two fixture classes.
    pub fn classes() -> Vec<UniversityClass> {
        vec![
            UniversityClass {
                id: ClassId::new(CLASS_ALGORITHMS),
                name: "Algorithms".to_string(),
            },
            UniversityClass {
                id: ClassId::new(CLASS_DATABASES),
                name: "Databases".to_string(),
            },
        ]
    }

    /// The four fixture students.
    pub fn students() -> Vec<Student> {
        let student = |id: &str, name: &str, class: Option<i64>| Student {
            id: StudentId::new(id),
            name: name.to_string(),
            class_id: class.map(ClassId::new),
        };

        vec![
            student("S-1", "Ada", Some(CLASS_ALGORITHMS)),
            student("S-2", "Bob", Some(CLASS_DATABASES)),
            student("S-3", "Cleo", Some(CLASS_ALGORITHMS)),
            student("S-4", "Dan", None),
        ]
    }

    /// The six fixture accounts.
    pub fn accounts() -> Vec<FixtureAccount> {
        use role_names::{ADMIN, STUDENT_MEMBER, STUDENT_MONITOR, TEACHER};

        vec![
            FixtureAccount {
                id: 1,
                username: ADMIN_USER,
                password: ADMIN_PASSWORD,
                roles: &[ADMIN],
                student_id: None,
            },
            FixtureAccount {
                id: 2,
                username: TEACHER_USER,
                password: TEACHER_PASSWORD,
                roles: &[TEACHER],
                student_id: None,
            },
            FixtureAccount {
                id: 3,
                username: ADA_USER,
                password: STUDENT_PASSWORD,
                roles: &[STUDENT_MEMBER],
                student_id: Some("S-1"),
            },
            FixtureAccount {
                id: 4,
                username: BOB_USER,
                password: STUDENT_PASSWORD,
                roles: &[STUDENT_MEMBER],
                student_id: Some("S-2"),
            },
            FixtureAccount {
                id: 5,
                username: CLEO_USER,
                password: STUDENT_PASSWORD,
                roles: &[STUDENT_MEMBER, STUDENT_MONITOR],
                student_id: Some("S-3"),
            },
            FixtureAccount {
                id: 6,
                username: DAN_USER,
                password: STUDENT_PASSWORD,
                roles: &[STUDENT_MEMBER],
                student_id: Some("S-4"),
            },
        ]
    }

    /// Returns the fixture account with the given username.
    pub fn account(username: &str) -> FixtureAccount {
        Self::accounts()
            .into_iter()
            .find(|a| a.username == username)
            .unwrap_or_else(|| panic!("unknown fixture account '{username}'"))
    }

    /// The principal a successful login of `username` produces.
    pub fn principal(username: &str) -> Principal {
        let account = Self::account(username);
        Principal::new(
            account.id,
            account.username,
            account.roles.iter().map(|name| Self::role(name)),
        )
    }

    /// A store populated with every fixture, passwords hashed by `hasher`.
    pub fn seeded_store(hasher: &dyn PasswordHasher) -> MemoryStore {
        let store = MemoryStore::new();
        for role in Self::roles() {
            store.insert_role(role);
        }
        for class in Self::classes() {
            store.insert_class(class);
        }
        for student in Self::students() {
            store.insert_student(student);
        }
        for account in Self::accounts() {
            let role_ids: Vec<RoleId> = account.roles.iter().map(|n| Self::role(n).id).collect();
            store
                .insert_account(
                    AccountId::new(account.id),
                    NewAccount {
                        username: account.username.to_string(),
                        password_hash: hasher.hash(account.password).expect("hash fixture password"),
                        student_id: account.student_id.map(StudentId::new),
                    },
                    &role_ids,
                )
                .expect("insert fixture account");
        }
        store
    }

    /// A store seeded with the cheapest Argon2 parameters.
    pub fn fast_store() -> MemoryStore {
        Self::seeded_store(&Argon2Hasher::for_testing())
    }
}

/// Configuration fixtures.
pub struct ConfigFixtures;

impl ConfigFixtures {
    /// Token settings with the shared secret.
    pub fn jwt() -> JwtConfig {
        JwtConfig::new(TEST_JWT_SECRET)
    }

    /// API settings with the shared secret and defaults elsewhere.
    pub fn api() -> ApiConfig {
        ApiConfig::default().with_jwt(Self::jwt())
    }

    /// A complete YAML configuration matching the campus fixtures.
    pub fn campus_yaml() -> String {
        format!(
            r#"
server:
  host: "127.0.0.1"
  port: 8088
  request_timeout_secs: 10
  cors_origins:
    - "https://campus.example"

security:
  jwt:
    secret: "{TEST_JWT_SECRET}"
    issuer: "campus-tests"
    ttl_secs: 900
  password:
    min_length: 8
    memory_kib: 8
    iterations: 1
    parallelism: 1

authorization:
  default_decision: deny
  conflict_resolution: role_allow_wins

logging:
  level: debug
  format: json

seed:
  classes:
    - {{ id: 1, name: "Algorithms" }}
    - {{ id: 2, name: "Databases" }}
  students:
    - {{ id: "S-1", name: "Ada", class_id: 1 }}
    - {{ id: "S-2", name: "Bob", class_id: 2 }}
  accounts:
    - username: "{ADMIN_USER}"
      password: "{ADMIN_PASSWORD}"
      roles: ["admin"]
    - username: "{ADA_USER}"
      password: "{STUDENT_PASSWORD}"
      roles: ["student_member"]
      student_id: "S-1"
"#
        )
    }
}
