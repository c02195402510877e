// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication module.
//!
//! This module provides:
//! - Token issuing and verification
//! - Password hashing and credential checks
//! - Role lookup
//! - Per-request authentication context

mod claims;
mod context;
mod credentials;
mod jwt;
mod password;
mod roles;

pub use claims::Claims;
pub use context::AuthContext;
pub use credentials::{
    CredentialVerifier, Credentials, INCORRECT_CREDENTIALS, INVALID_CREDENTIALS,
    MIN_PASSWORD_LENGTH,
};
pub use jwt::{JwtConfig, TokenService, TOKEN_REJECTED};
pub use password::{Argon2Config, Argon2Hasher, PasswordHasher};
pub use roles::RoleResolver;
