// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT claims structure.

use campus_core::{AccountId, Principal, Role};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims embedded in an access token.
///
/// The token carries the full principal, so verification needs no store
/// lookup. Role changes take effect when the holder logs in again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    // =========================================================================
    // Standard JWT Claims (RFC 7519)
    // =========================================================================
    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at time (Unix timestamp).
    pub iat: i64,

    /// Issuer.
    pub iss: String,

    /// JWT ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    // =========================================================================
    // Principal
    // =========================================================================
    /// Account ID.
    pub id: AccountId,

    /// Login name.
    pub username: String,

    /// Assigned roles.
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl Claims {
    /// Creates claims for a principal, valid for `ttl_secs` from now.
    pub fn for_principal(principal: &Principal, issuer: impl Into<String>, ttl_secs: i64) -> Self {
        let now = Utc::now().timestamp();

        Self {
            exp: now + ttl_secs,
            iat: now,
            iss: issuer.into(),
            jti: Some(Uuid::now_v7().to_string()),
            id: principal.id,
            username: principal.username.clone(),
            roles: principal.roles.iter().cloned().collect(),
        }
    }

    /// Rebuilds the principal carried by these claims.
    pub fn into_principal(self) -> Principal {
        Principal::new(self.id, self.username, self.roles)
    }
}
