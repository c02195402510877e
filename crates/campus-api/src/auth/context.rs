// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication context.

use std::net::IpAddr;

use campus_core::Principal;
use serde::Serialize;
use uuid::Uuid;

/// Per-request authentication state.
///
/// Inserted into request extensions by the authentication layer. Exempt
/// endpoints get a context without a principal.
#[derive(Debug, Clone, Serialize)]
pub struct AuthContext {
    /// The verified principal, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,
    /// Client IP address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<IpAddr>,
    /// Request ID for tracing.
    pub request_id: Uuid,
}

impl AuthContext {
    /// Creates a context for an authenticated principal.
    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
            client_ip: None,
            request_id: Uuid::now_v7(),
        }
    }

    /// Creates an anonymous context.
    pub fn anonymous() -> Self {
        Self {
            principal: None,
            client_ip: None,
            request_id: Uuid::now_v7(),
        }
    }

    /// Sets the client IP address.
    pub fn with_client_ip(mut self, ip: IpAddr) -> Self {
        self.client_ip = Some(ip);
        self
    }

    /// Returns `true` if a principal is attached.
    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    /// Returns the principal ID for logging, or `"anonymous"`.
    pub fn subject(&self) -> String {
        self.principal
            .as_ref()
            .map(|p| p.id.to_string())
            .unwrap_or_else(|| "anonymous".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::Role;

    #[test]
    fn test_authenticated_context() {
        let ctx = AuthContext::authenticated(Principal::new(3, "ana", vec![Role::new(1, "admin")]))
            .with_client_ip("10.0.0.1".parse().unwrap());

        assert!(ctx.is_authenticated());
        assert_eq!(ctx.principal.as_ref().map(|p| p.username.as_str()), Some("ana"));
        assert_eq!(ctx.subject(), "3");
        assert!(ctx.client_ip.is_some());
    }

    #[test]
    fn test_anonymous_context() {
        let ctx = AuthContext::anonymous();
        assert!(!ctx.is_authenticated());
        assert!(ctx.principal.is_none());
        assert_eq!(ctx.subject(), "anonymous");
    }
}
