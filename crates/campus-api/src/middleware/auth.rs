// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Bearer token authentication middleware.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::{ConnectInfo, MatchedPath},
    http::{header, Request},
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};

use crate::auth::{AuthContext, TokenService};
use crate::authz::PolicyTable;

// =============================================================================
// AuthLayer
// =============================================================================

/// Layer that verifies the bearer token of non-exempt endpoints.
///
/// Must be applied with `route_layer` so the matched route is known. On
/// success an [`AuthContext`] carrying the principal is inserted into the
/// request extensions; exempt endpoints get an anonymous context.
#[derive(Clone)]
pub struct AuthLayer {
    tokens: Arc<TokenService>,
    policies: Arc<PolicyTable>,
}

impl AuthLayer {
    /// Creates a new auth layer.
    pub fn new(tokens: Arc<TokenService>, policies: Arc<PolicyTable>) -> Self {
        Self { tokens, policies }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            tokens: self.tokens.clone(),
            policies: self.policies.clone(),
        }
    }
}

// =============================================================================
// AuthMiddleware
// =============================================================================

/// Middleware for bearer token authentication.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    tokens: Arc<TokenService>,
    policies: Arc<PolicyTable>,
}

impl<S> AuthMiddleware<S> {
    fn is_exempt<B>(&self, req: &Request<B>) -> bool {
        req.extensions()
            .get::<MatchedPath>()
            .and_then(|path| self.policies.lookup(req.method(), path.as_str()))
            .is_some_and(|policy| policy.is_exempt())
    }
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let tokens = self.tokens.clone();
        let is_exempt = self.is_exempt(&req);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let client_ip = req
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| ci.0.ip());

            let auth_ctx = if is_exempt {
                AuthContext::anonymous()
            } else {
                let token = extract_bearer_token(&req);
                match tokens.verify_token(token.as_deref()) {
                    Ok(principal) => AuthContext::authenticated(principal),
                    Err(e) => {
                        tracing::debug!(
                            path = %req.uri().path(),
                            has_token = token.is_some(),
                            "Request rejected by authentication"
                        );
                        return Ok(e.into_response());
                    }
                }
            };

            let auth_ctx = match client_ip {
                Some(ip) => auth_ctx.with_client_ip(ip),
                None => auth_ctx,
            };

            tracing::trace!(
                request_id = %auth_ctx.request_id,
                subject = %auth_ctx.subject(),
                authenticated = auth_ctx.is_authenticated(),
                "Request authenticated"
            );

            req.extensions_mut().insert(auth_ctx);
            inner.call(req).await
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token<B>(req: &Request<B>) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtConfig;
    use crate::authz::EndpointPolicy;
    use axum::http::{HeaderValue, Method, StatusCode};
    use axum::routing::get;
    use axum::{Extension, Router};
    use campus_core::{Principal, Role};
    use tower::ServiceExt;

    fn tokens() -> Arc<TokenService> {
        Arc::new(TokenService::new(JwtConfig::new("auth-layer-test-secret-0123456789abcdef")).unwrap())
    }

    fn router(tokens: Arc<TokenService>) -> Router {
        let policies = PolicyTable::new()
            .with(Method::GET, "/open", EndpointPolicy::exempt())
            .with(Method::GET, "/closed", EndpointPolicy::roles(["admin"]));

        Router::new()
            .route(
                "/open",
                get(|Extension(ctx): Extension<AuthContext>| async move { ctx.subject() }),
            )
            .route(
                "/closed",
                get(|Extension(ctx): Extension<AuthContext>| async move { ctx.subject() }),
            )
            .route_layer(AuthLayer::new(tokens, Arc::new(policies)))
    }

    fn request(path: &str, token: Option<&str>) -> Request<Body> {
        let mut req = Request::builder().uri(path).body(Body::empty()).unwrap();
        if let Some(token) = token {
            req.headers_mut().insert(
                header::AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
            );
        }
        req
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut req = Request::builder().uri("/test").body(Body::empty()).unwrap();
        assert!(extract_bearer_token(&req).is_none());

        req.headers_mut()
            .insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer_token(&req).is_none());

        req.headers_mut().insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer mytoken123"),
        );
        assert_eq!(extract_bearer_token(&req), Some("mytoken123".to_string()));
    }

    #[tokio::test]
    async fn test_exempt_route_needs_no_token() {
        let response = router(tokens()).oneshot(request("/open", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_token_rejected() {
        let response = router(tokens()).oneshot(request("/closed", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_token_rejected() {
        let response = router(tokens())
            .oneshot(request("/closed", Some("not.a.token")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_token_attaches_principal() {
        let tokens = tokens();
        let principal = Principal::new(12, "ana", vec![Role::new(1, "admin")]);
        let token = tokens.generate_token(Some(&principal)).unwrap();

        let response = router(tokens)
            .oneshot(request("/closed", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"12");
    }
}
