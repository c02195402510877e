// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Policy enforcement middleware.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::{FromRequestParts, MatchedPath, RawPathParams},
    http::Request,
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};

use crate::auth::AuthContext;
use crate::authz::{AuthorizationEngine, InvocationParams, PolicyTable};
use crate::error::ApiError;

// =============================================================================
// AuthorizeLayer
// =============================================================================

/// Layer that runs the [`AuthorizationEngine`] for the matched endpoint.
///
/// Runs after [`AuthLayer`](super::AuthLayer). Anything but ALLOW is
/// answered with 403.
#[derive(Clone)]
pub struct AuthorizeLayer {
    engine: Arc<AuthorizationEngine>,
    policies: Arc<PolicyTable>,
}

impl AuthorizeLayer {
    /// Creates a new authorize layer.
    pub fn new(engine: Arc<AuthorizationEngine>, policies: Arc<PolicyTable>) -> Self {
        Self { engine, policies }
    }
}

impl<S> Layer<S> for AuthorizeLayer {
    type Service = AuthorizeMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthorizeMiddleware {
            inner,
            engine: self.engine.clone(),
            policies: self.policies.clone(),
        }
    }
}

// =============================================================================
// AuthorizeMiddleware
// =============================================================================

/// Middleware for endpoint policy enforcement.
#[derive(Clone)]
pub struct AuthorizeMiddleware<S> {
    inner: S,
    engine: Arc<AuthorizationEngine>,
    policies: Arc<PolicyTable>,
}

impl<S> Service<Request<Body>> for AuthorizeMiddleware<S>
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

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let engine = self.engine.clone();
        let policies = self.policies.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let (mut parts, body) = req.into_parts();

            let route = parts
                .extensions
                .get::<MatchedPath>()
                .map(|p| p.as_str().to_string())
                .unwrap_or_else(|| parts.uri.path().to_string());

            let Some(policy) = policies.lookup(&parts.method, &route) else {
                tracing::error!(method = %parts.method, route = %route, "No policy for endpoint");
                return Ok(ApiError::forbidden("No policy for endpoint").into_response());
            };

            let params: InvocationParams = match RawPathParams::from_request_parts(&mut parts, &()).await {
                Ok(raw) => raw.iter().collect(),
                Err(_) => InvocationParams::new(),
            };

            let ctx = parts.extensions.get::<AuthContext>();
            let principal = ctx.and_then(|c| c.principal.as_ref());
            let verdict = engine.decide(&policy, principal, &params).await;

            if !verdict.is_allow() {
                tracing::warn!(
                    subject = %ctx.map(AuthContext::subject).unwrap_or_else(|| "anonymous".to_string()),
                    method = %parts.method,
                    route = %route,
                    reason = %verdict.reason,
                    "Access denied"
                );
                return Ok(ApiError::forbidden(format!("Access denied ({})", verdict.reason))
                    .into_response());
            }

            tracing::debug!(method = %parts.method, route = %route, reason = %verdict.reason, "Access granted");
            inner.call(Request::from_parts(parts, body)).await
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::{EndpointPolicy, EngineConfig, SelfMatchVoter};
    use axum::http::{Method, StatusCode};
    use axum::routing::{get, put};
    use axum::Router;
    use campus_core::{MemoryStore, Principal, Role};
    use tower::ServiceExt;

    fn router() -> Router {
        let policies = Arc::new(
            PolicyTable::new()
                .with(Method::GET, "/open", EndpointPolicy::exempt())
                .with(Method::GET, "/admin", EndpointPolicy::roles(["admin"]))
                .with(
                    Method::PUT,
                    "/accounts/{id}",
                    EndpointPolicy::default().with_voter(SelfMatchVoter::default()),
                ),
        );
        let engine = Arc::new(
            AuthorizationEngine::new(EngineConfig::default(), Arc::new(MemoryStore::new())).unwrap(),
        );

        Router::new()
            .route("/open", get(|| async { "open" }))
            .route("/admin", get(|| async { "admin" }))
            .route("/accounts/{id}", put(|| async { "updated" }))
            .route("/unmapped", get(|| async { "unmapped" }))
            .route_layer(AuthorizeLayer::new(engine, policies))
    }

    fn request(method: Method, path: &str, principal: Option<Principal>) -> Request<Body> {
        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let ctx = match principal {
            Some(p) => AuthContext::authenticated(p),
            None => AuthContext::anonymous(),
        };
        req.extensions_mut().insert(ctx);
        req
    }

    fn user(id: i64, role: &str) -> Principal {
        Principal::new(id, "someone", vec![Role::new(1, role)])
    }

    #[tokio::test]
    async fn test_exempt_route_allowed() {
        let response = router().oneshot(request(Method::GET, "/open", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_role_granted() {
        let response = router()
            .oneshot(request(Method::GET, "/admin", Some(user(1, "admin"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_role_missing_forbidden() {
        let response = router()
            .oneshot(request(Method::GET, "/admin", Some(user(1, "teacher"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_path_params_reach_voters() {
        let allowed = router()
            .oneshot(request(Method::PUT, "/accounts/4", Some(user(4, "teacher"))))
            .await
            .unwrap();
        assert_eq!(allowed.status(), StatusCode::OK);

        let denied = router()
            .oneshot(request(Method::PUT, "/accounts/5", Some(user(4, "teacher"))))
            .await
            .unwrap();
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_unmapped_route_forbidden() {
        let response = router()
            .oneshot(request(Method::GET, "/unmapped", Some(user(1, "admin"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_denial_body_is_generic() {
        let response = router()
            .oneshot(request(Method::GET, "/admin", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["message"], "Access denied.");
    }
}
