// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Custom extractors for API handlers.

use axum::{
    extract::{FromRequest, FromRequestParts, Path},
    http::request::Parts,
    Json,
};
use campus_core::Principal;
use serde::de::DeserializeOwned;

use crate::auth::{AuthContext, TOKEN_REJECTED};
use crate::error::ApiError;

// =============================================================================
// Principal Extractor
// =============================================================================

/// Extractor for the authenticated principal.
///
/// Reads the [`AuthContext`] inserted by the auth layer. Returns 401 if the
/// request carries no principal.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentPrincipal(principal): CurrentPrincipal) -> String {
///     principal.username
/// }
/// ```
pub struct CurrentPrincipal(pub Principal);

impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .and_then(|ctx| ctx.principal.clone())
            .map(CurrentPrincipal)
            .ok_or_else(|| ApiError::unauthorized(TOKEN_REJECTED))
    }
}

// =============================================================================
// Validated JSON Extractor
// =============================================================================

/// Extractor for JSON payloads.
///
/// Malformed bodies become a JSON `400` instead of axum's plain-text rejection.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(
        req: axum::http::Request<axum::body::Body>,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e.body_text())))?;

        Ok(ValidatedJson(value))
    }
}

// =============================================================================
// Path Extractor
// =============================================================================

/// Extractor for path parameters with JSON error bodies.
pub struct ValidPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid path parameter: {}", e.body_text())))?;

        Ok(ValidPath(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::{get, post};
    use axum::Router;
    use campus_core::{AccountId, Role};
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Payload {
        name: String,
    }

    #[tokio::test]
    async fn test_current_principal_missing() {
        let mut parts = Request::builder().uri("/").body(()).unwrap().into_parts().0;
        parts.extensions.insert(AuthContext::anonymous());

        let err = CurrentPrincipal::from_request_parts(&mut parts, &()).await.err().unwrap();
        assert!(matches!(err, ApiError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_current_principal_present() {
        let mut parts = Request::builder().uri("/").body(()).unwrap().into_parts().0;
        parts.extensions.insert(AuthContext::authenticated(Principal::new(
            5,
            "ana",
            vec![Role::new(1, "admin")],
        )));

        let CurrentPrincipal(principal) = CurrentPrincipal::from_request_parts(&mut parts, &())
            .await
            .ok()
            .unwrap();
        assert_eq!(principal.id, AccountId::new(5));
    }

    #[tokio::test]
    async fn test_validated_json_rejects_malformed_body() {
        let app = Router::new().route(
            "/",
            post(|ValidatedJson(p): ValidatedJson<Payload>| async move { p.name }),
        );

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_valid_path_rejects_non_numeric_id() {
        let app = Router::new().route(
            "/accounts/{id}",
            get(|ValidPath(id): ValidPath<AccountId>| async move { id.to_string() }),
        );

        let ok = app
            .clone()
            .oneshot(Request::builder().uri("/accounts/12").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);

        let bad = app
            .oneshot(Request::builder().uri("/accounts/abc").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
    }
}
