// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::handlers;
use crate::middleware::{AuthLayer, AuthorizeLayer};
use crate::state::AppState;

/// Every route the server exposes, as registered with the router.
pub fn served_routes() -> Vec<(Method, &'static str)> {
    vec![
        (Method::GET, "/health"),
        (Method::POST, "/accounts/login"),
        (Method::POST, "/accounts"),
        (Method::GET, "/accounts"),
        (Method::DELETE, "/accounts/{id}"),
        (Method::PUT, "/accounts/{id}/change-password"),
        (Method::GET, "/roles"),
        (Method::GET, "/students/{id}"),
        (Method::GET, "/classes/{id}/students"),
    ]
}

// =============================================================================
// ApiServer
// =============================================================================

/// The API server.
pub struct ApiServer {
    state: AppState,
    config: Arc<ApiConfig>,
}

impl ApiServer {
    /// Creates a new API server with the given state.
    pub fn new(state: AppState) -> Self {
        let config = state.config.clone();
        Self { state, config }
    }

    /// Returns the shared state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Checks the policy table against the stored roles and served routes.
    pub async fn validate(&self) -> ApiResult<()> {
        let roles = self.state.directory().list_roles().await?;
        self.state
            .policies
            .validate(roles.iter().map(|r| r.name.as_str()), &served_routes())
    }

    /// Creates the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let access = ServiceBuilder::new()
            .layer(AuthLayer::new(
                self.state.tokens.clone(),
                self.state.policies.clone(),
            ))
            .layer(AuthorizeLayer::new(
                self.state.engine.clone(),
                self.state.policies.clone(),
            ));

        let middleware_stack = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                self.config.request_timeout(),
            ))
            .layer(create_cors_layer(&self.config));

        Router::new()
            .route("/health", get(handlers::health))
            .route("/accounts/login", post(handlers::login))
            .route(
                "/accounts",
                post(handlers::sign_up).get(handlers::list_accounts),
            )
            .route("/accounts/{id}", delete(handlers::delete_account))
            .route(
                "/accounts/{id}/change-password",
                put(handlers::change_password),
            )
            .route("/roles", get(handlers::list_roles))
            .route("/students/{id}", get(handlers::get_student))
            .route("/classes/{id}/students", get(handlers::class_students))
            .route_layer(access)
            .layer(middleware_stack)
            .with_state(self.state.clone())
    }

    /// Runs the server until the shutdown signal resolves.
    ///
    /// The policy table is validated before the listener is bound.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        self.validate().await?;

        let addr = self.config.socket_addr();
        let router = self.router();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to bind {addr}: {e}")))?;

        info!("Starting API server on {}", addr);

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ApiError::internal(format!("Server error: {e}")))?;

        info!("API server shutdown complete");

        Ok(())
    }

    /// Returns the server address.
    pub fn addr(&self) -> SocketAddr {
        self.config.socket_addr()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Creates the CORS layer from configuration.
fn create_cors_layer(config: &ApiConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    if config.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

// =============================================================================
// Tests
// =============================================================================
