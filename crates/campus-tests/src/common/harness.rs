// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Harness
//!
//! Drives the full router in-process, middleware included, without binding
//! a socket.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use campus_api::{
    ApiConfig, ApiServer, AppState, AppStateBuilder, Argon2Hasher, PasswordHasher, PolicyTable,
};
use campus_core::DirectoryStore;
use serde_json::Value;
use tower::ServiceExt;

use super::builders::login_body;
use super::fixtures::{CampusFixtures, ConfigFixtures};

// =============================================================================
// TestResponse
// =============================================================================

/// A buffered response.
#[derive(Debug, Clone)]
pub struct TestResponse {
    /// Status code.
    pub status: StatusCode,
    /// Parsed JSON body, `Value::Null` if the body was empty or not JSON.
    pub body: Value,
}

impl TestResponse {
    /// Asserts the status code and returns `self` for chaining.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status, expected,
            "Expected status {}, got {} with body {}",
            expected, self.status, self.body
        );
        self
    }

    /// Asserts the `error.code` field of an error body.
    pub fn assert_error_code(&self, expected: &str) -> &Self {
        assert_eq!(
            self.error_code(),
            Some(expected),
            "Expected error code {expected}, got body {}",
            self.body
        );
        self
    }

    /// Returns `error.code`, if present.
    pub fn error_code(&self) -> Option<&str> {
        self.body["error"]["code"].as_str()
    }

    /// Returns `error.message`, if present.
    pub fn error_message(&self) -> Option<&str> {
        self.body["error"]["message"].as_str()
    }
}

// =============================================================================
// TestApp
// =============================================================================

/// The campus router over a fixture store.
pub struct TestApp {
    router: Router,
    state: AppState,
}

impl TestApp {
    /// The seeded campus with default policies and configuration.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts a customized app.
    pub fn builder() -> TestAppBuilder {
        TestAppBuilder::default()
    }

    /// Returns the shared state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Returns a server over the same state.
    pub fn server(&self) -> ApiServer {
        ApiServer::new(self.state.clone())
    }

    /// Logs in and returns the bearer token, panicking on failure.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .send(Method::POST, "/accounts/login", None, Some(login_body(username, password)))
            .await;
        response.assert_status(StatusCode::OK);
        response.body["token"]
            .as_str()
            .expect("login response carries a token")
            .to_string()
    }

    /// Sends a request and buffers the response.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .expect("valid request");

        self.send_raw(request).await
    }

    /// Sends a prebuilt request.
    pub async fn send_raw(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// `GET uri`
    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, token, None).await
    }

    /// `POST uri` with a JSON body.
    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    /// `PUT uri` with a JSON body.
    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, token, Some(body)).await
    }

    /// `DELETE uri`
    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::DELETE, uri, token, None).await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TestAppBuilder
// =============================================================================

/// Installs a store into the state builder, given the app's hasher.
type StoreInstaller =
    Box<dyn FnOnce(&Arc<dyn PasswordHasher>, AppStateBuilder) -> AppStateBuilder>;

/// Builder for [`TestApp`].
#[derive(Default)]
pub struct TestAppBuilder {
    config: Option<ApiConfig>,
    store: Option<StoreInstaller>,
    policies: Option<PolicyTable>,
}

impl TestAppBuilder {
    /// Overrides the API configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Overrides the policy table.
    pub fn policies(mut self, policies: PolicyTable) -> Self {
        self.policies = Some(policies);
        self
    }

    /// Replaces the fixture store with one built from the app's hasher.
    pub fn store_with<F, S>(mut self, factory: F) -> Self
    where
        F: FnOnce(&dyn PasswordHasher) -> S + 'static,
        S: DirectoryStore + 'static,
    {
        self.store = Some(Box::new(move |hasher, builder| {
            builder.store(Arc::new(factory(hasher.as_ref())))
        }));
        self
    }

    /// Installs a store the test keeps a handle to.
    pub fn shared_store<S>(mut self, store: Arc<S>) -> Self
    where
        S: DirectoryStore + 'static,
    {
        self.store = Some(Box::new(move |_, builder| builder.store(store)));
        self
    }

    /// Builds the app.
    pub fn build(self) -> TestApp {
        let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::for_testing());

        let mut builder = AppState::builder()
            .config(self.config.unwrap_or_else(ConfigFixtures::api))
            .hasher(hasher.clone());
        builder = match self.store {
            Some(install) => install(&hasher, builder),
            None => builder.store(Arc::new(CampusFixtures::seeded_store(hasher.as_ref()))),
        };
        if let Some(policies) = self.policies {
            builder = builder.policies(policies);
        }

        let state = builder.build().expect("test state builds");
        let router = ApiServer::new(state.clone()).router();

        TestApp { router, state }
    }
}
