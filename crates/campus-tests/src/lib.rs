// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Campus Integration Tests
//!
//! Shared fixtures and helpers for the integration suites under `tests/`.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities
//!   - `fixtures`: A seeded campus with one account per role mix
//!   - `builders`: Builders for principals and request bodies
//!   - `assertions`: Assertion helpers for verdicts and responses
//!   - `mocks`: Failing stores and scripted voters
//!   - `harness`: An in-process router driven with `tower::ServiceExt::oneshot`
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p campus-tests
//! cargo test -p campus-tests --test integration_authz
//! ```
//!
//! ## Using the Harness
//!
//! ```rust,ignore
//! use campus_tests::prelude::*;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let app = TestApp::new();
//!     let token = app.login(ADMIN_USER, ADMIN_PASSWORD).await;
//!     app.get("/roles", Some(&token)).await.assert_status(StatusCode::OK);
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::assertions::*;
    pub use crate::common::builders::*;
    pub use crate::common::fixtures::*;
    pub use crate::common::harness::*;
    pub use crate::common::mocks::*;
    pub use axum::http::{Method, StatusCode};
}
