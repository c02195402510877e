// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Middleware implementations for the API server.
//!
//! Both layers are route layers and run in this order:
//!
//! - [`AuthLayer`]: bearer token authentication
//! - [`AuthorizeLayer`]: endpoint policy enforcement

mod auth;
mod authorize;

pub use auth::{AuthLayer, AuthMiddleware};
pub use authorize::{AuthorizeLayer, AuthorizeMiddleware};
