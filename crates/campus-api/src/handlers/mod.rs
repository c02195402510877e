// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers for all endpoints.
//!
//! - [`health`]: liveness
//! - [`auth`]: login and password change
//! - [`accounts`]: account management
//! - [`directory`]: roles, students and classes

mod accounts;
mod auth;
mod directory;
mod health;

pub use accounts::*;
pub use auth::*;
pub use directory::*;
pub use health::*;
