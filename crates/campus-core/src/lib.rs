// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # campus-core
//!
//! Shared domain types and storage abstractions for the campus service.
//!
//! - **Types**: `AccountId`, `Role`, `Principal`, `Account`, `Student`, `UniversityClass`
//! - **Error**: `CoreError` / `StoreError`
//! - **Store**: `AccountStore` and `DirectoryStore` traits
//! - **Memory**: `MemoryStore`, a `parking_lot`-guarded implementation
//!
//! ## Example
//!
//! ```rust,ignore
//! use campus_core::prelude::*;
//!
//! let store = MemoryStore::new();
//! store.insert_role(Role::new(1, role_names::ADMIN));
//!
//! let roles = store.find_roles_for_account(AccountId::new(1)).await?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod memory;
pub mod store;
pub mod types;

pub use error::{CoreError, CoreResult, StoreError};
pub use memory::MemoryStore;
pub use store::{AccountStore, DirectoryStore, StoreResult};
pub use types::{
    role_names, Account, AccountId, AccountView, ClassId, NewAccount, Principal, Role, RoleId,
    RoleMapping, Student, StudentId, StudentLink, UniversityClass,
};

/// Commonly used imports.
pub mod prelude {
    pub use crate::error::{CoreError, CoreResult, StoreError};
    pub use crate::memory::MemoryStore;
    pub use crate::store::{AccountStore, DirectoryStore, StoreResult};
    pub use crate::types::*;
}
