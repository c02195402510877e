// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Role lookup.

use std::collections::BTreeSet;
use std::sync::Arc;

use campus_core::{AccountId, AccountStore, Role};

use crate::error::ApiResult;

/// Loads the roles assigned to an account.
#[derive(Clone)]
pub struct RoleResolver {
    store: Arc<dyn AccountStore>,
}

impl RoleResolver {
    /// Creates a resolver over the given store.
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Returns the roles of an account. Unknown accounts have none.
    pub async fn resolve_roles(&self, account_id: AccountId) -> ApiResult<Vec<Role>> {
        let roles = self.store.find_roles_for_account(account_id).await?;
        tracing::trace!(account_id = %account_id, count = roles.len(), "Roles resolved");
        Ok(roles)
    }

    /// Returns the distinct names of the given roles.
    pub fn role_names<'a>(roles: impl IntoIterator<Item = &'a Role>) -> BTreeSet<&'a str> {
        roles.into_iter().map(|r| r.name.as_str()).collect()
    }
}

impl std::fmt::Debug for RoleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleResolver")
            .field("store", &self.store.name())
            .finish()
    }
}
