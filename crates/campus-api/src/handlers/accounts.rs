// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Account management handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use campus_core::{AccountId, AccountView, NewAccount, RoleId, StudentId};
use serde::Deserialize;

use crate::auth::Credentials;
use crate::error::{ApiError, ApiResult};
use crate::extractors::{CurrentPrincipal, ValidPath, ValidatedJson};
use crate::response::MessageResponse;
use crate::state::AppState;

// =============================================================================
// Sign Up
// =============================================================================

/// Account creation request body.
#[derive(Deserialize)]
pub struct SignUpRequest {
    /// Login name.
    pub username: String,
    /// Plaintext password.
    pub password: String,
    /// Roles to assign.
    #[serde(default)]
    pub role_ids: Vec<RoleId>,
    /// Linked student record.
    #[serde(default)]
    pub student_id: Option<StudentId>,
}

impl std::fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("username", &self.username)
            .field("role_ids", &self.role_ids)
            .field("student_id", &self.student_id)
            .finish_non_exhaustive()
    }
}

/// POST /accounts
///
/// Creates an account with the given roles.
pub async fn sign_up(
    State(state): State<AppState>,
    CurrentPrincipal(actor): CurrentPrincipal,
    ValidatedJson(request): ValidatedJson<SignUpRequest>,
) -> ApiResult<impl IntoResponse> {
    let credentials = Credentials::new(request.username, request.password);
    state.credentials.validate_credentials(&credentials)?;

    for role_id in &request.role_ids {
        if state.directory().find_role(*role_id).await?.is_none() {
            return Err(ApiError::not_found("Role"));
        }
    }

    let password_hash = state.hasher().hash(&credentials.password)?;
    let mut account = state
        .directory()
        .create_account_with_roles(
            NewAccount {
                username: credentials.username,
                password_hash,
                student_id: request.student_id,
            },
            &request.role_ids,
        )
        .await?;
    account.roles = state.roles.resolve_roles(account.id).await?;

    tracing::info!(
        account_id = %account.id,
        actor = %actor.id,
        roles = ?account.roles.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
        "Account created"
    );

    Ok((StatusCode::CREATED, Json(AccountView::from(&account))))
}

// =============================================================================
// List / Delete
// =============================================================================

/// GET /accounts
pub async fn list_accounts(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let accounts = state.directory().list_accounts().await?;
    let views: Vec<AccountView> = accounts.iter().map(AccountView::from).collect();
    Ok(Json(views))
}

/// DELETE /accounts/{id}
///
/// Removes the account together with its role mappings.
pub async fn delete_account(
    State(state): State<AppState>,
    CurrentPrincipal(actor): CurrentPrincipal,
    ValidPath(id): ValidPath<AccountId>,
) -> ApiResult<impl IntoResponse> {
    state.directory().delete_account(id).await?;

    tracing::info!(account_id = %id, actor = %actor.id, "Account deleted");

    Ok(Json(MessageResponse::new("Account deleted.")))
}
