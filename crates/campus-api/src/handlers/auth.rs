// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication handlers.

use axum::{extract::State, response::IntoResponse, Json};
use campus_core::AccountId;
use serde::Deserialize;

use crate::auth::{CredentialVerifier, Credentials};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{CurrentPrincipal, ValidPath, ValidatedJson};
use crate::response::{LoginResponse, MessageResponse};
use crate::state::AppState;

/// Returned for a wrong current password or a weak new password.
pub const PASSWORD_CHANGE_REJECTED: &str = "Incorrect current password or invalid new password.";

// =============================================================================
// Login
// =============================================================================

/// POST /accounts/login
///
/// Verifies credentials and returns a signed bearer token.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(credentials): ValidatedJson<Credentials>,
) -> ApiResult<impl IntoResponse> {
    let account = state.credentials.verify_credentials(&credentials).await?;
    let principal = CredentialVerifier::convert_to_principal(&account);
    let token = state.tokens().generate_token(Some(&principal))?;

    tracing::info!(account_id = %account.id, "Login succeeded");

    Ok(Json(LoginResponse::bearer(token, state.tokens().ttl_secs())))
}

// =============================================================================
// Change Password
// =============================================================================

/// Change password request body.
#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    /// Current password.
    pub current_password: String,
    /// New password.
    pub new_password: String,
}

impl std::fmt::Debug for ChangePasswordRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangePasswordRequest").finish_non_exhaustive()
    }
}

/// PUT /accounts/{id}/change-password
///
/// Only reachable for the account owner; the policy guarding this route
/// checks the path id against the principal.
pub async fn change_password(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    ValidPath(id): ValidPath<AccountId>,
    ValidatedJson(request): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    let account = state
        .directory()
        .find_account_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Account"))?;

    let current_ok = state
        .hasher()
        .verify(&request.current_password, &account.password_hash)?;

    if !current_ok || !state.credentials.validate_password(&request.new_password) {
        tracing::debug!(account_id = %id, "Password change rejected");
        return Err(ApiError::bad_request(PASSWORD_CHANGE_REJECTED));
    }

    let hash = state.hasher().hash(&request.new_password)?;
    state.directory().update_password(id, hash).await?;

    tracing::info!(account_id = %id, actor = %principal.id, "Password changed");

    Ok(Json(MessageResponse::new("Password changed.")))
}
