// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Roles, students and classes.

use axum::{extract::State, response::IntoResponse, Json};
use campus_core::{ClassId, StudentId};

use crate::error::{ApiError, ApiResult};
use crate::extractors::ValidPath;
use crate::state::AppState;

/// GET /roles
pub async fn list_roles(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.directory().list_roles().await?))
}

/// GET /students/{id}
pub async fn get_student(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<StudentId>,
) -> ApiResult<impl IntoResponse> {
    let student = state
        .directory()
        .find_student(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Student"))?;

    Ok(Json(student))
}

/// GET /classes/{id}/students
///
/// Lists the students of a class; 404 if the class does not exist.
pub async fn class_students(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<ClassId>,
) -> ApiResult<impl IntoResponse> {
    if !state.directory().class_exists(id).await? {
        return Err(ApiError::not_found("Class"));
    }

    Ok(Json(state.directory().students_in_class(id).await?))
}
