// handlers/elevated/authorized_users.rs - the sign-up gate list

use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, Path, State},
    Json,
};
use serde::Deserialize;

use super::parse_role;
use crate::app::AppState;
use crate::database::models::AuthorizedUser;
use crate::middleware::{ApiResponse, ApiResult, Deleted};
use crate::services::AuthorizedUserService;
use crate::validation::FieldErrors;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AuthorizedUserRequest {
    pub email: String,
    pub role: Option<String>,
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<AuthorizedUser>> {
    Ok(ApiResponse::success(AuthorizedUserService::new(state.pool).list().await?))
}

/// 409 "Email already exists!" when the email is already listed
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<AuthorizedUserRequest>, JsonRejection>,
) -> ApiResult<AuthorizedUser> {
    let Json(req) = payload?;

    let mut errors = FieldErrors::new();
    let email = errors.email("email", &req.email);
    errors.into_result("Invalid email")?;
    let role = parse_role(req.role.as_deref())?;

    let entry = AuthorizedUserService::new(state.pool).create(&email, role).await?;
    Ok(ApiResponse::created(entry))
}

pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Deleted<String>> {
    let Path(email) = path?;
    AuthorizedUserService::new(state.pool).delete(&email).await?;
    Ok(ApiResponse::deleted(email))
}
