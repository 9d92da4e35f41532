// handlers/protected/auth.rs - account endpoints for the signed-in user

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::UserService;
use crate::validation::FieldErrors;

/// GET /api/auth/whoami
pub async fn whoami(State(state): State<AppState>, Extension(auth_user): Extension<AuthUser>) -> ApiResult<User> {
    let user = UserService::new(state.pool).get(auth_user.id).await?;
    Ok(ApiResponse::success(user))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub password: String,
    pub confirm_password: Option<String>,
}

/// PUT /api/auth/password - requires the current password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(req) = payload?;

    let mut errors = FieldErrors::new();
    if req.old_password.is_empty() {
        errors.add("oldPassword", "Old password is required");
    }
    errors.password("password", &req.password);
    errors.password_confirmation("confirmPassword", &req.password, req.confirm_password.as_deref());
    errors.into_result("Invalid password change")?;

    let users = UserService::new(state.pool);
    if users.verify_credentials(&auth_user.email, &req.old_password).await?.is_none() {
        return Err(ApiError::invalid_field("oldPassword", "Old password is incorrect"));
    }

    users.change_password(&auth_user.email, &req.password).await?;
    tracing::info!("Password changed for {}", auth_user.email);

    Ok(ApiResponse::success(json!({ "email": auth_user.email })))
}
