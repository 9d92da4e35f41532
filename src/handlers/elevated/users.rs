// handlers/elevated/users.rs - /api/admin/users

use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, Path, State},
    Extension, Json,
};
use serde::Deserialize;

use super::parse_role;
use crate::app::AppState;
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Deleted};
use crate::services::{NewUser, UpdateUser, UserService};
use crate::validation::FieldErrors;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRequest {
    pub email: String,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub role: Option<String>,
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    Ok(ApiResponse::success(UserService::new(state.pool).list().await?))
}

pub async fn show(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<User> {
    let Path(id) = path?;
    Ok(ApiResponse::success(UserService::new(state.pool).get(id).await?))
}

/// Creates the account and puts the email on the authorized-user list
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Json(req) = payload?;

    let mut errors = FieldErrors::new();
    let email = errors.email("email", &req.email);
    let password = req.password.clone().unwrap_or_default();
    errors.password("password", &password);
    errors.password_confirmation("confirmPassword", &password, req.confirm_password.as_deref());
    let first_name = errors.required("firstName", &req.first_name, "First name is required");
    let last_name = errors.required("lastName", &req.last_name, "Last name is required");
    let role = parse_role(req.role.as_deref());
    if role.is_err() {
        errors.add("role", "Role must be TEACHER or ADMIN");
    }
    errors.into_result("Invalid user")?;

    let user = UserService::new(state.pool)
        .create(NewUser {
            email,
            password,
            first_name,
            last_name,
            role: role?,
        })
        .await?;
    Ok(ApiResponse::created(user))
}

/// Names and role; the password only when one is supplied
pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Path(id) = path?;
    let Json(req) = payload?;

    let mut errors = FieldErrors::new();
    let first_name = errors.required("firstName", &req.first_name, "First name is required");
    let last_name = errors.required("lastName", &req.last_name, "Last name is required");
    let password = req.password.clone().filter(|p| !p.is_empty());
    if let Some(password) = &password {
        errors.password("password", password);
        errors.password_confirmation("confirmPassword", password, req.confirm_password.as_deref());
    }
    let role = parse_role(req.role.as_deref());
    if role.is_err() {
        errors.add("role", "Role must be TEACHER or ADMIN");
    }
    errors.into_result("Invalid user")?;

    let user = UserService::new(state.pool)
        .update(
            id,
            UpdateUser {
                first_name,
                last_name,
                role: role?,
                password,
            },
        )
        .await?;
    Ok(ApiResponse::success(user))
}

/// An admin cannot delete their own account
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<Deleted<i32>> {
    let Path(id) = path?;
    if auth_user.id == id {
        return Err(ApiError::bad_request("You cannot delete your own account"));
    }
    UserService::new(state.pool).delete(id).await?;
    Ok(ApiResponse::deleted(id))
}
