// handlers/public/auth.rs - POST /auth/signup and POST /auth/signin
//
// Both return the account together with a bearer token for the /api routes.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::auth::{generate_jwt, Claims};
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::UserService;
use crate::validation::FieldErrors;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: Option<String>,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

impl AuthResponse {
    fn issue(user: User) -> Result<Self, ApiError> {
        let token = generate_jwt(&Claims::for_user(&user))?;
        Ok(Self { user, token })
    }
}

/// POST /auth/signup - register an account for an email on the authorized-user list
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> ApiResult<AuthResponse> {
    let Json(req) = payload?;

    let mut errors = FieldErrors::new();
    let email = errors.email("email", &req.email);
    errors.password("password", &req.password);
    errors.password_confirmation("confirmPassword", &req.password, req.confirm_password.as_deref());
    let first_name = errors.required("firstName", &req.first_name, "First name is required");
    let last_name = errors.required("lastName", &req.last_name, "Last name is required");
    errors.into_result("Invalid sign-up request")?;

    let user = UserService::new(state.pool)
        .register(&email, &req.password, &first_name, &last_name)
        .await?;

    Ok(ApiResponse::created(AuthResponse::issue(user)?))
}

/// POST /auth/signin - exchange email and password for a token
pub async fn signin(
    State(state): State<AppState>,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> ApiResult<AuthResponse> {
    let Json(req) = payload?;

    let mut errors = FieldErrors::new();
    let email = errors.required("email", &req.email, "Email is required");
    if req.password.is_empty() {
        errors.add("password", "Password is required");
    }
    errors.into_result("Email and password are required")?;

    let user = UserService::new(state.pool)
        .verify_credentials(&email, &req.password)
        .await?
        .ok_or_else(|| {
            tracing::info!("Failed sign-in for {}", email);
            ApiError::unauthorized("Invalid email or password")
        })?;

    tracing::debug!("Signed in {}", user.email);
    Ok(ApiResponse::success(AuthResponse::issue(user)?))
}
