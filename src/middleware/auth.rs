use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::auth::{validate_jwt, Claims};
use crate::database::models::Role;
use crate::error::ApiError;
use crate::services::{ServiceError, UserService};

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: i32,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// JWT authentication middleware that validates tokens and extracts user context
pub async fn jwt_auth_middleware(headers: HeaderMap, mut request: Request, next: Next) -> Response {
    let token = match extract_jwt_from_headers(&headers) {
        Ok(token) => token,
        Err(msg) => return ApiError::unauthorized(msg).into_response(),
    };

    let claims = match validate_jwt(&token) {
        Ok(claims) => claims,
        Err(e) => return ApiError::from(e).into_response(),
    };

    request.extensions_mut().insert(AuthUser::from(claims));
    next.run(request).await
}

/// Must run after [`jwt_auth_middleware`]. Admin claims are confirmed against
/// the stored account on every request; a demoted or deleted admin is refused
/// even while their token is still valid.
pub async fn require_admin(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(user) = request.extensions().get::<AuthUser>().cloned() else {
        return ApiError::unauthorized("Authentication required").into_response();
    };

    if !user.is_admin() {
        tracing::warn!("Non-admin {} denied access to {}", user.email, request.uri().path());
        return ApiError::forbidden("Admin access required").into_response();
    }

    match UserService::new(state.pool).get(user.id).await {
        Ok(account) if account.role == Role::Admin && account.email == user.email => next.run(request).await,
        Ok(_) | Err(ServiceError::NotFound(_)) => {
            tracing::warn!("Stale admin token for {} refused", user.email);
            ApiError::forbidden("Admin access required").into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
