// handlers/elevated/mod.rs - Admin handlers
//
// Routes here sit behind `jwt_auth_middleware` and `require_admin`.

pub mod authorized_users;
pub mod classes;
pub mod prerequisites;
pub mod subjects;
pub mod users;

use crate::database::models::Role;
use crate::error::ApiError;

/// Parse an optional role field; absent means TEACHER
pub(crate) fn parse_role(raw: Option<&str>) -> Result<Role, ApiError> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        None => Ok(Role::default()),
        Some(raw) => raw
            .parse()
            .map_err(|_| ApiError::invalid_field("role", "Role must be TEACHER or ADMIN")),
    }
}
