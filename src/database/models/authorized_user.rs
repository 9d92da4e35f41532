use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::user::Role;

/// Email pre-approved to register an account with the given role
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuthorizedUser {
    pub id: i32,
    pub email: String,
    pub role: Role,
}
