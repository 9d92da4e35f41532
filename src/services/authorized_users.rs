use sqlx::PgPool;

use super::{ServiceError, ServiceResult};
use crate::database::models::{AuthorizedUser, Role};

/// The sign-up gate list
pub struct AuthorizedUserService {
    pool: PgPool,
}

impl AuthorizedUserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> ServiceResult<Vec<AuthorizedUser>> {
        let entries = sqlx::query_as::<_, AuthorizedUser>(
            "SELECT id, email, role FROM authorized_users ORDER BY email",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    pub async fn find(&self, email: &str) -> ServiceResult<Option<AuthorizedUser>> {
        let entry = sqlx::query_as::<_, AuthorizedUser>(
            "SELECT id, email, role FROM authorized_users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entry)
    }

    pub async fn create(&self, email: &str, role: Role) -> ServiceResult<AuthorizedUser> {
        let entry = sqlx::query_as::<_, AuthorizedUser>(
            "INSERT INTO authorized_users (email, role) VALUES ($1, $2) RETURNING id, email, role",
        )
        .bind(email)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Authorized {} as {}", entry.email, entry.role);
        Ok(entry)
    }

    /// Revokes the right to sign up; existing accounts are left alone
    pub async fn delete(&self, email: &str) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM authorized_users WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("{} is not an authorized user", email)));
        }
        tracing::info!("Revoked authorization for {}", email);
        Ok(())
    }
}
