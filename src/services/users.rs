use sqlx::PgPool;

use super::{ServiceError, ServiceResult};
use crate::auth;
use crate::database::models::{Role, User};

const USER_COLUMNS: &str = "id, email, password, first_name, last_name, role, created_at";

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct UpdateUser {
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    /// New plain-text password, when the admin is resetting it
    pub password: Option<String>,
}

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> ServiceResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS))
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    pub async fn get(&self, id: i32) -> ServiceResult<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", id)))
    }

    pub async fn find_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Admin-created account; the gate list is kept in step with the role.
    pub async fn create(&self, new_user: NewUser) -> ServiceResult<User> {
        let hashed = auth::hash_password(&new_user.password).await?;
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password, first_name, last_name, role)
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&new_user.email)
        .bind(&hashed)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(new_user.role)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO authorized_users (email, role) VALUES ($1, $2)
             ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role",
        )
        .bind(&user.email)
        .bind(user.role)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!("Created {} account {}", user.role, user.email);
        Ok(user)
    }

    /// Self-service sign-up. Only emails on the gate list may register, and
    /// they get the role recorded there.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> ServiceResult<User> {
        let hashed = auth::hash_password(password).await?;
        let mut tx = self.pool.begin().await?;

        let role: Option<Role> = sqlx::query_scalar("SELECT role FROM authorized_users WHERE email = $1")
            .bind(email)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(role) = role else {
            tracing::warn!("Rejected sign-up for unauthorized email {}", email);
            return Err(ServiceError::Forbidden(
                "You are not an authorized user. Please contact a site admin if you believe this is a mistake"
                    .to_string(),
            ));
        };

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password, first_name, last_name, role)
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(email)
        .bind(&hashed)
        .bind(first_name)
        .bind(last_name)
        .bind(role)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!("Registered {} account {}", user.role, user.email);
        Ok(user)
    }

    /// Updates the account and the matching gate-list role in one transaction
    pub async fn update(&self, id: i32, changes: UpdateUser) -> ServiceResult<User> {
        let hashed = match changes.password.as_deref() {
            Some(password) => Some(auth::hash_password(password).await?),
            None => None,
        };
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET first_name = $2, last_name = $3, role = $4, password = COALESCE($5, password)
             WHERE id = $1
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(changes.role)
        .bind(hashed)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", id)))?;

        sqlx::query("UPDATE authorized_users SET role = $2 WHERE email = $1")
            .bind(&user.email)
            .bind(user.role)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!("Updated account {}", user.email);
        Ok(user)
    }

    pub async fn change_password(&self, email: &str, password: &str) -> ServiceResult<()> {
        let hashed = auth::hash_password(password).await?;
        let result = sqlx::query("UPDATE users SET password = $2 WHERE email = $1")
            .bind(email)
            .bind(hashed)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("User {} not found", email)));
        }
        Ok(())
    }

    /// Removes the account and its gate-list entry together. Teachers that
    /// still own classes cannot be removed.
    pub async fn delete(&self, id: i32) -> ServiceResult<()> {
        let mut tx = self.pool.begin().await?;

        let email: String = sqlx::query_scalar("DELETE FROM users WHERE id = $1 RETURNING email")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", id)))?;

        sqlx::query("DELETE FROM authorized_users WHERE email = $1")
            .bind(&email)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!("Deleted account {}", email);
        Ok(())
    }

    /// `None` when the email is unknown or the password does not match
    pub async fn verify_credentials(&self, email: &str, password: &str) -> ServiceResult<Option<User>> {
        let Some(user) = self.find_by_email(email).await? else {
            return Ok(None);
        };
        if auth::verify_password(password, &user.password).await? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }
}
