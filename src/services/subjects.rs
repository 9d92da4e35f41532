use sqlx::PgPool;

use super::{ServiceError, ServiceResult};
use crate::database::models::Subject;

pub struct SubjectService {
    pool: PgPool,
}

impl SubjectService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> ServiceResult<Vec<Subject>> {
        let subjects = sqlx::query_as::<_, Subject>("SELECT id, name FROM subjects ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(subjects)
    }

    pub async fn create(&self, name: &str) -> ServiceResult<Subject> {
        let subject = sqlx::query_as::<_, Subject>("INSERT INTO subjects (name) VALUES ($1) RETURNING id, name")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!("Created subject {} ({})", subject.name, subject.id);
        Ok(subject)
    }

    pub async fn update(&self, id: i32, name: &str) -> ServiceResult<Subject> {
        sqlx::query_as::<_, Subject>("UPDATE subjects SET name = $2 WHERE id = $1 RETURNING id, name")
            .bind(id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Subject {} not found", id)))
    }

    /// Fails with a foreign-key conflict while classes or prerequisites use the subject
    pub async fn delete(&self, id: i32) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM subjects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("Subject {} not found", id)));
        }
        tracing::info!("Deleted subject {}", id);
        Ok(())
    }
}
