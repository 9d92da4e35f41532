use sqlx::{PgConnection, PgPool};

use super::grade_levels::resolve_ids;
use super::{ServiceError, ServiceResult};
use crate::database::models::PreRequisite;

const PREREQUISITE_SELECT: &str = r#"
    SELECT p.id, p.name, p.subject_id, s.name AS subject_name,
           ARRAY(
               SELECT g.level
               FROM prerequisite_grade_levels pg
               JOIN grade_levels g ON g.id = pg.grade_level_id
               WHERE pg.prerequisite_id = p.id
               ORDER BY g.level
           ) AS grade_levels
    FROM prerequisites p
    JOIN subjects s ON s.id = p.subject_id
"#;

#[derive(Debug, Clone)]
pub struct NewPreRequisite {
    pub name: String,
    /// Subject name
    pub subject: String,
    pub grade_levels: Vec<i32>,
}

#[derive(Debug, Clone)]
pub struct UpdatePreRequisite {
    pub name: String,
    pub subject_id: i32,
    pub grade_levels: Vec<i32>,
}

pub struct PreRequisiteService {
    pool: PgPool,
}

impl PreRequisiteService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> ServiceResult<Vec<PreRequisite>> {
        let rows = sqlx::query_as::<_, PreRequisite>(&format!("{} ORDER BY s.name, p.name", PREREQUISITE_SELECT))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get(&self, id: i32) -> ServiceResult<PreRequisite> {
        sqlx::query_as::<_, PreRequisite>(&format!("{} WHERE p.id = $1", PREREQUISITE_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Prerequisite {} not found", id)))
    }

    pub async fn create(&self, new: NewPreRequisite) -> ServiceResult<PreRequisite> {
        let mut tx = self.pool.begin().await?;

        let subject_id: i32 = sqlx::query_scalar("SELECT id FROM subjects WHERE name = $1")
            .bind(&new.subject)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| ServiceError::UnknownReference(format!("Subject \"{}\" not found.", new.subject)))?;

        let grade_level_ids = resolve_ids(&mut *tx, &new.grade_levels).await?;

        let id: i32 = sqlx::query_scalar("INSERT INTO prerequisites (name, subject_id) VALUES ($1, $2) RETURNING id")
            .bind(&new.name)
            .bind(subject_id)
            .fetch_one(&mut *tx)
            .await?;

        link_grade_levels(&mut *tx, id, &grade_level_ids).await?;
        tx.commit().await?;

        tracing::info!("Created prerequisite {} ({}) for subject {}", new.name, id, new.subject);
        self.get(id).await
    }

    /// Replaces name, subject and the full grade-level set
    pub async fn update(&self, id: i32, changes: UpdatePreRequisite) -> ServiceResult<PreRequisite> {
        let mut tx = self.pool.begin().await?;

        let subject_exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM subjects WHERE id = $1)")
            .bind(changes.subject_id)
            .fetch_one(&mut *tx)
            .await?;
        if !subject_exists {
            return Err(ServiceError::UnknownReference(format!("Subject {} not found.", changes.subject_id)));
        }

        let grade_level_ids = resolve_ids(&mut *tx, &changes.grade_levels).await?;

        let result = sqlx::query("UPDATE prerequisites SET name = $2, subject_id = $3 WHERE id = $1")
            .bind(id)
            .bind(&changes.name)
            .bind(changes.subject_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("Prerequisite {} not found", id)));
        }

        sqlx::query("DELETE FROM prerequisite_grade_levels WHERE prerequisite_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        link_grade_levels(&mut *tx, id, &grade_level_ids).await?;
        tx.commit().await?;

        tracing::info!("Updated prerequisite {}", id);
        self.get(id).await
    }

    /// Fails with a foreign-key conflict while an AP class still lists it
    pub async fn delete(&self, id: i32) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM prerequisites WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("Prerequisite {} not found", id)));
        }
        tracing::info!("Deleted prerequisite {}", id);
        Ok(())
    }
}

pub(crate) async fn link_grade_levels(
    conn: &mut PgConnection,
    prerequisite_id: i32,
    grade_level_ids: &[i32],
) -> ServiceResult<()> {
    sqlx::query(
        "INSERT INTO prerequisite_grade_levels (prerequisite_id, grade_level_id)
         SELECT $1, UNNEST($2::int[])
         ON CONFLICT DO NOTHING",
    )
    .bind(prerequisite_id)
    .bind(grade_level_ids)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
