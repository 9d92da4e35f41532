use sqlx::{PgConnection, PgPool};

use super::{ServiceError, ServiceResult};
use crate::database::models::GradeLevel;

pub struct GradeLevelService {
    pool: PgPool,
}

impl GradeLevelService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> ServiceResult<Vec<GradeLevel>> {
        let levels = sqlx::query_as::<_, GradeLevel>("SELECT id, level FROM grade_levels ORDER BY level")
            .fetch_all(&self.pool)
            .await?;
        Ok(levels)
    }
}

/// Map grade levels (9..=12) to their row ids; every level must exist.
pub(crate) async fn resolve_ids(conn: &mut PgConnection, levels: &[i32]) -> ServiceResult<Vec<i32>> {
    if levels.is_empty() {
        return Ok(Vec::new());
    }

    let rows: Vec<(i32, i32)> =
        sqlx::query_as("SELECT id, level FROM grade_levels WHERE level = ANY($1) ORDER BY level")
            .bind(levels)
            .fetch_all(&mut *conn)
            .await?;

    if let Some(missing) = levels.iter().find(|l| !rows.iter().any(|(_, level)| level == *l)) {
        return Err(ServiceError::UnknownReference(format!("Grade level {} not found", missing)));
    }

    Ok(rows.into_iter().map(|(id, _)| id).collect())
}
