use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use super::grade_levels::resolve_ids;
use super::{ServiceError, ServiceResult};
use crate::database::models::{ApClass, Role};

const AP_CLASS_SELECT: &str = r#"
    SELECT c.id, c.name, c.description, c.resources, c.offered, c.subject_id,
           s.name AS subject_name, c.teacher_email,
           ARRAY(
               SELECT g.level
               FROM ap_class_grade_levels cg
               JOIN grade_levels g ON g.id = cg.grade_level_id
               WHERE cg.ap_class_id = c.id
               ORDER BY g.level
           ) AS grade_levels,
           ARRAY(
               SELECT cp.prerequisite_id
               FROM ap_class_prerequisites cp
               WHERE cp.ap_class_id = c.id
               ORDER BY cp.prerequisite_id
           ) AS prerequisite_ids,
           ARRAY(
               SELECT p.name
               FROM ap_class_prerequisites cp
               JOIN prerequisites p ON p.id = cp.prerequisite_id
               WHERE cp.ap_class_id = c.id
               ORDER BY p.id
           ) AS prerequisite_names
    FROM ap_classes c
    JOIN subjects s ON s.id = c.subject_id
"#;

/// Browse filters; all optional and combined with AND
#[derive(Debug, Clone, Default)]
pub struct ApClassFilter {
    /// Case-insensitive substring of the class name
    pub name_contains: Option<String>,
    pub offered: Option<bool>,
    pub teacher_email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewApClass {
    pub name: String,
    pub description: String,
    pub resources: Option<String>,
    pub offered: bool,
    /// Subject name
    pub subject: String,
    pub teacher_email: String,
    pub grade_levels: Vec<i32>,
    pub prerequisite_ids: Vec<i32>,
}

#[derive(Debug, Clone)]
pub struct UpdateApClass {
    pub name: String,
    pub description: String,
    pub resources: Option<String>,
    pub offered: bool,
    pub subject_id: i32,
    pub teacher_email: String,
    pub grade_levels: Vec<i32>,
    pub prerequisite_ids: Vec<i32>,
}

pub struct ApClassService {
    pool: PgPool,
}

impl ApClassService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &ApClassFilter) -> ServiceResult<Vec<ApClass>> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(AP_CLASS_SELECT);
        query.push(" WHERE TRUE");

        if let Some(fragment) = filter.name_contains.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query.push(" AND c.name ILIKE ").push_bind(like_pattern(fragment));
        }
        if let Some(offered) = filter.offered {
            query.push(" AND c.offered = ").push_bind(offered);
        }
        if let Some(email) = &filter.teacher_email {
            query.push(" AND c.teacher_email = ").push_bind(email.clone());
        }
        query.push(" ORDER BY c.name");

        let classes = query.build_query_as::<ApClass>().fetch_all(&self.pool).await?;
        Ok(classes)
    }

    pub async fn get(&self, id: i32) -> ServiceResult<ApClass> {
        sqlx::query_as::<_, ApClass>(&format!("{} WHERE c.id = $1", AP_CLASS_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("AP class {} not found", id)))
    }

    /// Subject is resolved by name and the teacher by email; both must exist.
    pub async fn create(&self, new: NewApClass) -> ServiceResult<ApClass> {
        let mut tx = self.pool.begin().await?;

        let subject_id: Option<i32> = sqlx::query_scalar("SELECT id FROM subjects WHERE name = $1")
            .bind(&new.subject)
            .fetch_optional(&mut *tx)
            .await?;
        let has_teacher = teacher_exists(&mut *tx, &new.teacher_email).await?;

        let subject_id = match subject_id {
            Some(id) if has_teacher => id,
            _ => return Err(ServiceError::UnknownReference("Subject or Teacher not found.".to_string())),
        };

        let grade_level_ids = resolve_ids(&mut *tx, &new.grade_levels).await?;
        check_prerequisites(&mut *tx, &new.prerequisite_ids).await?;

        let id: i32 = sqlx::query_scalar(
            "INSERT INTO ap_classes (name, description, resources, offered, subject_id, teacher_email)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id",
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.resources)
        .bind(new.offered)
        .bind(subject_id)
        .bind(&new.teacher_email)
        .fetch_one(&mut *tx)
        .await?;

        link(&mut *tx, id, &grade_level_ids, &new.prerequisite_ids).await?;
        tx.commit().await?;

        tracing::info!("Created AP class {} ({}) taught by {}", new.name, id, new.teacher_email);
        self.get(id).await
    }

    /// Full replacement of the class row and both link sets
    pub async fn update(&self, id: i32, changes: UpdateApClass) -> ServiceResult<ApClass> {
        let mut tx = self.pool.begin().await?;

        let subject_exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM subjects WHERE id = $1)")
            .bind(changes.subject_id)
            .fetch_one(&mut *tx)
            .await?;
        if !subject_exists || !teacher_exists(&mut *tx, &changes.teacher_email).await? {
            return Err(ServiceError::UnknownReference("Subject or Teacher not found.".to_string()));
        }

        let grade_level_ids = resolve_ids(&mut *tx, &changes.grade_levels).await?;
        check_prerequisites(&mut *tx, &changes.prerequisite_ids).await?;

        let result = sqlx::query(
            "UPDATE ap_classes
             SET name = $2, description = $3, resources = $4, offered = $5, subject_id = $6, teacher_email = $7
             WHERE id = $1",
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(&changes.resources)
        .bind(changes.offered)
        .bind(changes.subject_id)
        .bind(&changes.teacher_email)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("AP class {} not found", id)));
        }

        sqlx::query("DELETE FROM ap_class_grade_levels WHERE ap_class_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM ap_class_prerequisites WHERE ap_class_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        link(&mut *tx, id, &grade_level_ids, &changes.prerequisite_ids).await?;
        tx.commit().await?;

        tracing::info!("Updated AP class {}", id);
        self.get(id).await
    }

    /// Teacher-editable fields. Teachers may only touch their own classes;
    /// admins may edit any.
    pub async fn update_teacher_fields(
        &self,
        id: i32,
        description: &str,
        resources: Option<&str>,
        editor_email: &str,
        editor_role: Role,
    ) -> ServiceResult<ApClass> {
        let owner: String = sqlx::query_scalar("SELECT teacher_email FROM ap_classes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("AP class {} not found", id)))?;

        if editor_role != Role::Admin && owner != editor_email {
            tracing::warn!("{} attempted to edit AP class {} owned by {}", editor_email, id, owner);
            return Err(ServiceError::Forbidden("You can only edit your own AP classes".to_string()));
        }

        sqlx::query("UPDATE ap_classes SET description = $2, resources = $3 WHERE id = $1")
            .bind(id)
            .bind(description)
            .bind(resources)
            .execute(&self.pool)
            .await?;

        self.get(id).await
    }

    pub async fn delete(&self, id: i32) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM ap_classes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("AP class {} not found", id)));
        }
        tracing::info!("Deleted AP class {}", id);
        Ok(())
    }
}

/// `%fragment%` with LIKE metacharacters escaped
fn like_pattern(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len() + 2);
    escaped.push('%');
    for ch in fragment.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

async fn teacher_exists(conn: &mut PgConnection, email: &str) -> ServiceResult<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(&mut *conn)
        .await?;
    Ok(exists)
}

async fn check_prerequisites(conn: &mut PgConnection, ids: &[i32]) -> ServiceResult<()> {
    if ids.is_empty() {
        return Ok(());
    }

    let found: Vec<i32> = sqlx::query_scalar("SELECT id FROM prerequisites WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(&mut *conn)
        .await?;

    match ids.iter().find(|id| !found.contains(*id)) {
        Some(missing) => Err(ServiceError::UnknownReference(format!("Prerequisite {} not found", missing))),
        None => Ok(()),
    }
}

pub(crate) async fn link(
    conn: &mut PgConnection,
    ap_class_id: i32,
    grade_level_ids: &[i32],
    prerequisite_ids: &[i32],
) -> ServiceResult<()> {
    sqlx::query(
        "INSERT INTO ap_class_grade_levels (ap_class_id, grade_level_id)
         SELECT $1, UNNEST($2::int[])
         ON CONFLICT DO NOTHING",
    )
    .bind(ap_class_id)
    .bind(grade_level_ids)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        "INSERT INTO ap_class_prerequisites (ap_class_id, prerequisite_id)
         SELECT $1, UNNEST($2::int[])
         ON CONFLICT DO NOTHING",
    )
    .bind(ap_class_id)
    .bind(prerequisite_ids)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
