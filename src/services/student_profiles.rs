use sqlx::PgPool;

use super::ServiceResult;
use crate::database::models::StudentProfile;

const PROFILE_COLUMNS: &str = "id, interests, previous_courses, gpa, grade_level, created_at";

#[derive(Debug, Clone)]
pub struct NewStudentProfile {
    pub interests: Vec<String>,
    pub previous_courses: Vec<String>,
    pub gpa: f64,
    pub grade_level: Option<i32>,
}

pub struct StudentProfileService {
    pool: PgPool,
}

impl StudentProfileService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewStudentProfile) -> ServiceResult<StudentProfile> {
        let profile = sqlx::query_as::<_, StudentProfile>(&format!(
            "INSERT INTO student_profiles (interests, previous_courses, gpa, grade_level)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            PROFILE_COLUMNS
        ))
        .bind(&new.interests)
        .bind(&new.previous_courses)
        .bind(new.gpa)
        .bind(new.grade_level)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Saved student profile {}", profile.id);
        Ok(profile)
    }

    /// Oldest submission first
    pub async fn list(&self) -> ServiceResult<Vec<StudentProfile>> {
        let profiles = sqlx::query_as::<_, StudentProfile>(&format!(
            "SELECT {} FROM student_profiles ORDER BY created_at ASC, id ASC",
            PROFILE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(profiles)
    }
}
