use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One submission of the recommendation form
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub id: i32,
    pub interests: Vec<String>,
    pub previous_courses: Vec<String>,
    #[serde(rename = "GPA")]
    pub gpa: f64,
    pub grade_level: Option<i32>,
    pub created_at: DateTime<Utc>,
}
