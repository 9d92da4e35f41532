use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subject {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GradeLevel {
    pub id: i32,
    pub level: i32,
}

/// Prerequisite with its subject name and eligible grade levels resolved
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PreRequisite {
    pub id: i32,
    pub name: String,
    pub subject_id: i32,
    pub subject_name: String,
    pub grade_levels: Vec<i32>,
}

/// AP class with its subject, grade levels and prerequisites resolved
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ApClass {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub resources: Option<String>,
    pub offered: bool,
    pub subject_id: i32,
    pub subject_name: String,
    pub teacher_email: String,
    pub grade_levels: Vec<i32>,
    pub prerequisite_ids: Vec<i32>,
    pub prerequisite_names: Vec<String>,
}
