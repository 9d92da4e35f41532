//! Idempotent loading of a static settings file into the database.
//!
//! The file (JSON or YAML, picked by extension) lists default accounts, grade
//! levels, subjects, prerequisites and AP classes. Rows that already exist are
//! left untouched, and entries that point at an unknown subject or teacher are
//! skipped with a warning rather than failing the run.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use thiserror::Error;
use tracing::{info, warn};

use crate::auth::{self, AuthError};
use crate::database::models::Role;
use crate::database::DatabaseError;
use crate::services::ServiceError;
use crate::validation;

pub const DEFAULT_PASSWORD: &str = "changeme";

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON seed file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unsupported seed file '{0}', expected .json, .yaml or .yml")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl From<sqlx::Error> for SeedError {
    fn from(err: sqlx::Error) -> Self {
        SeedError::Database(err.into())
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeedConfig {
    pub default_accounts: Vec<SeedAccount>,
    pub grade_levels: Vec<i32>,
    pub subjects: Vec<String>,
    #[serde(alias = "prerequesites")]
    pub prerequisites: Vec<SeedPrerequisite>,
    pub ap_classes: Vec<SeedApClass>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedAccount {
    pub email: String,
    pub password: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedPrerequisite {
    pub name: String,
    pub subject: String,
    #[serde(default)]
    pub grade_levels: Vec<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedApClass {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub resources: Option<String>,
    #[serde(default)]
    pub offered: bool,
    pub subject: String,
    pub teacher_email: String,
    #[serde(default)]
    pub grade_levels: Vec<i32>,
    /// Prerequisite names
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

impl SeedConfig {
    pub fn from_path(path: &Path) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: path.display().to_string(),
            source,
        })?;

        match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("json") => Self::from_json_str(&raw),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&raw),
            _ => Err(SeedError::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, SeedError> {
        Ok(serde_yaml::from_str(raw)?)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedCount {
    pub created: u32,
    pub skipped: u32,
}

impl SeedCount {
    fn record(&mut self, created: bool) {
        if created {
            self.created += 1;
        } else {
            self.skipped += 1;
        }
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct SeedReport {
    pub accounts: SeedCount,
    pub grade_levels: SeedCount,
    pub subjects: SeedCount,
    pub prerequisites: SeedCount,
    pub ap_classes: SeedCount,
}

/// Apply `config` in one transaction. Safe to run repeatedly.
pub async fn run_seed(pool: &PgPool, config: &SeedConfig) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();
    let mut tx = pool.begin().await?;

    info!("Seeding the database");

    for account in &config.default_accounts {
        report.accounts.record(seed_account(&mut *tx, account).await?);
    }

    for &level in &config.grade_levels {
        if !validation::is_valid_grade_level(level) {
            warn!("Skipping grade level {}: must be between 9 and 12", level);
            report.grade_levels.skipped += 1;
            continue;
        }
        let created: Option<i32> = sqlx::query_scalar(
            "INSERT INTO grade_levels (level) VALUES ($1) ON CONFLICT (level) DO NOTHING RETURNING id",
        )
        .bind(level)
        .fetch_optional(&mut *tx)
        .await?;
        report.grade_levels.record(created.is_some());
    }

    for name in &config.subjects {
        let name = name.trim();
        if name.is_empty() {
            report.subjects.skipped += 1;
            continue;
        }
        let created: Option<i32> = sqlx::query_scalar(
            "INSERT INTO subjects (name) VALUES ($1) ON CONFLICT (name) DO NOTHING RETURNING id",
        )
        .bind(name)
        .fetch_optional(&mut *tx)
        .await?;
        if created.is_some() {
            info!("Created subject: {}", name);
        }
        report.subjects.record(created.is_some());
    }

    for prerequisite in &config.prerequisites {
        report.prerequisites.record(seed_prerequisite(&mut *tx, prerequisite).await?);
    }

    for class in &config.ap_classes {
        report.ap_classes.record(seed_ap_class(&mut *tx, class).await?);
    }

    tx.commit().await?;
    info!(
        "Seed complete: {} accounts, {} subjects, {} prerequisites, {} AP classes created",
        report.accounts.created, report.subjects.created, report.prerequisites.created, report.ap_classes.created
    );
    Ok(report)
}

async fn seed_account(conn: &mut PgConnection, account: &SeedAccount) -> Result<bool, SeedError> {
    let email = account.email.trim();
    let role = account.role.unwrap_or_default();
    let hashed = auth::hash_password(account.password.as_deref().unwrap_or(DEFAULT_PASSWORD)).await?;

    let created: Option<i32> = sqlx::query_scalar(
        "INSERT INTO users (email, password, first_name, last_name, role)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (email) DO NOTHING
         RETURNING id",
    )
    .bind(email)
    .bind(&hashed)
    .bind(&account.first_name)
    .bind(&account.last_name)
    .bind(role)
    .fetch_optional(&mut *conn)
    .await?;

    sqlx::query("INSERT INTO authorized_users (email, role) VALUES ($1, $2) ON CONFLICT (email) DO NOTHING")
        .bind(email)
        .bind(role)
        .execute(&mut *conn)
        .await?;

    if created.is_some() {
        info!("Created user: {} with role: {}", email, role);
    }
    Ok(created.is_some())
}

async fn seed_prerequisite(conn: &mut PgConnection, prerequisite: &SeedPrerequisite) -> Result<bool, SeedError> {
    let Some(subject_id) = find_subject_id(conn, &prerequisite.subject).await? else {
        warn!(
            "Skipping prerequisite \"{}\": subject \"{}\" not found",
            prerequisite.name, prerequisite.subject
        );
        return Ok(false);
    };

    let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM prerequisites WHERE name = $1 AND subject_id = $2")
        .bind(&prerequisite.name)
        .bind(subject_id)
        .fetch_optional(&mut *conn)
        .await?;
    if existing.is_some() {
        return Ok(false);
    }

    let grade_level_ids = resolve_grade_levels(conn, &prerequisite.grade_levels).await?;
    let id: i32 = sqlx::query_scalar("INSERT INTO prerequisites (name, subject_id) VALUES ($1, $2) RETURNING id")
        .bind(&prerequisite.name)
        .bind(subject_id)
        .fetch_one(&mut *conn)
        .await?;
    crate::services::prerequisites::link_grade_levels(conn, id, &grade_level_ids).await?;

    info!("Created prerequisite: {} for subject: {}", prerequisite.name, prerequisite.subject);
    Ok(true)
}

async fn seed_ap_class(conn: &mut PgConnection, class: &SeedApClass) -> Result<bool, SeedError> {
    let subject_id = find_subject_id(conn, &class.subject).await?;
    let teacher_exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
        .bind(&class.teacher_email)
        .fetch_one(&mut *conn)
        .await?;

    let subject_id = match subject_id {
        Some(id) if teacher_exists => id,
        _ => {
            warn!("Skipping AP class \"{}\": subject or teacher not found", class.name);
            return Ok(false);
        }
    };

    let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM ap_classes WHERE name = $1")
        .bind(&class.name)
        .fetch_optional(&mut *conn)
        .await?;
    if existing.is_some() {
        return Ok(false);
    }

    let grade_level_ids = resolve_grade_levels(conn, &class.grade_levels).await?;
    let prerequisite_ids = resolve_prerequisites(conn, subject_id, &class.prerequisites).await?;

    let id: i32 = sqlx::query_scalar(
        "INSERT INTO ap_classes (name, description, resources, offered, subject_id, teacher_email)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id",
    )
    .bind(&class.name)
    .bind(&class.description)
    .bind(&class.resources)
    .bind(class.offered)
    .bind(subject_id)
    .bind(&class.teacher_email)
    .fetch_one(&mut *conn)
    .await?;
    crate::services::ap_classes::link(conn, id, &grade_level_ids, &prerequisite_ids).await?;

    info!("Created AP class: {}", class.name);
    Ok(true)
}

async fn find_subject_id(conn: &mut PgConnection, name: &str) -> Result<Option<i32>, SeedError> {
    let id = sqlx::query_scalar("SELECT id FROM subjects WHERE name = $1")
        .bind(name.trim())
        .fetch_optional(&mut *conn)
        .await?;
    Ok(id)
}

/// Ids of the levels that exist; the rest are reported and dropped
async fn resolve_grade_levels(conn: &mut PgConnection, levels: &[i32]) -> Result<Vec<i32>, SeedError> {
    let rows: Vec<(i32, i32)> = sqlx::query_as("SELECT id, level FROM grade_levels WHERE level = ANY($1)")
        .bind(levels)
        .fetch_all(&mut *conn)
        .await?;

    for level in levels {
        if !rows.iter().any(|(_, found)| found == level) {
            warn!("Grade level {} not found, skipping", level);
        }
    }
    Ok(rows.into_iter().map(|(id, _)| id).collect())
}

/// Only prerequisites of the class's own subject are linked
async fn resolve_prerequisites(
    conn: &mut PgConnection,
    subject_id: i32,
    names: &[String],
) -> Result<Vec<i32>, SeedError> {
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let rows: Vec<(i32, String)> =
        sqlx::query_as("SELECT id, name FROM prerequisites WHERE subject_id = $1 AND name = ANY($2)")
            .bind(subject_id)
            .bind(names)
            .fetch_all(&mut *conn)
            .await?;

    for name in names {
        if !rows.iter().any(|(_, found)| found == name) {
            warn!("Prerequisite \"{}\" not found for this subject, skipping", name);
        }
    }
    Ok(rows.into_iter().map(|(id, _)| id).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_settings_with_defaults() {
        let config = SeedConfig::from_json_str(
            r#"{
                "defaultAccounts": [
                    {"email": "admin@foo.com", "password": "changeme", "role": "ADMIN"},
                    {"email": "john@foo.com", "firstName": "John", "lastName": "Foo"}
                ],
                "gradeLevels": [9, 10, 11, 12],
                "subjects": ["Math", "Science"],
                "prerequesites": [
                    {"name": "Algebra II", "subject": "Math", "gradeLevels": [10, 11]}
                ],
                "apClasses": [
                    {
                        "name": "AP Calculus AB",
                        "description": "Limits and derivatives",
                        "offered": true,
                        "subject": "Math",
                        "teacherEmail": "john@foo.com",
                        "gradeLevels": [11, 12],
                        "prerequisites": ["Algebra II"]
                    }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.default_accounts.len(), 2);
        assert_eq!(config.default_accounts[0].role, Some(Role::Admin));
        assert_eq!(config.default_accounts[1].role, None);
        assert_eq!(config.default_accounts[1].password, None);
        assert_eq!(config.prerequisites[0].grade_levels, vec![10, 11]);
        assert_eq!(config.ap_classes[0].prerequisites, vec!["Algebra II"]);
        assert_eq!(config.ap_classes[0].resources, None);
    }

    #[test]
    fn parses_yaml_settings() {
        let config = SeedConfig::from_yaml_str(
            "subjects:\n  - Art\nprerequisites:\n  - name: Drawing I\n    subject: Art\napClasses: []\n",
        )
        .unwrap();

        assert!(config.default_accounts.is_empty());
        assert_eq!(config.subjects, vec!["Art"]);
        assert_eq!(config.prerequisites[0].name, "Drawing I");
        assert!(config.prerequisites[0].grade_levels.is_empty());
    }

    #[test]
    fn rejects_unknown_role() {
        let err = SeedConfig::from_json_str(r#"{"defaultAccounts": [{"email": "a@b.com", "role": "PRINCIPAL"}]}"#);
        assert!(matches!(err, Err(SeedError::Json(_))));
    }

    #[test]
    fn rejects_unknown_extension() {
        let path = std::env::temp_dir().join(format!("ap-seed-{}.toml", std::process::id()));
        std::fs::write(&path, "subjects = []").unwrap();
        let result = SeedConfig::from_path(&path);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(SeedError::UnsupportedFormat(_))));
    }

    #[test]
    fn bundled_development_settings_parse() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/settings.development.json");
        let config = SeedConfig::from_path(&path).unwrap();
        assert_eq!(config.grade_levels, vec![9, 10, 11, 12]);
        assert!(config.ap_classes.iter().all(|c| config.subjects.contains(&c.subject)));
        assert!(config.default_accounts.iter().any(|a| a.role == Some(Role::Admin)));
    }

    #[test]
    fn counts_created_and_skipped() {
        let mut count = SeedCount::default();
        count.record(true);
        count.record(false);
        count.record(false);
        assert_eq!(count, SeedCount { created: 1, skipped: 2 });
    }
}
