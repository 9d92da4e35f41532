// handlers/public/student.rs - POST/GET /api/student
//
// External contract: bodies are the bare record (or list), not the usual
// success envelope, and failures carry the first problem in `error`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::app::AppState;
use crate::database::models::StudentProfile;
use crate::error::ApiError;
use crate::services::{NewStudentProfile, StudentProfileService};
use crate::validation::{self, FieldErrors};

/// Loosely typed so each field can be checked with its own message
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentProfileRequest {
    pub interests: Value,
    pub previous_courses: Value,
    #[serde(rename = "GPA")]
    pub gpa: Value,
    pub grade_level: Value,
}

/// POST /api/student - save a profile, 201 with the stored record
pub async fn create_profile(
    State(state): State<AppState>,
    payload: Result<Json<StudentProfileRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StudentProfile>), ApiError> {
    let Json(req) = payload?;
    let new_profile = parse_profile(req)?;

    let profile = StudentProfileService::new(state.pool).create(new_profile).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /api/student - every profile, oldest first
pub async fn list_profiles(State(state): State<AppState>) -> Result<Json<Vec<StudentProfile>>, ApiError> {
    let profiles = StudentProfileService::new(state.pool).list().await?;
    Ok(Json(profiles))
}

fn parse_profile(req: StudentProfileRequest) -> Result<NewStudentProfile, ApiError> {
    let interests = match string_list(&req.interests) {
        Some(list) if !list.is_empty() => list,
        _ => return Err(ApiError::invalid_field("interests", "Interests required")),
    };

    let previous_courses = match &req.previous_courses {
        Value::Null => Vec::new(),
        other => string_list(other).ok_or_else(|| {
            ApiError::invalid_field("previousCourses", "Previous courses must be a list of strings")
        })?,
    };

    let gpa = req
        .gpa
        .as_f64()
        .ok_or_else(|| ApiError::invalid_field("GPA", "GPA must be a number"))?;

    let grade_level = match &req.grade_level {
        Value::Null => None,
        value => {
            let level = value
                .as_i64()
                .and_then(|l| i32::try_from(l).ok())
                .ok_or_else(|| ApiError::invalid_field("gradeLevel", "Grade level must be a whole number"))?;
            Some(level)
        }
    };

    let mut errors = FieldErrors::new();
    errors.gpa("GPA", gpa);
    if let Some(level) = grade_level {
        if !validation::is_valid_grade_level(level) {
            errors.add("gradeLevel", "Invalid grade level");
        }
    }
    if let Err(err) = errors.into_result("Invalid student profile") {
        return Err(first_field_error(err));
    }

    Ok(NewStudentProfile {
        interests,
        previous_courses,
        gpa,
        grade_level,
    })
}

/// Array of strings, each split on commas, trimmed, blanks dropped.
/// `None` when the value is not an array of strings.
fn string_list(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let text = item.as_str()?;
        out.extend(text.split(',').map(str::to_string));
    }
    Some(validation::clean_list(out))
}

/// Promote the first field message to the top-level `error`
fn first_field_error(err: ApiError) -> ApiError {
    match err {
        ApiError::ValidationError {
            field_errors: Some(fields),
            message,
        } => {
            let message = fields.values().next().cloned().unwrap_or(message);
            ApiError::ValidationError {
                message,
                field_errors: Some(fields),
            }
        }
        other => other,
    }
}
