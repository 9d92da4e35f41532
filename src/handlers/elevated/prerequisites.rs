// handlers/elevated/prerequisites.rs - /api/admin/prerequisites

use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, Path, State},
    Json,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::PreRequisite;
use crate::middleware::{ApiResponse, ApiResult, Deleted};
use crate::services::{NewPreRequisite, PreRequisiteService, UpdatePreRequisite};
use crate::validation::FieldErrors;

/// Create names the subject; update points at it by id.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreRequisiteRequest {
    pub name: String,
    pub subject: Option<String>,
    pub subject_id: Option<i32>,
    pub grade_levels: Vec<i32>,
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<PreRequisiteRequest>, JsonRejection>,
) -> ApiResult<PreRequisite> {
    let Json(req) = payload?;

    let mut errors = FieldErrors::new();
    let name = errors.required("name", &req.name, "Prerequisite name is required");
    let subject = errors.required("subject", req.subject.as_deref().unwrap_or_default(), "Subject is required");
    let grade_levels = errors.grade_levels("gradeLevels", &req.grade_levels);
    errors.into_result("Invalid prerequisite")?;

    let prerequisite = PreRequisiteService::new(state.pool)
        .create(NewPreRequisite {
            name,
            subject,
            grade_levels,
        })
        .await?;
    Ok(ApiResponse::created(prerequisite))
}

/// Replaces name, subject and grade levels
pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<PreRequisiteRequest>, JsonRejection>,
) -> ApiResult<PreRequisite> {
    let Path(id) = path?;
    let Json(req) = payload?;

    let mut errors = FieldErrors::new();
    let name = errors.required("name", &req.name, "Prerequisite name is required");
    if req.subject_id.is_none() {
        errors.add("subjectId", "Subject is required");
    }
    let grade_levels = errors.grade_levels("gradeLevels", &req.grade_levels);
    errors.into_result("Invalid prerequisite")?;

    let prerequisite = PreRequisiteService::new(state.pool)
        .update(
            id,
            UpdatePreRequisite {
                name,
                subject_id: req.subject_id.unwrap_or_default(),
                grade_levels,
            },
        )
        .await?;
    Ok(ApiResponse::success(prerequisite))
}

pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<Deleted<i32>> {
    let Path(id) = path?;
    PreRequisiteService::new(state.pool).delete(id).await?;
    Ok(ApiResponse::deleted(id))
}
