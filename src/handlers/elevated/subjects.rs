// handlers/elevated/subjects.rs - /api/admin/subjects

use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, Path, State},
    Json,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::Subject;
use crate::middleware::{ApiResponse, ApiResult, Deleted};
use crate::services::SubjectService;
use crate::validation::FieldErrors;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SubjectRequest {
    pub name: String,
}

impl SubjectRequest {
    fn validated_name(&self) -> Result<String, crate::error::ApiError> {
        let mut errors = FieldErrors::new();
        let name = errors.required("name", &self.name, "Subject name is required");
        errors.into_result("Invalid subject")?;
        Ok(name)
    }
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<SubjectRequest>, JsonRejection>,
) -> ApiResult<Subject> {
    let Json(req) = payload?;
    let name = req.validated_name()?;
    let subject = SubjectService::new(state.pool).create(&name).await?;
    Ok(ApiResponse::created(subject))
}

pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<SubjectRequest>, JsonRejection>,
) -> ApiResult<Subject> {
    let Path(id) = path?;
    let Json(req) = payload?;
    let name = req.validated_name()?;
    let subject = SubjectService::new(state.pool).update(id, &name).await?;
    Ok(ApiResponse::success(subject))
}

pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<Deleted<i32>> {
    let Path(id) = path?;
    SubjectService::new(state.pool).delete(id).await?;
    Ok(ApiResponse::deleted(id))
}
