// handlers/elevated/classes.rs - /api/admin/classes

use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, Path, State},
    Json,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::ApClass;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Deleted};
use crate::services::{ApClassService, NewApClass, UpdateApClass};
use crate::validation::FieldErrors;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApClassRequest {
    pub name: String,
    pub description: String,
    pub resources: Option<String>,
    pub offered: Option<bool>,
    /// Subject name, used by create
    pub subject: Option<String>,
    /// Subject id, used by update
    pub subject_id: Option<i32>,
    pub teacher_email: String,
    pub grade_levels: Vec<i32>,
    pub prerequisite_ids: Vec<i32>,
}

/// Fields shared by create and update, after validation
struct ClassFields {
    name: String,
    description: String,
    resources: Option<String>,
    offered: bool,
    teacher_email: String,
    grade_levels: Vec<i32>,
    prerequisite_ids: Vec<i32>,
}

fn common_fields(req: &ApClassRequest, errors: &mut FieldErrors) -> ClassFields {
    let name = errors.required("name", &req.name, "Class name is required");
    let description = errors.required("description", &req.description, "Description is required");
    if req.offered.is_none() {
        errors.add("offered", "Offered status is required");
    }
    let teacher_email = errors.email("teacherEmail", &req.teacher_email);
    let grade_levels = errors.grade_levels("gradeLevels", &req.grade_levels);

    let mut prerequisite_ids = req.prerequisite_ids.clone();
    prerequisite_ids.sort_unstable();
    prerequisite_ids.dedup();

    ClassFields {
        name,
        description,
        resources: req
            .resources
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string),
        offered: req.offered.unwrap_or_default(),
        teacher_email,
        grade_levels,
        prerequisite_ids,
    }
}

fn validate_create(req: &ApClassRequest) -> Result<NewApClass, ApiError> {
    let mut errors = FieldErrors::new();
    let fields = common_fields(req, &mut errors);
    let subject = errors.required("subject", req.subject.as_deref().unwrap_or_default(), "Subject type is required");
    errors.into_result("Invalid AP class")?;

    Ok(NewApClass {
        name: fields.name,
        description: fields.description,
        resources: fields.resources,
        offered: fields.offered,
        subject,
        teacher_email: fields.teacher_email,
        grade_levels: fields.grade_levels,
        prerequisite_ids: fields.prerequisite_ids,
    })
}

fn validate_update(req: &ApClassRequest) -> Result<UpdateApClass, ApiError> {
    let mut errors = FieldErrors::new();
    let fields = common_fields(req, &mut errors);
    if req.subject_id.is_none() {
        errors.add("subjectId", "Subject type is required");
    }
    errors.into_result("Invalid AP class")?;

    Ok(UpdateApClass {
        name: fields.name,
        description: fields.description,
        resources: fields.resources,
        offered: fields.offered,
        subject_id: req.subject_id.unwrap_or_default(),
        teacher_email: fields.teacher_email,
        grade_levels: fields.grade_levels,
        prerequisite_ids: fields.prerequisite_ids,
    })
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<ApClassRequest>, JsonRejection>,
) -> ApiResult<ApClass> {
    let Json(req) = payload?;
    let new_class = validate_create(&req)?;
    let class = ApClassService::new(state.pool).create(new_class).await?;
    Ok(ApiResponse::created(class))
}

/// Full replacement, including both link sets
pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<ApClassRequest>, JsonRejection>,
) -> ApiResult<ApClass> {
    let Path(id) = path?;
    let Json(req) = payload?;
    let changes = validate_update(&req)?;
    let class = ApClassService::new(state.pool).update(id, changes).await?;
    Ok(ApiResponse::success(class))
}

pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<Deleted<i32>> {
    let Path(id) = path?;
    ApClassService::new(state.pool).delete(id).await?;
    Ok(ApiResponse::deleted(id))
}
