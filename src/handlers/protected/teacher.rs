// handlers/protected/teacher.rs - a teacher's own classes

use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, Path, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::ApClass;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{ApClassFilter, ApClassService};
use crate::validation::FieldErrors;

/// GET /api/teacher/classes - classes taught by the caller
pub async fn my_classes(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Vec<ApClass>> {
    let filter = ApClassFilter {
        teacher_email: Some(auth_user.email),
        ..Default::default()
    };
    let classes = ApClassService::new(state.pool).list(&filter).await?;
    Ok(ApiResponse::success(classes))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TeacherClassUpdate {
    pub description: String,
    pub resources: Option<String>,
}

/// PATCH /api/teacher/classes/:id - description and resources only
pub async fn update_class(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<TeacherClassUpdate>, JsonRejection>,
) -> ApiResult<ApClass> {
    let Path(id) = path?;
    let Json(req) = payload?;

    let mut errors = FieldErrors::new();
    let description = errors.required("description", &req.description, "Description is required");
    errors.into_result("Invalid class update")?;

    let resources = req.resources.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());

    let class = ApClassService::new(state.pool)
        .update_teacher_fields(id, &description, resources.as_deref(), &auth_user.email, auth_user.role)
        .await?;
    Ok(ApiResponse::success(class))
}
