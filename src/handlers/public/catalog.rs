// handlers/public/catalog.rs - read-only catalog browsing

use axum::extract::{
    rejection::{PathRejection, QueryRejection},
    Path, Query, State,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::{ApClass, GradeLevel, PreRequisite, Subject};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{ApClassFilter, ApClassService, GradeLevelService, PreRequisiteService, SubjectService};

#[derive(Debug, Default, Deserialize)]
pub struct ClassQuery {
    /// Case-insensitive substring of the class name
    pub q: Option<String>,
    pub offered: Option<bool>,
}

/// GET /api/classes?q=&offered=
pub async fn list_classes(
    State(state): State<AppState>,
    query: Result<Query<ClassQuery>, QueryRejection>,
) -> ApiResult<Vec<ApClass>> {
    let Query(query) = query?;
    let filter = ApClassFilter {
        name_contains: query.q,
        offered: query.offered,
        teacher_email: None,
    };
    let classes = ApClassService::new(state.pool).list(&filter).await?;
    Ok(ApiResponse::success(classes))
}

/// GET /api/classes/:id
pub async fn get_class(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<ApClass> {
    let Path(id) = path?;
    let class = ApClassService::new(state.pool).get(id).await?;
    Ok(ApiResponse::success(class))
}

pub async fn list_subjects(State(state): State<AppState>) -> ApiResult<Vec<Subject>> {
    Ok(ApiResponse::success(SubjectService::new(state.pool).list().await?))
}

pub async fn list_grade_levels(State(state): State<AppState>) -> ApiResult<Vec<GradeLevel>> {
    Ok(ApiResponse::success(GradeLevelService::new(state.pool).list().await?))
}

pub async fn list_prerequisites(State(state): State<AppState>) -> ApiResult<Vec<PreRequisite>> {
    Ok(ApiResponse::success(PreRequisiteService::new(state.pool).list().await?))
}
