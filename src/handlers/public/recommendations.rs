// handlers/public/recommendations.rs - GET /api/recommendations

use axum::extract::{rejection::QueryRejection, Query, State};
use serde::Deserialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Default, Deserialize)]
pub struct RecommendQuery {
    pub top_k: Option<u32>,
}

/// Proxies the external recommender; the answer is a ranked list of class names.
pub async fn recommend(
    State(state): State<AppState>,
    query: Result<Query<RecommendQuery>, QueryRejection>,
) -> ApiResult<Vec<String>> {
    let Query(query) = query?;
    if query.top_k == Some(0) {
        return Err(ApiError::invalid_field("top_k", "top_k must be at least 1"));
    }

    let names = state.recommender.recommend(query.top_k).await?;
    tracing::debug!("Recommender returned {} classes", names.len());
    Ok(ApiResponse::success(names))
}
