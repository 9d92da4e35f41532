//! Client for the separately hosted recommendation service.
//!
//! The service exposes `GET /recommend` and answers with a JSON array of AP
//! class names ranked for the most recently saved student profile.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::config::RecommenderConfig;

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("Recommendation service unreachable: {0}")]
    Transport(String),

    #[error("Recommendation service error: {status}{}", detail_suffix(.detail))]
    Status { status: u16, detail: Option<String> },

    #[error("Recommendation service returned an unexpected body: {0}")]
    Decode(String),

    #[error("Invalid recommendation service URL: {0}")]
    InvalidUrl(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_ref().map(|d| format!(" - {}", d)).unwrap_or_default()
}

#[async_trait]
pub trait Recommender: Send + Sync {
    async fn recommend(&self, top_k: Option<u32>) -> Result<Vec<String>, RecommendError>;
}

#[derive(Debug, Clone)]
pub struct RecommendationClient {
    http: reqwest::Client,
    base_url: String,
    default_top_k: u32,
}

impl RecommendationClient {
    pub fn new(config: &RecommenderConfig) -> Result<Self, RecommendError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RecommendError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: crate::config::normalize_base_url(&config.base_url),
            default_top_k: config.top_k,
        })
    }

    pub fn endpoint(&self, top_k: u32) -> Result<url::Url, RecommendError> {
        let mut url = url::Url::parse(&format!("{}/recommend", self.base_url))
            .map_err(|e| RecommendError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.query_pairs_mut().append_pair("top_k", &top_k.to_string());
        Ok(url)
    }
}

/// Pull the most useful message out of an error body: FastAPI-style `detail`,
/// otherwise the raw text.
fn error_detail(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => match map.get("detail") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => Some(body.to_string()),
        },
        _ => Some(body.to_string()),
    }
}

#[async_trait]
impl Recommender for RecommendationClient {
    async fn recommend(&self, top_k: Option<u32>) -> Result<Vec<String>, RecommendError> {
        let url = self.endpoint(top_k.unwrap_or(self.default_top_k))?;
        tracing::debug!("Fetching recommendations from {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| RecommendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RecommendError::Status {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }

        let names = response
            .json::<Vec<String>>()
            .await
            .map_err(|e| RecommendError::Decode(e.to_string()))?;

        tracing::debug!("Received {} recommendations", names.len());
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
    use std::collections::HashMap;

    async fn spawn_stub(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    fn client_for(base_url: String) -> RecommendationClient {
        RecommendationClient::new(&RecommenderConfig {
            base_url,
            timeout_secs: 5,
            top_k: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn returns_class_names_and_forwards_top_k() {
        let app = Router::new().route(
            "/recommend",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                let k: usize = params.get("top_k").and_then(|v| v.parse().ok()).unwrap_or(0);
                let all = vec!["AP Calculus AB", "AP Calculus BC", "AP Physics 1"];
                Json(all.into_iter().take(k).map(String::from).collect::<Vec<_>>())
            }),
        );
        let client = client_for(spawn_stub(app).await);

        let names = client.recommend(Some(2)).await.unwrap();
        assert_eq!(names, vec!["AP Calculus AB", "AP Calculus BC"]);

        let names = client.recommend(None).await.unwrap();
        assert_eq!(names.len(), 3);
    }

    #[tokio::test]
    async fn surfaces_service_detail_on_error_status() {
        let app = Router::new().route(
            "/recommend",
            get(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "detail": "no offered classes" })),
                )
            }),
        );
        let client = client_for(spawn_stub(app).await);

        let err = client.recommend(None).await.unwrap_err();
        match &err {
            RecommendError::Status { status, detail } => {
                assert_eq!(*status, 500);
                assert_eq!(detail.as_deref(), Some("no offered classes"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.to_string(), "Recommendation service error: 500 - no offered classes");
    }

    #[tokio::test]
    async fn rejects_non_list_bodies() {
        let app = Router::new().route("/recommend", get(|| async { Json(serde_json::json!({ "classes": [] })) }));
        let client = client_for(spawn_stub(app).await);

        assert!(matches!(client.recommend(None).await, Err(RecommendError::Decode(_))));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        let port = portpicker::pick_unused_port().unwrap();
        let client = client_for(format!("http://127.0.0.1:{}", port));

        assert!(matches!(client.recommend(None).await, Err(RecommendError::Transport(_))));
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = client_for("http://recs.local:8000//".to_string());
        assert_eq!(client.endpoint(3).unwrap().as_str(), "http://recs.local:8000/recommend?top_k=3");
    }

    #[test]
    fn error_detail_prefers_detail_field() {
        assert_eq!(error_detail(r#"{"detail":"boom"}"#).as_deref(), Some("boom"));
        assert_eq!(error_detail("plain failure").as_deref(), Some("plain failure"));
        assert_eq!(error_detail("   "), None);
    }
}
