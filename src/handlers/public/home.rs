// handlers/public/home.rs - GET / and GET /health

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::DatabaseManager;

/// GET / - service name, version and endpoint map
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "AP Course API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "AP class catalog, student profiles and recommendations",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/auth/signup, /auth/signin (public - token acquisition)",
                "catalog": "/api/classes[/:id], /api/subjects, /api/grade-levels, /api/prerequisites (public)",
                "student": "/api/student (public)",
                "recommendations": "/api/recommendations?top_k=N (public)",
                "account": "/api/auth/whoami, /api/auth/password (protected)",
                "teacher": "/api/teacher/classes[/:id] (protected)",
                "admin": "/api/admin/{subjects,prerequisites,classes,users,authorized-users} (admin only)",
            }
        }
    }))
}

/// GET /health - 200 when the database answers, 503 otherwise
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                    }
                })),
            )
        }
    }
}
