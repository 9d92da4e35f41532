use std::sync::Arc;

use anyhow::Context;
use ap_course_api::{
    app, config,
    database::DatabaseManager,
    recommend::RecommendationClient,
    AppState,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")))
        .init();

    let config = config::config();
    tracing::info!("Starting AP Course API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set outside development");
    }
    if ap_course_api::is_development!() && std::env::var("JWT_SECRET").is_err() {
        tracing::warn!("Using the built-in development JWT secret; set JWT_SECRET for shared deployments");
    }

    let pool = DatabaseManager::connect(&config.database)?;
    if config.database.run_migrations {
        // The server still starts without a database; /health reports it.
        if let Err(e) = DatabaseManager::migrate(&pool).await {
            tracing::warn!("Skipping migrations, database not ready: {}", e);
        }
    }

    let recommender = RecommendationClient::new(&config.recommender)?;
    tracing::info!("Recommendation service at {}", config.recommender.base_url);

    let app = app(AppState::new(pool, Arc::new(recommender)));

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("AP Course API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
