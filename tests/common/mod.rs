#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use ap_course_api::auth::{generate_jwt, hash_password_with_cost, Claims};
use ap_course_api::database::models::Role;
use reqwest::StatusCode;
use sqlx::{postgres::PgPoolOptions, PgPool};

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let recommender_port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_ap-course-api"));
        cmd.env("AP_API_HOST", "127.0.0.1")
            .env("AP_API_PORT", port.to_string())
            // Nothing listens here, so recommendation calls fail fast
            .env("RECOMMENDER_URL", format!("http://127.0.0.1:{}", recommender_port))
            .env("RECOMMENDER_TIMEOUT_SECS", "2")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        if !database_available() {
            cmd.env("DATABASE_CONNECTION_TIMEOUT", "1");
        }

        let child = cmd.spawn().context("failed to spawn server binary")?;
        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(30)).await?;
    Ok(server)
}

/// Database-backed cases only run when DATABASE_URL points at a live server
pub fn database_available() -> bool {
    let _ = dotenvy::dotenv();
    std::env::var("DATABASE_URL").map(|v| !v.is_empty()).unwrap_or(false)
}

/// Bearer token signed with the same secret the spawned server uses
pub fn token_for(id: i32, email: &str, role: Role) -> String {
    let _ = dotenvy::dotenv();
    generate_jwt(&Claims::new(id, email.to_string(), role)).expect("failed to sign test token")
}

pub const ADMIN_EMAIL: &str = "admin@test.local";

/// The server re-reads admin accounts, so with a database the admin row is
/// upserted first. Without one the token is claims-only.
pub async fn admin_token() -> Result<String> {
    if !database_available() {
        return Ok(token_for(0, ADMIN_EMAIL, Role::Admin));
    }

    let pool = test_pool().await?;
    let hashed = hash_password_with_cost("changeme", 4).await?;
    let id: i32 = sqlx::query_scalar(
        "INSERT INTO users (email, password, first_name, last_name, role)
         VALUES ($1, $2, 'Test', 'Admin', 'ADMIN')
         ON CONFLICT (email) DO UPDATE SET role = 'ADMIN'
         RETURNING id",
    )
    .bind(ADMIN_EMAIL)
    .bind(hashed)
    .fetch_one(&pool)
    .await?;
    pool.close().await;

    Ok(token_for(id, ADMIN_EMAIL, Role::Admin))
}

/// Direct connection for setup and assertions; the spawned server has
/// already applied migrations by the time it answers /health.
pub async fn test_pool() -> Result<PgPool> {
    ensure_server().await?;
    let url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
    let pool = PgPoolOptions::new().max_connections(2).connect(&url).await?;
    Ok(pool)
}

/// Suffix that keeps names unique across runs against a shared database
pub fn unique(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{} {}-{}", prefix, std::process::id(), nanos)
}

pub fn unique_email(prefix: &str) -> String {
    unique(prefix).replace(' ', "-") + "@test.local"
}
