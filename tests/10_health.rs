mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::ensure_server().await?;
    let res = reqwest::get(server.url("/health")).await?;

    // OK with a database, SERVICE_UNAVAILABLE without one
    let status = res.status();
    assert!(
        status == StatusCode::OK || status == StatusCode::SERVICE_UNAVAILABLE,
        "unexpected status: {}",
        status
    );

    let body: serde_json::Value = res.json().await?;
    if status == StatusCode::OK {
        assert_eq!(body["data"]["status"], "ok");
    } else {
        assert_eq!(body["data"]["status"], "degraded");
    }
    Ok(())
}

#[tokio::test]
async fn root_lists_endpoints() -> Result<()> {
    let server = common::ensure_server().await?;
    let body: serde_json::Value = reqwest::get(server.url("/")).await?.json().await?;

    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "AP Course API");
    assert!(body["data"]["endpoints"]["student"].is_string());
    Ok(())
}

#[tokio::test]
async fn unreachable_recommender_is_a_bad_gateway() -> Result<()> {
    let server = common::ensure_server().await?;
    let res = reqwest::get(server.url("/api/recommendations?top_k=3")).await?;

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = res.json().await?;
    assert_eq!(body["code"], "BAD_GATEWAY");
    Ok(())
}
