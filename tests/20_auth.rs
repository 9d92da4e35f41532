mod common;

use anyhow::Result;
use ap_course_api::database::models::Role;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn whoami_requires_a_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/api/auth/whoami")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(server.url("/api/auth/whoami"))
        .bearer_auth("not-a-jwt")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn teachers_cannot_reach_admin_routes() -> Result<()> {
    let server = common::ensure_server().await?;
    let token = common::token_for(42, "teacher@test.local", Role::Teacher);

    let res = reqwest::Client::new()
        .post(server.url("/api/admin/subjects"))
        .bearer_auth(token)
        .json(&json!({ "name": "History" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn signin_validates_before_looking_up() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = reqwest::Client::new()
        .post(server.url("/auth/signin"))
        .json(&json!({ "email": "" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["field_errors"]["email"], "Email is required");
    assert_eq!(body["field_errors"]["password"], "Password is required");
    Ok(())
}

#[tokio::test]
async fn signup_is_gated_by_the_authorized_list() -> Result<()> {
    if !common::database_available() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let email = common::unique_email("gated");
    let signup = json!({
        "email": email,
        "password": "changeme",
        "confirmPassword": "changeme",
        "firstName": "Gina",
        "lastName": "Gated"
    });

    let res = client.post(server.url("/auth/signup")).json(&signup).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .post(server.url("/api/admin/authorized-users"))
        .bearer_auth(common::admin_token().await?)
        .json(&json!({ "email": email, "role": "TEACHER" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client.post(server.url("/auth/signup")).json(&signup).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["user"]["role"], "TEACHER");
    assert!(body["data"]["user"].get("password").is_none());
    let user_id = body["data"]["user"]["id"].as_i64().unwrap();

    // Second sign-up with the same email conflicts
    let res = client.post(server.url("/auth/signup")).json(&signup).send().await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client
        .post(server.url("/auth/signin"))
        .json(&json!({ "email": email, "password": "wrong-password" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(server.url("/auth/signin"))
        .json(&json!({ "email": email, "password": "changeme" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let me: Value = client
        .get(server.url("/api/auth/whoami"))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(me["data"]["email"], email);

    let res = client
        .delete(server.url(&format!("/api/admin/users/{}", user_id)))
        .bearer_auth(common::admin_token().await?)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}
