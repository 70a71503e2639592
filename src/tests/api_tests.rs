use super::{TEST_PASSWORD, create_test_service};
use crate::api::api_routes;
use axum::{
    Router,
    body::{Body, to_bytes},
};
use http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    api_routes(Arc::new(create_test_service()))
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let response = raw(app, method, uri, token, body).await;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn raw(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

/// Registers and logs in, returning the bearer token.
async fn sign_up(app: &Router, email: &str) -> String {
    let (status, _) = send(
        app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": email, "password": TEST_PASSWORD, "name": "Tester" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": email, "password": TEST_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn register_login_and_me() {
    let app = app();
    let token = sign_up(&app, "Someone@NeoSec.io").await;

    let (status, body) = send(&app, Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "someone@neosec.io");
    assert!(body.get("passwordHash").is_none());

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "someone@neosec.io", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());

    let (status, _) = send(&app, Method::GET, "/vpn", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = app();
    sign_up(&app, "dup@neosec.io").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": "DUP@neosec.io", "password": TEST_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn group_creation_needs_leader_account() {
    let app = app();
    sign_up(&app, "admin@neosec.io").await;
    let token = sign_up(&app, "member@neosec.io").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/hierarchy/groups",
        Some(&token),
        Some(json!({ "name": "Red Team" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        &app,
        Method::POST,
        "/hierarchy/subscription/upgrade",
        Some(&token),
        Some(json!({ "tier": "platinum" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        "/hierarchy/subscription/upgrade",
        Some(&token),
        Some(json!({ "tier": "Pro" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["accountType"], "leader");

    let (status, body) = send(
        &app,
        Method::POST,
        "/hierarchy/groups",
        Some(&token),
        Some(json!({ "name": "Red Team", "maxMembers": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["maxMembers"], 3);
}

#[tokio::test]
async fn vpn_download_is_served_as_attachment() {
    let app = app();
    let token = sign_up(&app, "user@neosec.io").await;

    let (status, config) = send(
        &app,
        Method::POST,
        "/vpn",
        Some(&token),
        Some(json!({
            "name": "Office",
            "protocol": "WireGuard",
            "configFileName": "office.conf",
            "configFileContent": "[Interface]\nAddress = 10.0.0.2/32\n"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = config["id"].as_str().unwrap();

    let response = raw(&app, Method::GET, &format!("/vpn/{}/download", id), Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"office.conf\""
    );
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain")
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"[Interface]\nAddress = 10.0.0.2/32\n");

    let (status, toggled) = send(&app, Method::PATCH, &format!("/vpn/{}/toggle", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled["isActive"], true);

    let (status, _) = send(&app, Method::GET, "/vpn/missing/download", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invitation_flow_over_http() {
    let app = app();
    sign_up(&app, "admin@neosec.io").await;
    let leader = sign_up(&app, "lead@neosec.io").await;
    let member = sign_up(&app, "member@neosec.io").await;

    send(
        &app,
        Method::POST,
        "/hierarchy/subscription/upgrade",
        Some(&leader),
        Some(json!({ "tier": "basic" })),
    )
    .await;
    let (_, group) = send(
        &app,
        Method::POST,
        "/hierarchy/groups",
        Some(&leader),
        Some(json!({ "name": "Blue Team", "maxMembers": 1 })),
    )
    .await;
    let group_id = group["id"].as_str().unwrap();

    let (status, invitation) = send(
        &app,
        Method::POST,
        &format!("/hierarchy/groups/{}/invite", group_id),
        Some(&leader),
        Some(json!({ "email": "member@neosec.io" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let invitation_id = invitation["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/hierarchy/invitations/{}/accept", invitation_id),
        Some(&member),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/hierarchy/invitations/{}/accept", invitation_id),
        Some(&member),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/hierarchy/groups/{}/invite", group_id),
        Some(&leader),
        Some(json!({ "email": "late@neosec.io" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn login_history_records_forwarded_address() {
    let app = app();
    let token = sign_up(&app, "user@neosec.io").await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
        .header(header::USER_AGENT, "neosec-cli/1.0")
        .body(Body::from(
            json!({ "email": "user@neosec.io", "password": "wrong-password" }).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, Method::GET, "/login-history", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 2);
    let failed: Vec<_> = records.iter().filter(|r| r["success"] == false).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["ipAddress"], "203.0.113.7");
    assert_eq!(failed[0]["userAgent"], "neosec-cli/1.0");
    assert_eq!(failed[0]["failureReason"], "Invalid password");

    let (status, _) = send(
        &app,
        Method::GET,
        "/login-history/security-events?days=3",
        Some(&token),
        None,
    )
    .await;
    // The first account is the admin.
    assert_eq!(status, StatusCode::OK);
}
