/// Router-level tests for the authentication gate and request validation
///
/// The gate must fail closed: token validity is checked before role,
/// and role before any business logic. These tests run without a live
/// database — every asserted path is rejected before its first query.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::TestContext;
use serde_json::json;
use taskhub_shared::models::user::Role;

async fn body_json(response: axum::http::Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn protected_route_without_token_is_401() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("GET")
        .uri("/api/tasks")
        .body(Body::empty())
        .unwrap();

    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_route_with_non_bearer_header_is_401() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("GET")
        .uri("/api/tasks")
        .header("authorization", "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();

    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn forged_token_is_401() {
    let ctx = TestContext::new();

    let request = common::authed_request("GET", "/api/tasks", &common::forged_token(), None);

    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_401() {
    let ctx = TestContext::new();

    let request = common::authed_request("GET", "/api/tasks", &common::expired_token(), None);

    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unauthorized_bodies_are_identical() {
    // A probing caller cannot distinguish missing, forged, and expired
    // credentials from the response alone
    let ctx = TestContext::new();

    let missing = ctx
        .send(
            Request::builder()
                .method("GET")
                .uri("/api/tasks")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    let forged = ctx
        .send(common::authed_request(
            "GET",
            "/api/tasks",
            &common::forged_token(),
            None,
        ))
        .await;
    let expired = ctx
        .send(common::authed_request(
            "GET",
            "/api/tasks",
            &common::expired_token(),
            None,
        ))
        .await;

    let missing_body = body_json(missing).await;
    let forged_body = body_json(forged).await;
    let expired_body = body_json(expired).await;

    assert_eq!(missing_body, forged_body);
    assert_eq!(forged_body, expired_body);
}

#[tokio::test]
async fn user_role_cannot_delete_users() {
    let ctx = TestContext::new();

    let token = common::token_for_role(Role::User);
    let uri = format!("/api/users/{}", uuid::Uuid::new_v4());
    let request = common::authed_request("DELETE", &uri, &token, None);

    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn manager_role_cannot_delete_users() {
    // Deletion cascades through the whole account, so only admins may
    // trigger it
    let ctx = TestContext::new();

    let token = common::token_for_role(Role::Manager);
    let uri = format!("/api/users/{}", uuid::Uuid::new_v4());
    let request = common::authed_request("DELETE", &uri, &token, None);

    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn user_role_cannot_list_users() {
    let ctx = TestContext::new();

    let token = common::token_for_role(Role::User);
    let request = common::authed_request("GET", "/api/users", &token, None);

    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn user_role_cannot_assign_tasks() {
    let ctx = TestContext::new();

    let token = common::token_for_role(Role::User);
    let uri = format!("/api/tasks/{}/assign", uuid::Uuid::new_v4());
    let request = common::authed_request(
        "PATCH",
        &uri,
        &token,
        Some(json!({ "user_id": uuid::Uuid::new_v4() })),
    );

    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn user_role_cannot_create_teams() {
    let ctx = TestContext::new();

    let token = common::token_for_role(Role::User);
    let request = common::authed_request(
        "POST",
        "/api/teams",
        &token,
        Some(json!({ "name": "backend" })),
    );

    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn register_rejects_invalid_email() {
    let ctx = TestContext::new();

    let request = common::json_request(
        "POST",
        "/api/auth/register",
        json!({
            "username": "alice",
            "email": "not-an-email",
            "password": "SecureP@ss123"
        }),
    );

    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn register_rejects_short_password() {
    let ctx = TestContext::new();

    let request = common::json_request(
        "POST",
        "/api/auth/register",
        json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "short"
        }),
    );

    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn login_rejects_empty_username() {
    let ctx = TestContext::new();

    let request = common::json_request(
        "POST",
        "/api/auth/login",
        json!({
            "username": "",
            "password": "whatever"
        }),
    );

    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn refresh_with_malformed_token_is_401() {
    let ctx = TestContext::new();

    // Wrong shape means the token can't be in the store; rejected before
    // any query runs
    let request = common::json_request(
        "POST",
        "/api/auth/refresh",
        json!({ "refresh_token": "not-a-refresh-token" }),
    );

    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_with_malformed_token_is_200() {
    let ctx = TestContext::new();

    // Logout acknowledges identically whether or not the token exists
    let request = common::json_request(
        "POST",
        "/api/auth/logout",
        json!({ "refresh_token": "not-a-refresh-token" }),
    );

    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "logged_out");
}

#[tokio::test]
async fn health_endpoint_is_public() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    // No database behind the lazy pool, so the check reports degraded
    let body = body_json(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "disconnected");
}
