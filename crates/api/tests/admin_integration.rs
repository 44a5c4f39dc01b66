//! Integration tests for the admin console endpoints.

mod common;

use axum::http::{Method, StatusCode};
use axum::Router;
use common::{
    get_request, json_names, json_request, json_request_with_token, lazy_pool, names,
    parse_response_body, remove_invitation, seed_admin, seed_invitation, test_app, test_config,
    test_pool,
};
use persistence::repositories::InvitationRepository;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/admin/auth",
            json!({ "username": username, "password": password }),
        ))
        .await
        .unwrap();
    let status = response.status();
    (status, parse_response_body(response).await)
}

async fn admin_token(app: &Router, pool: &PgPool) -> String {
    let (username, password) = seed_admin(pool).await;
    let (status, body) = login(app, &username, &password).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

async fn invitation_id(pool: &PgPool, code: &str) -> i64 {
    InvitationRepository::new(pool.clone())
        .find_by_code(code)
        .await
        .unwrap()
        .unwrap()
        .id
}

async fn patch(app: &Router, token: &str, id: i64, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(json_request_with_token(
            Method::PATCH,
            &format!("/api/v1/admin/invitations/{}", id),
            token,
            body,
        ))
        .await
        .unwrap();
    let status = response.status();
    (status, parse_response_body(response).await)
}

// ============================================================================
// Without a database
// ============================================================================

#[tokio::test]
async fn test_list_requires_token() {
    let (app, _) = test_app(test_config(), lazy_pool());

    let response = app
        .oneshot(get_request("/api/v1/admin/invitations"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_update_requires_token() {
    let (app, _) = test_app(test_config(), lazy_pool());

    let response = app
        .oneshot(json_request(
            Method::PATCH,
            "/api/v1/admin/invitations/1",
            json!({ "status": "yes" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_rejects_empty_password() {
    let (app, _) = test_app(test_config(), lazy_pool());

    let (status, body) = login(&app, "admin", "").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_login_rate_limited() {
    let config = wedding_rsvp_api::config::Config::load_for_test(&[
        ("security.trust_forwarded_for", "true"),
        ("security.login_max_attempts", "2"),
        ("security.login_window_secs", "300"),
    ])
    .unwrap();
    let (app, _) = test_app(config, lazy_pool());

    // Empty passwords fail validation after the limiter has counted them
    for _ in 0..2 {
        let (status, _) = login(&app, "admin", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (status, body) = login(&app, "admin", "").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "rate_limited");
}

// ============================================================================
// With a database
// ============================================================================

#[tokio::test]
async fn test_login_and_logout() {
    let Some(pool) = test_pool().await else { return };
    let (app, _) = test_app(test_config(), pool.clone());
    let (username, password) = seed_admin(&pool).await;

    let (status, body) = login(&app, &username, &password).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], username);
    assert!(body["expires_at"].is_string());
    let token = body["token"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request_with_token(
            Method::POST,
            "/api/v1/admin/logout",
            &token,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The revoked token no longer opens the console
    let mut request = get_request("/api/v1/admin/invitations");
    request
        .headers_mut()
        .insert("authorization", format!("Bearer {}", token).parse().unwrap());
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let Some(pool) = test_pool().await else { return };
    let (app, _) = test_app(test_config(), pool.clone());
    let (username, _) = seed_admin(&pool).await;

    let (status, body) = login(&app, &username, "wrong password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, _) = login(&app, "nobody_by_this_name", "whatever").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_invitations() {
    let Some(pool) = test_pool().await else { return };
    let (app, _) = test_app(test_config(), pool.clone());
    let token = admin_token(&app, &pool).await;
    let code = seed_invitation(&pool, &["Alice", "Bob"]).await;

    let response = app
        .oneshot(json_request_with_token(
            Method::GET,
            "/api/v1/admin/invitations",
            &token,
            json!(null),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    let statuses: Vec<&str> = body["statuses"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["code"].as_str().unwrap())
        .collect();
    assert_eq!(
        statuses,
        vec!["pending", "yes", "no", "yes partial party attendance"]
    );

    let item = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|item| item["invite_code"] == code.as_str())
        .expect("seeded invitation listed");
    assert_eq!(item["status"], "pending");
    assert_eq!(json_names(&item["guest_names"]), names(&["Alice", "Bob"]));

    remove_invitation(&pool, &code).await;
}

#[tokio::test]
async fn test_update_reconciles_attendance() {
    let Some(pool) = test_pool().await else { return };
    let (app, _) = test_app(test_config(), pool.clone());
    let token = admin_token(&app, &pool).await;
    let code = seed_invitation(&pool, &["Alice", "Bob", "Carol"]).await;
    let id = invitation_id(&pool, &code).await;

    let (status, body) = patch(
        &app,
        &token,
        id,
        json!({ "attending_guest_names": ["Carol", "Alice", "Mallory"] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json_names(&body["item"]["attending_guest_names"]),
        names(&["Carol", "Alice"])
    );

    let (status, body) = patch(&app, &token, id, json!({ "status": "no" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item"]["status"], "no");
    assert!(json_names(&body["item"]["attending_guest_names"]).is_empty());
    // Admin edits never stamp the guest's RSVP time
    assert!(body["item"]["rsvped_at"].is_null());

    remove_invitation(&pool, &code).await;
}

#[tokio::test]
async fn test_update_keeps_status_consistent_with_attendance() {
    let Some(pool) = test_pool().await else { return };
    let (app, _) = test_app(test_config(), pool.clone());
    let token = admin_token(&app, &pool).await;
    let code = seed_invitation(&pool, &["Alice", "Bob"]).await;
    let id = invitation_id(&pool, &code).await;

    let (status, body) = patch(&app, &token, id, json!({ "status": "yes" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item"]["status"], "yes");
    assert_eq!(
        json_names(&body["item"]["attending_guest_names"]),
        names(&["Alice", "Bob"])
    );

    let (_, body) = patch(&app, &token, id, json!({ "guest_names": ["Alice", "Bob", "Carol"] })).await;
    assert_eq!(body["item"]["status"], "yes partial party attendance");

    let (_, body) = patch(&app, &token, id, json!({ "guest_names": ["Carol"] })).await;
    assert_eq!(body["item"]["status"], "no");
    assert!(json_names(&body["item"]["attending_guest_names"]).is_empty());

    remove_invitation(&pool, &code).await;
}

#[tokio::test]
async fn test_update_code_and_party_size() {
    let Some(pool) = test_pool().await else { return };
    let (app, _) = test_app(test_config(), pool.clone());
    let token = admin_token(&app, &pool).await;
    let code = seed_invitation(&pool, &["Alice"]).await;
    let taken = seed_invitation(&pool, &["Bob"]).await;
    let id = invitation_id(&pool, &code).await;

    let (status, body) = patch(&app, &token, id, json!({ "invite_code": taken.to_lowercase() })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Invite code already in use");

    let (status, _) = patch(&app, &token, id, json!({ "party_size": 51 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let renamed = common::unique_code();
    let (status, body) = patch(
        &app,
        &token,
        id,
        json!({ "invite_code": renamed.to_lowercase(), "party_size": 4 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item"]["invite_code"], renamed.as_str());
    assert_eq!(body["item"]["party_size"], 4);

    let (status, body) = patch(&app, &token, id, json!({ "party_size": null })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["item"]["party_size"].is_null());

    remove_invitation(&pool, &renamed).await;
    remove_invitation(&pool, &taken).await;
}

#[tokio::test]
async fn test_update_rejects_empty_and_unknown() {
    let Some(pool) = test_pool().await else { return };
    let (app, _) = test_app(test_config(), pool.clone());
    let token = admin_token(&app, &pool).await;

    let (status, _) = patch(&app, &token, 1, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = patch(&app, &token, i64::MAX, json!({ "status": "yes" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = patch(&app, &token, 1, json!({ "status": "maybe" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
