//! Integration tests for the guest RSVP endpoints.

mod common;

use axum::http::{header, Method, StatusCode};
use common::{
    get_request, json_names, json_request, lazy_pool, names, parse_response_body,
    remove_invitation, seed_invitation, test_app, test_config, test_pool,
};
use serde_json::json;
use tower::ServiceExt;

// ============================================================================
// Validation (no database)
// ============================================================================

#[tokio::test]
async fn test_submit_rejects_malformed_code() {
    let (app, _) = test_app(test_config(), lazy_pool());

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/rsvp/bad%20code!",
            json!({ "response": "yes" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_submit_rejects_unknown_response() {
    let (app, _) = test_app(test_config(), lazy_pool());

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/rsvp/A007",
            json!({ "response": "maybe" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_submit_rejects_non_string_names() {
    let (app, _) = test_app(test_config(), lazy_pool());

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/rsvp/A007",
            json!({ "response": "yes", "attending_guest_names": ["Alice", 42] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_submit_rejects_too_many_names() {
    let (app, _) = test_app(test_config(), lazy_pool());
    let guests: Vec<String> = (0..21).map(|i| format!("Guest {}", i)).collect();

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/rsvp/A007",
            json!({ "response": "yes", "guest_names": guests }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_rejects_malformed_code() {
    let (app, _) = test_app(test_config(), lazy_pool());

    let response = app
        .oneshot(get_request(&format!("/api/v1/rsvp/{}", "A".repeat(37))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_responses_carry_request_id_and_security_headers() {
    let (app, _) = test_app(test_config(), lazy_pool());

    let response = app.oneshot(get_request("/api/health/live")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
}

#[tokio::test]
async fn test_rate_limit_applies_before_database() {
    let config = wedding_rsvp_api::config::Config::load_for_test(&[
        ("security.trust_forwarded_for", "true"),
        ("security.rsvp_max_attempts", "1"),
        ("security.rsvp_window_secs", "600"),
    ])
    .unwrap();
    let (app, _) = test_app(config, lazy_pool());

    // The first attempt passes the limiter and is then rejected by validation
    let first = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/rsvp/LIMITED",
            json!({ "response": "perhaps" }),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::BAD_REQUEST);

    let second = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/rsvp/limited",
            json!({ "response": "perhaps" }),
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(second.headers().contains_key(header::RETRY_AFTER));
    let body = parse_response_body(second).await;
    assert_eq!(body["error"], "rate_limited");
}

// ============================================================================
// Database-backed flows
// ============================================================================

#[tokio::test]
async fn test_get_invitation() {
    let Some(pool) = test_pool().await else { return };
    let code = seed_invitation(&pool, &["Alice", "Bob"]).await;
    let (app, _) = test_app(test_config(), pool.clone());

    let response = app
        .oneshot(get_request(&format!("/api/v1/rsvp/{}", code.to_lowercase())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["code"], code);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["status_label"], "Pending");
    assert_eq!(json_names(&body["guest_names"]), names(&["Alice", "Bob"]));
    assert!(body["rsvped_at"].is_null());

    remove_invitation(&pool, &code).await;
}

#[tokio::test]
async fn test_unknown_code_is_not_found() {
    let Some(pool) = test_pool().await else { return };
    let (app, _) = test_app(test_config(), pool);

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/rsvp/NO-SUCH-CODE-EXISTS",
            json!({ "response": "yes" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_full_party_attends() {
    let Some(pool) = test_pool().await else { return };
    let code = seed_invitation(&pool, &["Alice", "Bob"]).await;
    let (app, notifier) = test_app(test_config(), pool.clone());

    let response = app
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/rsvp/{}", code),
            json!({ "response": "yes", "attending_guest_names": ["Bob", "Alice"] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["status"], "yes");
    assert_eq!(
        json_names(&body["attending_guest_names"]),
        names(&["Alice", "Bob"])
    );
    assert!(body["rsvped_at"].is_string());
    assert_eq!(body["email_sent"], true);

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].code, code);
    assert_eq!(sent[0].client_ip.as_deref(), Some("203.0.113.10"));

    remove_invitation(&pool, &code).await;
}

#[tokio::test]
async fn test_partial_attendance_then_decline() {
    let Some(pool) = test_pool().await else { return };
    let code = seed_invitation(&pool, &["Alice", "Bob", "Carol"]).await;
    let (app, _) = test_app(test_config(), pool.clone());
    let uri = format!("/api/v1/rsvp/{}", code);

    let first = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &uri,
            json!({ "response": "yes", "attending_guest_names": ["Carol", "Mallory"] }),
        ))
        .await
        .unwrap();
    let first = parse_response_body(first).await;
    assert_eq!(first["status"], "yes partial party attendance");
    assert_eq!(first["status_label"], "Partially attending");
    assert_eq!(json_names(&first["attending_guest_names"]), names(&["Carol"]));

    let second = app
        .oneshot(json_request(Method::POST, &uri, json!({ "response": "NO" })))
        .await
        .unwrap();
    let second = parse_response_body(second).await;
    assert_eq!(second["status"], "no");
    assert!(json_names(&second["attending_guest_names"]).is_empty());
    // First RSVP time is kept on later changes
    assert_eq!(second["rsvped_at"], first["rsvped_at"]);

    remove_invitation(&pool, &code).await;
}

#[tokio::test]
async fn test_single_guest_yes_without_selection() {
    let Some(pool) = test_pool().await else { return };
    let code = seed_invitation(&pool, &["Alice"]).await;
    let (app, _) = test_app(test_config(), pool.clone());

    let response = app
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/rsvp/{}", code),
            json!({ "response": "yes" }),
        ))
        .await
        .unwrap();

    let body = parse_response_body(response).await;
    assert_eq!(body["status"], "yes");
    assert_eq!(json_names(&body["attending_guest_names"]), names(&["Alice"]));

    remove_invitation(&pool, &code).await;
}

#[tokio::test]
async fn test_failed_notification_still_records() {
    let Some(pool) = test_pool().await else { return };
    let code = seed_invitation(&pool, &["Alice", "Bob"]).await;
    let notifier = std::sync::Arc::new(domain::services::MockNotifier::failing());
    let app = wedding_rsvp_api::app::create_app_with_notifier(
        test_config(),
        pool.clone(),
        notifier,
    );

    let response = app
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/rsvp/{}", code),
            json!({ "response": "no" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["status"], "no");
    assert_eq!(body["email_sent"], false);

    remove_invitation(&pool, &code).await;
}

#[tokio::test]
async fn test_concurrent_submissions_are_serialized() {
    let Some(pool) = test_pool().await else { return };
    let code = seed_invitation(&pool, &["Alice", "Bob"]).await;
    let (app, _) = test_app(test_config(), pool.clone());
    let uri = format!("/api/v1/rsvp/{}", code);

    let requests = (0..8).map(|i| {
        let app = app.clone();
        let uri = uri.clone();
        let body = if i % 2 == 0 {
            json!({ "response": "yes", "attending_guest_names": ["Alice", "Bob"] })
        } else {
            json!({ "response": "no" })
        };
        tokio::spawn(async move { app.oneshot(json_request(Method::POST, &uri, body)).await })
    });

    for handle in requests {
        let response = handle.await.unwrap().unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Whatever won, the stored row is one of the two consistent states
    let row = persistence::repositories::InvitationRepository::new(pool.clone())
        .find_by_code(&code)
        .await
        .unwrap()
        .unwrap();
    match row.status.as_str() {
        "yes" => assert_eq!(row.attending_guest_names, names(&["Alice", "Bob"])),
        "no" => assert!(row.attending_guest_names.is_empty()),
        other => panic!("unexpected status {}", other),
    }

    remove_invitation(&pool, &code).await;
}
