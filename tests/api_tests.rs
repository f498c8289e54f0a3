// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! API authentication, authorization and validation tests.
//!
//! These tests verify that:
//! 1. User routes reject requests without valid tokens
//! 2. Uploads require the uploader role
//! 3. Malformed query parameters and bodies fail with 400 before storage
//! 4. CORS preflight requests return correct headers
//!
//! The database is an offline mock, so a request that gets past every
//! check surfaces as a 500 database error.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;
use vidsum::middleware::auth::{SESSION_COOKIE, UPLOADER_ROLE};

mod common;
use common::{create_test_app, create_test_jwt};

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn with_json(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn upload_body(youtube_url: &str) -> Value {
    json!({
        "youtube_url": youtube_url,
        "title": "How compounding works",
        "channel_name": "Finance Simplified",
        "category": "Finance",
        "intro": "Compounding rewards patience.",
        "key_points": [{ "title": "Basics", "items": ["Start early"] }]
    })
}

#[tokio::test]
async fn test_health() {
    let (app, _) = create_test_app();
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_user_route_without_token() {
    let (app, _) = create_test_app();
    let response = app.oneshot(get("/api/me/following")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_route_with_bad_token() {
    let (app, _) = create_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/me/profile")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_route_accepts_session_cookie() {
    let (app, _) = create_test_app();
    let token = create_test_jwt("user-1", None);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/me/following/ids")
                .header(header::COOKIE, format!("{}={}", SESSION_COOKIE, token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    // Authenticated; the offline database then fails the lookup.
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_follow_requires_auth() {
    let (app, _) = create_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/me/following/c1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_update_validates_before_storage() {
    let (app, _) = create_test_app();
    let token = create_test_jwt("user-1", None);
    let response = app
        .oneshot(with_json(
            "PUT",
            "/api/me/profile",
            Some(&token),
            json!({ "email": "not-an-email" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_without_token() {
    let (app, _) = create_test_app();
    let response = app
        .oneshot(with_json(
            "POST",
            "/api/summaries",
            None,
            upload_body("https://youtu.be/dQw4w9WgXcQ"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_upload_forbidden_for_regular_user() {
    let (app, _) = create_test_app();
    let token = create_test_jwt("user-1", None);
    let response = app
        .oneshot(with_json(
            "POST",
            "/api/summaries",
            Some(&token),
            upload_body("https://youtu.be/dQw4w9WgXcQ"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_upload_allowed_for_listed_uploader() {
    let (app, _) = create_test_app();
    // "uploader-1" is on the test config allow-list.
    let token = create_test_jwt("uploader-1", None);
    let response = app
        .oneshot(with_json(
            "POST",
            "/api/summaries",
            Some(&token),
            upload_body("https://youtu.be/dQw4w9WgXcQ"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_upload_rejects_invalid_video_url() {
    let (app, _) = create_test_app();
    let token = create_test_jwt("someone", Some(UPLOADER_ROLE));
    let response = app
        .oneshot(with_json(
            "POST",
            "/api/summaries",
            Some(&token),
            upload_body("https://example.com/video"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_rejects_unknown_category() {
    let (app, _) = create_test_app();
    let token = create_test_jwt("someone", Some(UPLOADER_ROLE));
    let mut body = upload_body("https://youtu.be/dQw4w9WgXcQ");
    body["category"] = json!("Cooking");
    let response = app
        .oneshot(with_json("POST", "/api/summaries", Some(&token), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_summaries_rejects_zero_limit() {
    let (app, _) = create_test_app();
    let response = app.oneshot(get("/api/summaries?limit=0")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_summaries_rejects_bad_cursor() {
    let (app, _) = create_test_app();
    let response = app
        // base64 of "not-a-cursor": decodes, but has no separator
        .oneshot(get("/api/summaries?cursor=bm90LWEtY3Vyc29y"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_summaries_rejects_unknown_category() {
    let (app, _) = create_test_app();
    let response = app
        .oneshot(get("/api/summaries?category=Cooking"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_summaries_all_category_reaches_storage() {
    let (app, _) = create_test_app();
    let response = app
        .oneshot(get("/api/summaries?category=All&limit=5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_cors_preflight_from_localhost() {
    let (app, _) = create_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/functions/generate-summary")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:5173"
    );
}
