// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

use axum::{http::StatusCode, routing::post, Json, Router};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use vidsum::config::Config;
use vidsum::db::FirestoreDb;
use vidsum::middleware::auth::create_jwt;
use vidsum::routes::create_router;
use vidsum::AppState;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    create_test_app_with(Config::test_default())
}

/// Create a test app from a custom config (e.g. pointing at a fake gateway).
#[allow(dead_code)]
pub fn create_test_app_with(config: Config) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config, FirestoreDb::new_mock()));
    (create_router(state.clone()), state)
}

/// Session token for `user_id`, signed with the test key.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, role: Option<&str>) -> String {
    let config = Config::test_default();
    create_jwt(user_id, Some("test@example.com"), role, &config.jwt_signing_key)
        .expect("Failed to sign test token")
}

/// Serve `router` on an ephemeral local port and return its base URL.
#[allow(dead_code)]
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    format!("http://{}", addr)
}

/// Fake chat-completions gateway.
#[allow(dead_code)]
pub struct FakeGateway {
    pub url: String,
    pub calls: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl FakeGateway {
    /// Gateway answering every request with `reply` as the model text.
    pub async fn replying(reply: &str) -> Self {
        let body = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": reply } }]
        });
        Self::start(StatusCode::OK, body).await
    }

    /// Gateway failing every request with `status`.
    pub async fn failing(status: StatusCode) -> Self {
        Self::start(status, serde_json::json!({ "error": "gateway says no" })).await
    }

    async fn start(status: StatusCode, body: serde_json::Value) -> Self {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let router = Router::new().route(
            "/v1/chat/completions",
            post(move || {
                let body = body.clone();
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (status, Json(body))
                }
            }),
        );
        let base = serve(router).await;
        Self {
            url: format!("{}/v1/chat/completions", base),
            calls,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Test config routed at this gateway.
    pub fn config(&self) -> Config {
        Config {
            llm_api_url: self.url.clone(),
            ..Config::test_default()
        }
    }
}
