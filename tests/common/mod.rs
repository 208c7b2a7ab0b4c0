// SPDX-License-Identifier: MIT

use adaudit::config::Config;
use adaudit::db::Store;
use adaudit::middleware::auth::create_session_token;
use adaudit::models::{NewUser, User};
use adaudit::routes::create_router;
use adaudit::services::{AnalysisClient, JobQueue};
use adaudit::AppState;
use std::sync::Arc;

/// Create a test app with an in-memory database and a mock analysis
/// client that always succeeds. Returns the router and the shared state.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, Arc<AppState>) {
    build_app(AnalysisClient::new_mock()).await
}

/// Variant whose analysis client fails every request.
#[allow(dead_code)]
pub async fn create_test_app_failing_analysis() -> (axum::Router, Arc<AppState>) {
    build_app(AnalysisClient::new_mock_failing()).await
}

async fn build_app(analysis: AnalysisClient) -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let store = Store::connect(&config.database_url)
        .await
        .expect("Failed to open in-memory database");
    let analysis = Arc::new(analysis);
    let jobs = JobQueue::start(store.clone(), analysis.clone());

    let state = Arc::new(AppState {
        config,
        store,
        analysis,
        jobs,
    });

    (create_router(state.clone()), state)
}

/// Insert a user row directly.
#[allow(dead_code)]
pub async fn create_user(state: &AppState, email: &str) -> User {
    state
        .store
        .create_user(NewUser {
            email: email.to_string(),
            first_name: Some("Test".to_string()),
            ..NewUser::default()
        })
        .await
        .expect("Failed to create user")
}

/// Mint a session token for a user with the app's signing key.
#[allow(dead_code)]
pub fn session_token(state: &AppState, user_id: i64) -> String {
    create_session_token(user_id, &state.config.session_secret)
        .expect("Failed to create session token")
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn json_body(response: axum::http::Response<axum::body::Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&bytes).expect("Response body is not valid JSON")
}
