// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response};
use favor_cards::config::Config;
use favor_cards::db::{CardStore, InMemoryStore};
use favor_cards::routes::create_router;
use favor_cards::AppState;
use std::sync::Arc;

/// Create a test app backed by an empty in-memory card store.
/// Returns the router, the shared state and the store for seeding.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let (app, state) = create_test_app_with_store(store.clone());
    (app, state, store)
}

/// Create a test app whose card store is unreachable.
#[allow(dead_code)]
pub fn create_offline_app() -> axum::Router {
    create_test_app_with_store(Arc::new(InMemoryStore::offline())).0
}

#[allow(dead_code)]
pub fn create_test_app_with_store(store: Arc<dyn CardStore>) -> (axum::Router, Arc<AppState>) {
    create_test_app_with_config(Config::test_default(), store)
}

#[allow(dead_code)]
pub fn create_test_app_with_config(
    config: Config,
    store: Arc<dyn CardStore>,
) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config, store));
    (create_router(state.clone()), state)
}

#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[allow(dead_code)]
pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[allow(dead_code)]
pub fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[allow(dead_code)]
pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}
