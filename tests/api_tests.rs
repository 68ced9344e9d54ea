// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Lookup endpoint, method handling and health.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use favor_cards::models::CardStatus;
use serde_json::json;
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_get_card_returns_public_fields() {
    let (app, _state, store) = common::create_test_app();
    let id = store.seed(7, CardStatus::Available, Some("Sunrise"));

    let response = app
        .oneshot(common::get("/api/get-card?cardNumber=7"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(
        body,
        json!({
            "id": id.as_str(),
            "cardNumber": 7,
            "recipientName": "Friend 7",
            "status": "Available",
            "imageUrl": "https://example.com/card-7.png",
        })
    );
    assert!(body.get("key").is_none());
}

#[tokio::test]
async fn test_get_card_not_found() {
    let (app, _state, store) = common::create_test_app();
    store.seed(7, CardStatus::Available, Some("Sunrise"));

    for uri in [
        "/api/get-card?cardNumber=999",
        "/api/get-card?cardNumber=abc",
        "/api/get-card?cardNumber=0",
        "/api/get-card?cardNumber=-7",
        "/api/get-card",
    ] {
        let response = app.clone().oneshot(common::get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        let body = common::body_json(response).await;
        assert_eq!(body["message"], "Card not found");
    }
}

#[tokio::test]
async fn test_get_card_store_failure() {
    let app = common::create_offline_app();

    let response = app
        .oneshot(common::get("/api/get-card?cardNumber=1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "Failed to fetch card details");
    assert_eq!(body["details"], "card store not connected");
}

#[tokio::test]
async fn test_get_card_missing_fields_use_defaults() {
    let (app, _state, store) = common::create_test_app();
    let id = store.seed(5, CardStatus::Available, None);
    let mut card = store.snapshot(&id).unwrap();
    card.recipient_name = None;
    card.status = None;
    card.image_url = None;
    store.insert(card);

    let response = app
        .oneshot(common::get("/api/get-card?cardNumber=5"))
        .await
        .unwrap();

    let body = common::body_json(response).await;
    assert_eq!(body["recipientName"], "Unknown");
    assert_eq!(body["status"], "Available");
    assert_eq!(body["imageUrl"], "");
}

#[tokio::test]
async fn test_redeem_rejects_other_methods() {
    let (app, _state, _store) = common::create_test_app();

    for method in ["GET", "PUT", "DELETE"] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri("/api/redeem")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body = common::body_json(response).await;
        assert_eq!(body["message"], "Method Not Allowed");
    }
}

#[tokio::test]
async fn test_redeem_invalid_json() {
    let (app, _state, _store) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/redeem")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert_eq!(body["message"], "Invalid request body");
}

#[tokio::test]
async fn test_health() {
    let (app, _state, _store) = common::create_test_app();
    let response = app.oneshot(common::get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "memory: healthy");

    let response = common::create_offline_app()
        .oneshot(common::get("/health"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = common::body_json(response).await;
    assert_eq!(body["status"], "degraded");
}

#[tokio::test]
async fn test_cors_allows_frontend_origin() {
    let (app, state, _store) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/redeem")
                .header(header::ORIGIN, state.config.frontend_url.as_str())
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        state.config.frontend_url.as_str()
    );
}

#[tokio::test]
async fn test_redeem_options_is_answered_as_cors_preflight() {
    let (app, _state, _store) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/redeem")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // OPTIONS never reaches the 405 fallback.
    assert_eq!(response.status(), StatusCode::OK);
    let allowed = response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(allowed.contains("POST"));
    assert!(common::body_string(response).await.is_empty());
}
