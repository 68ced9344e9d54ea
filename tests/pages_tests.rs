// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server-rendered redemption pages.

use axum::http::{header, StatusCode};
use favor_cards::config::Config;
use favor_cards::db::InMemoryStore;
use favor_cards::models::CardStatus;
use std::sync::Arc;
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_index_page() {
    let (app, _state, _store) = common::create_test_app();

    let response = app.oneshot(common::get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("Content-Security-Policy").is_some());
    let html = common::body_string(response).await;
    assert!(html.contains(r#"action="/redeem.html""#));
    assert!(html.contains(r#"name="card""#));
}

#[tokio::test]
async fn test_redeem_page_without_card_redirects_home() {
    let (app, _state, _store) = common::create_test_app();

    let response = app.oneshot(common::get("/redeem.html")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
}

#[tokio::test]
async fn test_available_card_shows_form() {
    let (app, _state, store) = common::create_test_app();
    store.seed(7, CardStatus::Available, Some("Sunrise"));

    let response = app
        .oneshot(common::get("/redeem.html?card=7"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = common::body_string(response).await;
    assert!(html.contains("Friend 7"));
    assert!(html.contains(r#"class="status-available""#));
    assert!(html.contains(r#"id="recipientKey""#));
    assert!(html.contains("Verify &amp; Redeem"));
    assert!(!html.contains(r#"id="redeemMessage""#));
    assert!(!html.contains("Sunrise"));
}

#[tokio::test]
async fn test_redeemed_card_shows_message_without_form() {
    let (app, _state, store) = common::create_test_app();
    store.seed(3, CardStatus::Redeemed, Some("Sunrise"));

    let response = app
        .oneshot(common::get("/redeem.html?card=3"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = common::body_string(response).await;
    assert!(html.contains(r#"id="redeemMessage""#));
    assert!(!html.contains(r#"id="recipientKey""#));
    assert!(!html.contains(r#"id="successModal""#));
}

#[tokio::test]
async fn test_unknown_card_page() {
    let (app, _state, _store) = common::create_test_app();

    let response = app
        .oneshot(common::get("/redeem.html?card=999"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let html = common::body_string(response).await;
    assert!(html.contains("Card not found!"));
    assert!(!html.contains(r#"id="recipientKey""#));
}

#[tokio::test]
async fn test_store_failure_page_offers_retry() {
    let app = common::create_offline_app();

    let response = app
        .oneshot(common::get("/redeem.html?card=4"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let html = common::body_string(response).await;
    assert!(html.contains("Error loading card details. Please try again."));
    assert!(html.contains(r#"href="/redeem.html?card=4""#));
}

#[tokio::test]
async fn test_submit_correct_key_celebrates() {
    let (app, _state, store) = common::create_test_app();
    let id = store.seed(7, CardStatus::Available, Some("Sunrise"));

    let response = app
        .oneshot(common::post_form("/redeem.html", "card=7&key=+sunrise+"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = common::body_string(response).await;
    assert!(html.contains(r#"id="successModal""#));
    assert!(html.contains(r#"id="celebrationSound""#));
    assert!(html.contains(r#"id="redeemedAt""#));
    assert!(html.contains(r#"id="redeemMessage""#));
    assert!(!html.contains(r#"id="recipientKey""#));

    assert_eq!(
        store.snapshot(&id).unwrap().status,
        Some(CardStatus::Redeemed)
    );
}

#[tokio::test]
async fn test_submit_wrong_key_shows_error() {
    let (app, _state, store) = common::create_test_app();
    let id = store.seed(8, CardStatus::Available, Some("Moonlight"));

    let response = app
        .oneshot(common::post_form("/redeem.html", "card=8&key=wrongkey"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = common::body_string(response).await;
    assert!(html.contains(r#"id="errorMessage""#));
    assert!(html.contains("Invalid key provided"));
    assert!(html.contains(r#"id="recipientKey""#));
    assert!(!html.contains(r#"id="successModal""#));

    assert_eq!(
        store.snapshot(&id).unwrap().status,
        Some(CardStatus::Available)
    );
}

#[tokio::test]
async fn test_submit_blank_key_is_rejected_before_redeeming() {
    let (app, _state, store) = common::create_test_app();
    let id = store.seed(9, CardStatus::Available, Some("Sunrise"));

    let response = app
        .oneshot(common::post_form("/redeem.html", "card=9&key=+++"))
        .await
        .unwrap();

    let html = common::body_string(response).await;
    assert!(html.contains("Please enter your key."));
    assert_eq!(
        store.snapshot(&id).unwrap().status,
        Some(CardStatus::Available)
    );
}

#[tokio::test]
async fn test_submit_to_redeemed_card_skips_redemption() {
    let (app, _state, store) = common::create_test_app();
    store.seed(10, CardStatus::Redeemed, Some("Sunrise"));

    let response = app
        .oneshot(common::post_form("/redeem.html", "card=10&key=Sunrise"))
        .await
        .unwrap();

    let html = common::body_string(response).await;
    assert!(html.contains(r#"id="redeemMessage""#));
    assert!(!html.contains(r#"id="successModal""#));
    assert!(!html.contains(r#"id="redeemedAt""#));
}

#[tokio::test]
async fn test_uploaded_card_images_are_served() {
    let hosted = tempfile::tempdir().unwrap();
    std::fs::write(hosted.path().join("card-4.png"), b"\x89PNG card four").unwrap();

    let config = Config {
        card_image_dir: Some(hosted.path().to_path_buf()),
        ..Config::test_default()
    };
    let (app, _state) =
        common::create_test_app_with_config(config, Arc::new(InMemoryStore::new()));

    let response = app
        .clone()
        .oneshot(common::get("/cards/card-4.png"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    let body = axum::body::to_bytes(response.into_body(), 1024)
        .await
        .unwrap();
    assert_eq!(&body[..], b"\x89PNG card four");

    let response = app.oneshot(common::get("/cards/card-5.png")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_card_images_not_served_without_directory() {
    let (app, _state, _store) = common::create_test_app();

    let response = app.oneshot(common::get("/cards/card-4.png")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_static_assets_are_served() {
    let assets = tempfile::tempdir().unwrap();
    std::fs::write(assets.path().join("celebration.mp3"), b"ID3 tune").unwrap();

    let config = Config {
        static_dir: assets.path().to_path_buf(),
        ..Config::test_default()
    };
    let (app, _state) =
        common::create_test_app_with_config(config, Arc::new(InMemoryStore::new()));

    let response = app
        .oneshot(common::get("/static/celebration.mp3"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "audio/mpeg"
    );
    assert!(response.headers().get("X-Content-Type-Options").is_some());
    let body = common::body_string(response).await;
    assert_eq!(body, "ID3 tune");
}
