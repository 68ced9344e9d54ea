// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JSON API routes for card lookup and redemption.

use crate::error::{AppError, Result};
use crate::models::{CardId, CardView};
use crate::services::Redemption;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Public API routes. No authentication: the card key is the credential.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/get-card", get(get_card))
        .route("/api/redeem", post(redeem).fallback(method_not_allowed))
}

// ─── Lookup ──────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetCardQuery {
    card_number: Option<String>,
}

/// Get the public details of a card by number.
async fn get_card(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GetCardQuery>,
) -> Result<Json<CardView>> {
    let raw = params.card_number.unwrap_or_default();
    let card = state.lookup.lookup(&raw).await?;

    tracing::debug!(
        card_number = card.card_number,
        status = %card.status,
        "Card lookup served"
    );

    Ok(Json(card))
}

// ─── Redemption ──────────────────────────────────────────────

/// Redemption request body. Fields are optional so that missing values get
/// a specific error rather than a generic parse failure.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RedeemRequest {
    card_id: Option<String>,
    key: Option<String>,
}

/// Verify the key and redeem the card.
async fn redeem(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Json<Redemption>> {
    let request: RedeemRequest = serde_json::from_slice(&body)
        .map_err(|_| AppError::BadRequest("Invalid request body".to_string()))?;

    let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
    let (Some(card_id), Some(key)) = (non_empty(request.card_id), non_empty(request.key)) else {
        return Err(AppError::BadRequest("Missing cardId or key".to_string()));
    };

    let redemption = state.redemption.redeem(&CardId::new(card_id), &key).await?;

    tracing::debug!(
        card_number = redemption.card_number,
        redeemed_at = %redemption.redeemed_at,
        "Redemption served"
    );

    Ok(Json(redemption))
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
