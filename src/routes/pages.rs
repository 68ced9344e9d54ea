// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server-rendered pages: card number entry and redemption.

use crate::error::{AppError, Result};
use crate::models::CardStatus;
use crate::ui::{RedeemPage, RedeemPhase};
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/index.html", get(index))
        .route("/redeem.html", get(show_card).post(submit_key))
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate;

#[derive(Template)]
#[template(path = "redeem.html")]
struct RedeemTemplate {
    card_param: String,
    card_number: String,
    recipient_name: String,
    status: String,
    status_available: bool,
    not_found: bool,
    load_failed: bool,
    show_form: bool,
    action_disabled: bool,
    action_label: &'static str,
    error_message: String,
    is_redeemed: bool,
    celebrate: bool,
    redeemed_at: String,
}

impl RedeemTemplate {
    fn new(page: &RedeemPage, card_param: &str) -> Self {
        let card = page.card.as_ref();
        Self {
            card_param: card_param.to_string(),
            card_number: card
                .map(|c| c.card_number.to_string())
                .unwrap_or_else(|| card_param.to_string()),
            recipient_name: card.map(|c| c.recipient_name.clone()).unwrap_or_default(),
            status: card.map(|c| c.status.to_string()).unwrap_or_default(),
            status_available: card.is_some_and(|c| c.status == CardStatus::Available),
            not_found: page.phase == RedeemPhase::NotFound,
            load_failed: matches!(page.phase, RedeemPhase::LoadFailed { .. }),
            show_form: page.show_form(),
            action_disabled: page.action_disabled(),
            action_label: page.action_label(),
            error_message: page.error_message().unwrap_or_default().to_string(),
            is_redeemed: page.is_redeemed(),
            celebrate: page.celebrate(),
            redeemed_at: page.redeemed_at_label().unwrap_or_default(),
        }
    }
}

fn render_page(page: &RedeemPage, card_param: &str) -> Result<Response> {
    let html = RedeemTemplate::new(page, card_param)
        .render()
        .map_err(|e| AppError::Internal(e.into()))?;

    let status = match page.phase {
        RedeemPhase::NotFound => StatusCode::NOT_FOUND,
        RedeemPhase::LoadFailed { .. } => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };
    Ok((status, Html(html)).into_response())
}

/// Load a card into a fresh page, logging lookup failures that the page
/// will only show generically.
async fn load_page(state: &AppState, card_param: &str) -> RedeemPage {
    let result = state.lookup.lookup(card_param).await;
    if let Err(e @ (AppError::Store { .. } | AppError::Internal(_))) = &result {
        tracing::error!(error = %e, card = card_param, "Failed to load card for page");
    }
    RedeemPage::loading().on_lookup(result)
}

// ─── Handlers ────────────────────────────────────────────────

async fn index() -> Result<Html<String>> {
    let html = IndexTemplate
        .render()
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok(Html(html))
}

#[derive(Deserialize)]
struct CardQuery {
    card: Option<String>,
}

async fn show_card(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CardQuery>,
) -> Result<Response> {
    let Some(card_param) = params.card.filter(|c| !c.trim().is_empty()) else {
        return Ok(Redirect::to("/").into_response());
    };

    let page = load_page(&state, &card_param).await;
    render_page(&page, &card_param)
}

#[derive(Deserialize)]
struct KeyForm {
    #[serde(default)]
    card: String,
    #[serde(default)]
    key: String,
}

async fn submit_key(
    State(state): State<Arc<AppState>>,
    Form(form): Form<KeyForm>,
) -> Result<Response> {
    if form.card.trim().is_empty() {
        return Ok(Redirect::to("/").into_response());
    }

    let mut page = load_page(&state, &form.card).await;

    if let Some(key) = page.submit(&form.key) {
        // `submit` only moves to Verifying when a card is loaded.
        if let Some(card_id) = page.card.as_ref().map(|c| c.id.clone()) {
            let result = state.redemption.redeem(&card_id, &key).await;
            page = page.on_redeem(result);
        }
    }

    render_page(&page, &form.card)
}
