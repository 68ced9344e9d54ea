// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Key-checked redemption of a card.
//!
//! The flow is check-then-act against the store:
//! 1. Fetch the card by id
//! 2. Require status Available
//! 3. Require a case-insensitive key match
//! 4. Write status Redeemed and the redemption date in one update
//!
//! Nothing guards steps 1-4 against a concurrent redemption of the same card.
//! The store has no conditional update, so two racing requests with the
//! right key can both succeed and the later write wins.

use crate::db::CardStore;
use crate::error::{AppError, Result};
use crate::models::CardId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub const CARD_NOT_FOUND: &str = "Card not found";
pub const NOT_AVAILABLE: &str = "Card has already been redeemed or is not available";
pub const INVALID_KEY: &str = "Invalid key provided";
pub const REDEEMED: &str = "Card redeemed successfully!";

/// Successful redemption.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Redemption {
    pub message: String,
    #[serde(skip)]
    pub card_number: u32,
    #[serde(skip)]
    pub redeemed_at: DateTime<Utc>,
}

/// Validates keys and records redemptions.
#[derive(Clone)]
pub struct RedemptionService {
    store: Arc<dyn CardStore>,
}

impl RedemptionService {
    pub fn new(store: Arc<dyn CardStore>) -> Self {
        Self { store }
    }

    /// Redeem a card, stamping the current time.
    pub async fn redeem(&self, card_id: &CardId, submitted_key: &str) -> Result<Redemption> {
        self.redeem_at(card_id, submitted_key, Utc::now()).await
    }

    /// Redeem a card with an explicit redemption time.
    pub async fn redeem_at(
        &self,
        card_id: &CardId,
        submitted_key: &str,
        now: DateTime<Utc>,
    ) -> Result<Redemption> {
        let card = self
            .store
            .get(card_id)
            .await
            .map_err(AppError::store(AppError::REDEMPTION_FAILED))?
            .ok_or_else(|| AppError::NotFound(CARD_NOT_FOUND.to_string()))?;

        if !card.is_available() {
            tracing::info!(
                card_id = %card_id,
                card_number = card.card_number,
                status = card.status.as_ref().map(|s| s.as_str()).unwrap_or("unset"),
                "Redemption refused: card not available"
            );
            return Err(AppError::Conflict(NOT_AVAILABLE.to_string()));
        }

        if !card.key_matches(submitted_key) {
            tracing::warn!(
                card_id = %card_id,
                card_number = card.card_number,
                key_set = card.key.is_some(),
                "Redemption refused: invalid key"
            );
            return Err(AppError::Forbidden(INVALID_KEY.to_string()));
        }

        self.store
            .mark_redeemed(card_id, now)
            .await
            .map_err(AppError::store(AppError::REDEMPTION_FAILED))?;

        tracing::info!(
            card_id = %card_id,
            card_number = card.card_number,
            redeemed_at = %now,
            "Card redeemed"
        );

        Ok(Redemption {
            message: REDEEMED.to_string(),
            card_number: card.card_number,
            redeemed_at: now,
        })
    }
}
