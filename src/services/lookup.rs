// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Card lookup by public card number.

use crate::db::CardStore;
use crate::error::{AppError, Result};
use crate::models::CardView;
use std::sync::Arc;

/// Read-only lookup returning the public projection of a card.
#[derive(Clone)]
pub struct LookupService {
    store: Arc<dyn CardStore>,
}

impl LookupService {
    pub fn new(store: Arc<dyn CardStore>) -> Self {
        Self { store }
    }

    /// Look up a card by its number as supplied by the caller.
    ///
    /// Input that is not a positive integer cannot match any card and is
    /// reported as not found without querying the store.
    pub async fn lookup(&self, raw_card_number: &str) -> Result<CardView> {
        let Some(card_number) = parse_card_number(raw_card_number) else {
            tracing::debug!(input = raw_card_number, "Malformed card number");
            return Err(not_found());
        };

        tracing::info!(card_number, "Looking up card");

        let card = self
            .store
            .find_by_number(card_number)
            .await
            .map_err(AppError::store(AppError::LOOKUP_FAILED))?
            .ok_or_else(not_found)?;

        Ok(CardView::from(&card))
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Card not found".to_string())
}

/// Parse a card number; only positive integers are valid.
pub fn parse_card_number(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|n| *n > 0)
}
