// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Card store layer (Notion database, with an in-memory stand-in).

pub mod memory;
pub mod notion;

pub use memory::InMemoryStore;
pub use notion::NotionStore;

use crate::models::{Card, CardId, NewCard};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Property names of the card database.
pub mod properties {
    pub const CARD_NUMBER: &str = "Card Number";
    pub const RECIPIENT_NAME: &str = "Recipient Name";
    pub const STATUS: &str = "Status";
    pub const KEY: &str = "Key";
    pub const REDEMPTION_DATE: &str = "Redemption Date";
    pub const CARD_IMAGE_URL: &str = "Card Image URL";
    pub const QR_CODE_URL: &str = "QR Code URL";
}

/// Errors from the card store, classified so callers never need the raw
/// response body.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("card store request timed out")]
    Timeout,

    #[error("card store unreachable: {0}")]
    Network(String),

    #[error("card store returned HTTP {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("unexpected card store response: {0}")]
    Decode(String),

    #[error("card store not connected (offline mode)")]
    NotConnected,
}

impl StoreError {
    /// Notion's error code for a missing page or database.
    pub const OBJECT_NOT_FOUND: &'static str = "object_not_found";

    /// Whether retrying the same call may succeed.
    pub fn is_timeout(&self) -> bool {
        match self {
            StoreError::Timeout => true,
            StoreError::Api { status, .. } => *status == 504,
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Api { code, .. } if code == Self::OBJECT_NOT_FOUND)
    }

    /// Short description with no response body or identifiers, safe to
    /// return to clients.
    pub fn public_detail(&self) -> String {
        match self {
            StoreError::Timeout => "card store request timed out".to_string(),
            StoreError::Network(_) => "card store unreachable".to_string(),
            StoreError::Api { status, .. } => format!("card store returned HTTP {}", status),
            StoreError::Decode(_) => "unexpected card store response".to_string(),
            StoreError::NotConnected => "card store not connected".to_string(),
        }
    }
}

/// Persistence operations needed by the services and the batch generator.
#[async_trait]
pub trait CardStore: Send + Sync {
    /// Short name used in logs and health output.
    fn backend_tag(&self) -> &'static str;

    /// Find the card with the given number. The first match wins.
    async fn find_by_number(&self, card_number: u32) -> Result<Option<Card>, StoreError>;

    /// Get a card by its store identifier.
    async fn get(&self, id: &CardId) -> Result<Option<Card>, StoreError>;

    /// Set status to Redeemed and the redemption date in one update.
    ///
    /// The write is unconditional: the store offers no compare-and-swap, so
    /// concurrent redemptions resolve as last-write-wins.
    async fn mark_redeemed(&self, id: &CardId, at: DateTime<Utc>) -> Result<(), StoreError>;

    /// Create a new Available card record and return its identifier.
    async fn create(&self, card: &NewCard) -> Result<CardId, StoreError>;

    /// Cheap connectivity check.
    async fn ping(&self) -> Result<(), StoreError>;
}
