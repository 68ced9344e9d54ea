// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Card model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Recipient name used when a stored record has no readable name.
pub const UNKNOWN_RECIPIENT: &str = "Unknown";

/// Opaque card identifier assigned by the store (a Notion page id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Card status as stored in the `Status` select property.
///
/// Select values other than the two known ones are kept verbatim so they can
/// be shown, but they are never redeemable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardStatus {
    Available,
    Redeemed,
    Other(String),
}

impl CardStatus {
    pub fn from_name(name: &str) -> Self {
        match name {
            "Available" => Self::Available,
            "Redeemed" => Self::Redeemed,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Available => "Available",
            Self::Redeemed => "Redeemed",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CardStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CardStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

/// Full card record, including the secret key.
///
/// Never serialize this to a client; use [`CardView`] instead.
#[derive(Debug, Clone)]
pub struct Card {
    pub id: CardId,
    pub card_number: u32,
    pub recipient_name: Option<String>,
    /// `None` when the record has no status set.
    pub status: Option<CardStatus>,
    pub key: Option<String>,
    pub redemption_date: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
    pub qr_code_url: Option<String>,
}

impl Card {
    /// Only an explicit `Available` status is redeemable.
    pub fn is_available(&self) -> bool {
        matches!(self.status, Some(CardStatus::Available))
    }

    /// Case-insensitive comparison against the stored key.
    ///
    /// A card without a key never matches.
    pub fn key_matches(&self, submitted: &str) -> bool {
        self.key
            .as_deref()
            .is_some_and(|stored| stored.to_lowercase() == submitted.to_lowercase())
    }
}

/// A card record to be created by the batch generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCard {
    pub card_number: u32,
    pub recipient_name: String,
    pub qr_code_url: String,
    pub image_url: String,
}

impl NewCard {
    pub fn new(
        card_number: u32,
        recipient_name: Option<&str>,
        qr_code_url: String,
        image_url: String,
    ) -> Self {
        Self {
            card_number,
            recipient_name: recipient_or_default(recipient_name, card_number),
            qr_code_url,
            image_url,
        }
    }
}

/// Placeholder recipient for cards generated without a name.
pub fn recipient_or_default(name: Option<&str>, card_number: u32) -> String {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("Friend {}", card_number),
    }
}

/// Public projection of a card returned by the lookup endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CardView {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub id: CardId,
    pub card_number: u32,
    pub recipient_name: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub status: CardStatus,
    pub image_url: String,
}

impl From<&Card> for CardView {
    fn from(card: &Card) -> Self {
        Self {
            id: card.id.clone(),
            card_number: card.card_number,
            recipient_name: card
                .recipient_name
                .clone()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| UNKNOWN_RECIPIENT.to_string()),
            status: card.status.clone().unwrap_or(CardStatus::Available),
            image_url: card.image_url.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(status: Option<CardStatus>, key: Option<&str>) -> Card {
        Card {
            id: CardId::new("abc"),
            card_number: 7,
            recipient_name: None,
            status,
            key: key.map(str::to_string),
            redemption_date: None,
            image_url: None,
            qr_code_url: None,
        }
    }

    #[test]
    fn test_key_match_ignores_case() {
        let card = card(Some(CardStatus::Available), Some("abc123"));
        assert!(card.key_matches("ABC123"));
        assert!(card.key_matches("abc123"));
        assert!(!card.key_matches("abc12"));
        assert!(!card.key_matches(""));
    }

    #[test]
    fn test_missing_key_never_matches() {
        let card = card(Some(CardStatus::Available), None);
        assert!(!card.key_matches(""));
        assert!(!card.key_matches("anything"));
    }

    #[test]
    fn test_missing_status_is_not_available() {
        assert!(!card(None, Some("k")).is_available());
        assert!(!card(Some(CardStatus::Other("Lost".into())), Some("k")).is_available());
        assert!(card(Some(CardStatus::Available), Some("k")).is_available());
    }

    #[test]
    fn test_view_excludes_key_and_applies_fallbacks() {
        let view = CardView::from(&card(None, Some("Sunrise")));
        let json = serde_json::to_value(&view).unwrap();

        assert!(json.get("key").is_none());
        assert_eq!(json["id"], "abc");
        assert_eq!(json["cardNumber"], 7);
        assert_eq!(json["recipientName"], UNKNOWN_RECIPIENT);
        assert_eq!(json["status"], "Available");
        assert_eq!(json["imageUrl"], "");
    }

    #[test]
    fn test_status_round_trips_unknown_names() {
        let status: CardStatus = serde_json::from_str("\"On Hold\"").unwrap();
        assert_eq!(status, CardStatus::Other("On Hold".to_string()));
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"On Hold\"");
    }

    #[test]
    fn test_recipient_default() {
        assert_eq!(recipient_or_default(None, 4), "Friend 4");
        assert_eq!(recipient_or_default(Some("  "), 4), "Friend 4");
        assert_eq!(recipient_or_default(Some(" Jane Smith "), 4), "Jane Smith");
    }
}
