// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! View-model for the redemption page.
//!
//! The page moves through explicit phases:
//!
//! ```text
//! Loading ─▶ AwaitingKey ─▶ Verifying ─▶ Redeemed
//!    │            ▲             │
//!    │            └── error ────┘
//!    ├─▶ Redeemed (already redeemed, no celebration)
//!    ├─▶ NotFound
//!    └─▶ LoadFailed
//! ```

use crate::error::AppError;
use crate::models::{CardStatus, CardView};
use crate::services::Redemption;
use chrono::{DateTime, Utc};

pub const EMPTY_KEY: &str = "Please enter your key.";
pub const REDEEM_FALLBACK: &str = "Failed to redeem. Invalid key or card already redeemed.";
pub const LOAD_FAILED: &str = "Error loading card details. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub enum RedeemPhase {
    Loading,
    AwaitingKey { error: Option<String> },
    Verifying,
    /// `celebrate` is set only when the redemption happened in this flow.
    Redeemed { celebrate: bool },
    NotFound,
    LoadFailed { message: String },
}

/// State of one redemption page.
#[derive(Debug, Clone, PartialEq)]
pub struct RedeemPage {
    pub card: Option<CardView>,
    pub phase: RedeemPhase,
    /// Set when the redemption happened in this flow.
    pub redeemed_at: Option<DateTime<Utc>>,
}

impl RedeemPage {
    pub fn loading() -> Self {
        Self {
            card: None,
            phase: RedeemPhase::Loading,
            redeemed_at: None,
        }
    }

    /// Apply the result of the initial card lookup.
    pub fn on_lookup(self, result: Result<CardView, AppError>) -> Self {
        if self.phase != RedeemPhase::Loading {
            return self;
        }

        match result {
            Ok(card) => {
                let phase = match card.status {
                    CardStatus::Redeemed => RedeemPhase::Redeemed { celebrate: false },
                    _ => RedeemPhase::AwaitingKey { error: None },
                };
                Self {
                    card: Some(card),
                    phase,
                    redeemed_at: None,
                }
            }
            Err(AppError::NotFound(_)) => Self {
                card: None,
                phase: RedeemPhase::NotFound,
                redeemed_at: None,
            },
            Err(_) => Self {
                card: None,
                phase: RedeemPhase::LoadFailed {
                    message: LOAD_FAILED.to_string(),
                },
                redeemed_at: None,
            },
        }
    }

    /// Handle a key submission.
    ///
    /// Returns the trimmed key when the page moved to `Verifying` and the
    /// redemption call should be made. A blank key stays in `AwaitingKey`
    /// with an error and returns `None`.
    pub fn submit(&mut self, key: &str) -> Option<String> {
        if !matches!(self.phase, RedeemPhase::AwaitingKey { .. }) {
            return None;
        }

        let key = key.trim();
        if key.is_empty() {
            self.phase = RedeemPhase::AwaitingKey {
                error: Some(EMPTY_KEY.to_string()),
            };
            return None;
        }

        self.phase = RedeemPhase::Verifying;
        Some(key.to_string())
    }

    /// Apply the result of the redemption call.
    pub fn on_redeem(mut self, result: Result<Redemption, AppError>) -> Self {
        if self.phase != RedeemPhase::Verifying {
            return self;
        }

        match result {
            Ok(redemption) => {
                if let Some(card) = self.card.as_mut() {
                    card.status = CardStatus::Redeemed;
                }
                self.redeemed_at = Some(redemption.redeemed_at);
                self.phase = RedeemPhase::Redeemed { celebrate: true };
            }
            Err(err) => {
                let message = err.public_message();
                let message = if message.is_empty() {
                    REDEEM_FALLBACK.to_string()
                } else {
                    message
                };
                self.phase = RedeemPhase::AwaitingKey {
                    error: Some(message),
                };
            }
        }
        self
    }

    // ─── Rendering Helpers ───────────────────────────────────────

    pub fn show_form(&self) -> bool {
        matches!(
            self.phase,
            RedeemPhase::AwaitingKey { .. } | RedeemPhase::Verifying
        )
    }

    pub fn action_disabled(&self) -> bool {
        !matches!(self.phase, RedeemPhase::AwaitingKey { .. })
    }

    pub fn action_label(&self) -> &'static str {
        match self.phase {
            RedeemPhase::Verifying => "Verifying...",
            _ => "Verify & Redeem",
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.phase {
            RedeemPhase::AwaitingKey { error } => error.as_deref(),
            RedeemPhase::LoadFailed { message } => Some(message),
            _ => None,
        }
    }

    pub fn is_redeemed(&self) -> bool {
        matches!(self.phase, RedeemPhase::Redeemed { .. })
    }

    pub fn celebrate(&self) -> bool {
        matches!(self.phase, RedeemPhase::Redeemed { celebrate: true })
    }

    /// Redemption time for display, e.g. "February 14, 2026 at 09:30 UTC".
    pub fn redeemed_at_label(&self) -> Option<String> {
        self.redeemed_at
            .map(|at| at.format("%B %-d, %Y at %H:%M UTC").to_string())
    }
}
