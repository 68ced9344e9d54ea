// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory card store for tests and offline runs.

use crate::db::{CardStore, StoreError};
use crate::models::{Card, CardId, CardStatus, NewCard};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Card store backed by a concurrent map.
///
/// Mirrors the hosted store's semantics: updates are unconditional and the
/// last write wins.
pub struct InMemoryStore {
    cards: Option<DashMap<CardId, Card>>,
    next_id: AtomicU64,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            cards: Some(DashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// A store where every operation fails as if the backend were down.
    pub fn offline() -> Self {
        Self {
            cards: None,
            next_id: AtomicU64::new(1),
        }
    }

    fn cards(&self) -> Result<&DashMap<CardId, Card>, StoreError> {
        self.cards.as_ref().ok_or(StoreError::NotConnected)
    }

    fn allocate_id(&self) -> CardId {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        CardId::new(format!("{:032x}", n))
    }

    /// Insert a card with a fresh id, as an administrator would in the store.
    pub fn seed(&self, card_number: u32, status: CardStatus, key: Option<&str>) -> CardId {
        let id = self.allocate_id();
        let card = Card {
            id: id.clone(),
            card_number,
            recipient_name: Some(format!("Friend {}", card_number)),
            status: Some(status),
            key: key.map(str::to_string),
            redemption_date: None,
            image_url: Some(format!("https://example.com/card-{}.png", card_number)),
            qr_code_url: None,
        };
        self.insert(card);
        id
    }

    /// Insert or replace a full card record.
    pub fn insert(&self, card: Card) {
        if let Some(cards) = &self.cards {
            cards.insert(card.id.clone(), card);
        }
    }

    /// Current state of a card, for assertions.
    pub fn snapshot(&self, id: &CardId) -> Option<Card> {
        self.cards
            .as_ref()
            .and_then(|cards| cards.get(id).map(|c| c.value().clone()))
    }

    pub fn len(&self) -> usize {
        self.cards.as_ref().map_or(0, |cards| cards.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CardStore for InMemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn find_by_number(&self, card_number: u32) -> Result<Option<Card>, StoreError> {
        let cards = self.cards()?;
        // Lowest id first, so duplicates resolve the same way every time.
        let found = cards
            .iter()
            .filter(|entry| entry.card_number == card_number)
            .map(|entry| entry.value().clone())
            .min_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        Ok(found)
    }

    async fn get(&self, id: &CardId) -> Result<Option<Card>, StoreError> {
        Ok(self.cards()?.get(id).map(|c| c.value().clone()))
    }

    async fn mark_redeemed(&self, id: &CardId, at: DateTime<Utc>) -> Result<(), StoreError> {
        let cards = self.cards()?;
        let mut card = cards.get_mut(id).ok_or_else(|| StoreError::Api {
            status: 404,
            code: StoreError::OBJECT_NOT_FOUND.to_string(),
            message: format!("Could not find page with ID: {}", id),
        })?;
        card.status = Some(CardStatus::Redeemed);
        card.redemption_date = Some(at);
        Ok(())
    }

    async fn create(&self, new_card: &NewCard) -> Result<CardId, StoreError> {
        let cards = self.cards()?;
        let id = self.allocate_id();
        cards.insert(
            id.clone(),
            Card {
                id: id.clone(),
                card_number: new_card.card_number,
                recipient_name: Some(new_card.recipient_name.clone()),
                status: Some(CardStatus::Available),
                key: None,
                redemption_date: None,
                image_url: Some(new_card.image_url.clone()),
                qr_code_url: Some(new_card.qr_code_url.clone()),
            },
        );
        Ok(id)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.cards().map(|_| ())
    }
}
