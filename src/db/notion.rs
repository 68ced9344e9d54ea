// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Notion REST client backing the card store.
//!
//! Each card is a page in a Notion database. Handles:
//! - Lookup by `Card Number` (database query)
//! - Page retrieval by id
//! - Status/date update on redemption
//! - Page creation for the batch generator

use crate::config::NotionConfig;
use crate::db::{properties, CardStore, StoreError};
use crate::models::{Card, CardId, CardStatus, NewCard};
use crate::time_utils::{format_utc_rfc3339, parse_utc_rfc3339};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

/// API version pinned in the `Notion-Version` header.
const NOTION_VERSION: &str = "2022-06-28";

/// Notion-backed card store.
#[derive(Clone)]
pub struct NotionStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    database_id: String,
}

impl NotionStore {
    /// Create a new Notion client from configuration.
    pub fn new(config: &NotionConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::Network(format!("Failed to build HTTP client: {}", e)))?;

        tracing::info!(
            database_id = %config.database_id,
            base_url = %config.api_url,
            "Notion card store configured"
        );

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            database_id: config.database_id.clone(),
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .header("Notion-Version", NOTION_VERSION)
    }

    /// Send a request and parse the JSON body, classifying failures.
    async fn send_json<T: for<'de> Deserialize<'de>>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, StoreError> {
        let response = builder.send().await.map_err(classify_transport_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let parsed: Option<NotionErrorBody> = serde_json::from_str(&body).ok();
            let (code, message) = match parsed {
                Some(err) => (err.code, err.message),
                None => ("unknown".to_string(), body),
            };

            if status == 429 {
                tracing::warn!("Notion rate limit hit (429)");
            }

            return Err(StoreError::Api {
                status,
                code,
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::Decode(format!("JSON parse error: {}", e)))
    }
}

#[async_trait]
impl CardStore for NotionStore {
    fn backend_tag(&self) -> &'static str {
        "notion"
    }

    async fn find_by_number(&self, card_number: u32) -> Result<Option<Card>, StoreError> {
        let body = json!({
            "filter": {
                "property": properties::CARD_NUMBER,
                "number": { "equals": card_number },
            },
        });

        let result: QueryResponse = self
            .send_json(
                self.request(
                    reqwest::Method::POST,
                    &format!("/databases/{}/query", self.database_id),
                )
                .json(&body),
            )
            .await?;

        if result.results.len() > 1 {
            tracing::warn!(
                card_number,
                matches = result.results.len(),
                "Duplicate card number in database, using first match"
            );
        }

        Ok(result
            .results
            .first()
            .map(|page| card_from_page(page, Some(card_number))))
    }

    async fn get(&self, id: &CardId) -> Result<Option<Card>, StoreError> {
        // Ids are interpolated into the request path.
        if !is_page_id(id.as_str()) {
            tracing::debug!(card_id = %id, "Rejecting malformed page id");
            return Ok(None);
        }

        let result: Result<NotionPage, StoreError> = self
            .send_json(self.request(reqwest::Method::GET, &format!("/pages/{}", id)))
            .await;

        match result {
            Ok(page) if page.archived => Ok(None),
            Ok(page) => Ok(Some(card_from_page(&page, None))),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn mark_redeemed(&self, id: &CardId, at: DateTime<Utc>) -> Result<(), StoreError> {
        if !is_page_id(id.as_str()) {
            return Err(StoreError::Api {
                status: 404,
                code: StoreError::OBJECT_NOT_FOUND.to_string(),
                message: "Malformed page id".to_string(),
            });
        }

        let body = json!({
            "properties": {
                (properties::STATUS): { "select": { "name": CardStatus::Redeemed.as_str() } },
                (properties::REDEMPTION_DATE): { "date": { "start": format_utc_rfc3339(at) } },
            },
        });

        let _: NotionPage = self
            .send_json(
                self.request(reqwest::Method::PATCH, &format!("/pages/{}", id))
                    .json(&body),
            )
            .await?;
        Ok(())
    }

    async fn create(&self, card: &NewCard) -> Result<CardId, StoreError> {
        let body = json!({
            "parent": { "database_id": self.database_id },
            "properties": {
                (properties::CARD_NUMBER): { "number": card.card_number },
                (properties::RECIPIENT_NAME): {
                    "rich_text": [{ "text": { "content": card.recipient_name } }],
                },
                (properties::STATUS): { "select": { "name": CardStatus::Available.as_str() } },
                (properties::QR_CODE_URL): { "url": card.qr_code_url },
                (properties::CARD_IMAGE_URL): { "url": card.image_url },
            },
        });

        let page: NotionPage = self
            .send_json(self.request(reqwest::Method::POST, "/pages").json(&body))
            .await?;
        Ok(CardId::new(page.id))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let _: serde_json::Value = self
            .send_json(self.request(
                reqwest::Method::GET,
                &format!("/databases/{}", self.database_id),
            ))
            .await?;
        Ok(())
    }
}

fn classify_transport_error(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Timeout
    } else {
        StoreError::Network(e.to_string())
    }
}

/// Notion page ids are UUIDs, with or without dashes.
fn is_page_id(id: &str) -> bool {
    let hex_digits = id.chars().filter(|c| c.is_ascii_hexdigit()).count();
    hex_digits == 32 && id.chars().all(|c| c.is_ascii_hexdigit() || c == '-')
}

// ─── Wire Types ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct NotionErrorBody {
    code: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    results: Vec<NotionPage>,
}

#[derive(Debug, Deserialize)]
struct NotionPage {
    id: String,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    properties: HashMap<String, PropertyValue>,
}

/// One page property. Only the field matching the property type is set.
#[derive(Debug, Default, Deserialize)]
struct PropertyValue {
    number: Option<f64>,
    rich_text: Option<Vec<RichText>>,
    title: Option<Vec<RichText>>,
    select: Option<SelectOption>,
    date: Option<DateValue>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RichText {
    plain_text: Option<String>,
    text: Option<TextContent>,
}

impl RichText {
    fn content(&self) -> Option<&str> {
        self.text
            .as_ref()
            .map(|t| t.content.as_str())
            .or(self.plain_text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct TextContent {
    content: String,
}

#[derive(Debug, Deserialize)]
struct SelectOption {
    name: String,
}

#[derive(Debug, Deserialize)]
struct DateValue {
    start: String,
}

fn first_text(items: Option<&Vec<RichText>>) -> Option<String> {
    items
        .and_then(|items| items.first())
        .and_then(RichText::content)
        .map(str::to_string)
}

/// Map a Notion page onto a card record.
///
/// `queried_number` fills in the card number when the property is unreadable
/// on a page returned by a number query.
fn card_from_page(page: &NotionPage, queried_number: Option<u32>) -> Card {
    let prop = |name: &str| page.properties.get(name);

    let card_number = prop(properties::CARD_NUMBER)
        .and_then(|p| p.number)
        .filter(|n| *n >= 1.0 && n.fract() == 0.0 && *n <= u32::MAX as f64)
        .map(|n| n as u32)
        .or(queried_number)
        .unwrap_or_default();

    let recipient_name = prop(properties::RECIPIENT_NAME).and_then(|p| {
        first_text(p.rich_text.as_ref()).or_else(|| first_text(p.title.as_ref()))
    });

    let status = prop(properties::STATUS)
        .and_then(|p| p.select.as_ref())
        .map(|s| CardStatus::from_name(&s.name));

    let key = prop(properties::KEY).and_then(|p| first_text(p.rich_text.as_ref()));

    let redemption_date = prop(properties::REDEMPTION_DATE)
        .and_then(|p| p.date.as_ref())
        .and_then(|d| parse_utc_rfc3339(&d.start));

    Card {
        id: CardId::new(page.id.clone()),
        card_number,
        recipient_name,
        status,
        key,
        redemption_date,
        image_url: prop(properties::CARD_IMAGE_URL).and_then(|p| p.url.clone()),
        qr_code_url: prop(properties::QR_CODE_URL).and_then(|p| p.url.clone()),
    }
}
