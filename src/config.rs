// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file is read first when present, for local development.

use std::env;
use std::path::PathBuf;

/// Default Notion REST endpoint.
pub const DEFAULT_NOTION_API_URL: &str = "https://api.notion.com/v1";

/// Notion card database credentials and client settings.
#[derive(Debug, Clone)]
pub struct NotionConfig {
    /// Integration token (secret)
    pub api_key: String,
    /// Database holding one page per card
    pub database_id: String,
    /// API base URL (overridable for tests)
    pub api_url: String,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl NotionConfig {
    /// Load Notion settings. The API key and database id are required.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            api_key: required("NOTION_API_KEY")?,
            database_id: required("NOTION_DATABASE_ID")?,
            api_url: env::var("NOTION_API_URL")
                .unwrap_or_else(|_| DEFAULT_NOTION_API_URL.to_string()),
            timeout_secs: parse_or("NOTION_TIMEOUT_SECS", 30)?,
        })
    }
}

/// Server configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub notion: NotionConfig,
    /// Public base URL of this site, used in redemption links
    pub site_base_url: String,
    /// Extra CORS origin allowed to call the JSON API
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Directory of uploaded card images served under `/cards`
    pub card_image_dir: Option<PathBuf>,
    /// Directory of static assets served under `/static`
    pub static_dir: PathBuf,
    /// How long `/health` reuses a store ping result
    pub health_cache_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let notion = NotionConfig::from_env()?;

        Ok(Self {
            notion,
            site_base_url: site_base_url_from_env(),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: parse_or("PORT", 8080)?,
            card_image_dir: env::var("CARD_IMAGE_DIR").ok().map(PathBuf::from),
            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("static")),
            health_cache_secs: parse_or("HEALTH_CACHE_SECS", 30)?,
        })
    }

    /// Config for tests, pointing at nothing real.
    pub fn test_default() -> Self {
        Self {
            notion: NotionConfig {
                api_key: "secret_test".to_string(),
                database_id: "00000000000000000000000000000000".to_string(),
                api_url: "http://127.0.0.1:9".to_string(),
                timeout_secs: 5,
            },
            site_base_url: "http://localhost:8080".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            card_image_dir: None,
            static_dir: PathBuf::from("static"),
            health_cache_secs: 30,
        }
    }
}

/// Site base URL when `SITE_BASE_URL` is unset.
pub const DEFAULT_SITE_BASE_URL: &str = "http://localhost:8080";

/// `SITE_BASE_URL`, defaulting to the local server.
pub fn site_base_url_from_env() -> String {
    dotenvy::dotenv().ok();
    env::var("SITE_BASE_URL").unwrap_or_else(|_| DEFAULT_SITE_BASE_URL.to_string())
}

/// Redemption page URL embedded in each card's QR code.
pub fn redemption_url(base_url: &str, card_number: u32) -> String {
    format!(
        "{}/redeem.html?card={}",
        base_url.trim_end_matches('/'),
        card_number
    )
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
