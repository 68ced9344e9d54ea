// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Favor cards: printable gift cards redeemed with a shared key
//!
//! This crate provides the redemption website (card lookup, key-checked
//! redemption, server-rendered pages) and the offline card batch generator.

pub mod config;
pub mod db;
pub mod error;
pub mod generator;
pub mod middleware;
pub mod models;
pub mod retry;
pub mod routes;
pub mod services;
pub mod time_utils;
pub mod ui;

use config::Config;
use db::CardStore;
use services::{LookupService, RedemptionService, StoreHealth};
use std::sync::Arc;
use std::time::Duration;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub health: StoreHealth,
    pub lookup: LookupService,
    pub redemption: RedemptionService,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn CardStore>) -> Self {
        Self {
            health: StoreHealth::new(
                store.clone(),
                Duration::from_secs(config.health_cache_secs),
            ),
            lookup: LookupService::new(store.clone()),
            redemption: RedemptionService::new(store),
            config,
        }
    }
}
