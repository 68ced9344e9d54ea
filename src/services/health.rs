// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cached card store reachability for the health endpoint.

use crate::db::CardStore;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Outcome of the last store ping: `Err` holds the public detail.
type PingOutcome = Result<(), String>;

/// Pings the store at most once per `ttl`. Concurrent callers wait on the
/// same ping instead of issuing their own.
pub struct StoreHealth {
    store: Arc<dyn CardStore>,
    ttl: Duration,
    last: Mutex<Option<(Instant, PingOutcome)>>,
}

impl StoreHealth {
    pub fn new(store: Arc<dyn CardStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            last: Mutex::new(None),
        }
    }

    pub fn backend_tag(&self) -> &'static str {
        self.store.backend_tag()
    }

    pub async fn check(&self) -> PingOutcome {
        let mut last = self.last.lock().await;

        if let Some((checked_at, outcome)) = last.as_ref() {
            if checked_at.elapsed() < self.ttl {
                return outcome.clone();
            }
        }

        let outcome = self.store.ping().await.map_err(|e| {
            tracing::warn!(error = %e, store = self.backend_tag(), "Health check: card store unreachable");
            e.public_detail()
        });
        *last = Some((Instant::now(), outcome.clone()));
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryStore;

    #[tokio::test]
    async fn test_outcome_is_cached_within_ttl() {
        let health = StoreHealth::new(Arc::new(InMemoryStore::offline()), Duration::from_secs(60));

        assert_eq!(
            health.check().await,
            Err("card store not connected".to_string())
        );
        assert!(health.check().await.is_err());
    }

    #[tokio::test]
    async fn test_zero_ttl_pings_every_time() {
        let health = StoreHealth::new(Arc::new(InMemoryStore::new()), Duration::ZERO);
        assert_eq!(health.check().await, Ok(()));
        assert_eq!(health.check().await, Ok(()));
    }
}
