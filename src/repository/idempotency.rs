//! Idempotency-key result cache
//!
//! Keyed by (operation, key). Each entry remembers the target it was produced
//! for; a hit on the same target replays the stored result instead of applying
//! the transition again, a hit on another target is a conflict. Entries expire
//! after a configured TTL.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdempotentOperation {
    Checkout,
    Checkin,
}

#[derive(Debug, Clone)]
struct CachedResult {
    stored_at: DateTime<Utc>,
    target: String,
    payload: serde_json::Value,
}

#[derive(Clone)]
pub struct IdempotencyRepository {
    entries: Arc<DashMap<(IdempotentOperation, String), CachedResult>>,
    ttl: Duration,
}

impl IdempotencyRepository {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Previously stored result for this key and target, if still live.
    ///
    /// A live entry produced for a different target fails with `Conflict`.
    pub fn get<T: DeserializeOwned>(
        &self,
        operation: IdempotentOperation,
        key: &str,
        target: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<T>> {
        let map_key = (operation, key.to_string());
        let cached = self.entries.get(&map_key).map(|e| e.value().clone());

        match cached {
            None => Ok(None),
            Some(entry) if now - entry.stored_at > self.ttl => {
                self.entries
                    .remove_if(&map_key, |_, e| e.stored_at == entry.stored_at);
                Ok(None)
            }
            Some(entry) if entry.target != target => Err(AppError::Conflict(format!(
                "Idempotency key {} was already used for another request",
                key
            ))),
            Some(entry) => serde_json::from_value(entry.payload).map(Some).map_err(|e| {
                AppError::Storage(format!("Unreadable idempotency entry {}: {}", key, e))
            }),
        }
    }

    /// Remember the result produced for this key
    pub fn put<T: Serialize>(
        &self,
        operation: IdempotentOperation,
        key: &str,
        target: &str,
        value: &T,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let payload = serde_json::to_value(value)?;
        self.entries.insert(
            (operation, key.to_string()),
            CachedResult {
                stored_at: now,
                target: target.to_string(),
                payload,
            },
        );
        Ok(())
    }

    /// Drop expired entries, returning how many were removed
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, e| now - e.stored_at <= ttl);
        before - self.entries.len()
    }
}
