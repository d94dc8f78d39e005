//! History ledger: append-only lifecycle timeline and its queries

use crate::{
    error::{AppError, AppResult},
    models::ledger::{LedgerEvent, LedgerFilter, LedgerPage},
    repository::Repository,
};
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const MAX_PAGE_SIZE: usize = 500;

#[derive(Clone)]
pub struct HistoryLedger {
    repository: Repository,
}

impl HistoryLedger {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Append an event. Callers changing an asset hold its lock while appending,
    /// so append order per asset matches commit order.
    pub fn append(&self, event: LedgerEvent) -> LedgerEvent {
        let stored = self.repository.ledger.append(event);
        tracing::debug!(
            asset_id = %stored.asset_id,
            sequence = stored.sequence,
            event_type = %stored.event_type,
            "Ledger event appended"
        );
        stored
    }

    /// Events of one asset, newest first
    pub fn query(
        &self,
        asset_id: Uuid,
        limit: Option<usize>,
        filter: &LedgerFilter,
    ) -> AppResult<LedgerPage> {
        if !self.repository.assets.contains(asset_id) {
            return Err(AppError::NotFound(format!("Asset {} not found", asset_id)));
        }

        let events = self
            .repository
            .ledger
            .for_asset(asset_id)
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect();
        Ok(paginate(events, limit))
    }

    /// Events the user acted on or that record one of their checkouts, newest first
    pub fn query_by_user(
        &self,
        user_id: &str,
        limit: Option<usize>,
        filter: &LedgerFilter,
    ) -> LedgerPage {
        let events = self
            .repository
            .ledger
            .scan(|e| e.involves_user(user_id) && filter.matches(e));
        paginate(events, limit)
    }

    /// Full timeline of one asset, oldest first
    pub fn timeline(&self, asset_id: Uuid) -> Vec<LedgerEvent> {
        self.repository.ledger.for_asset(asset_id)
    }

    /// Every event matching `predicate`, oldest first
    pub fn scan<F>(&self, predicate: F) -> Vec<LedgerEvent>
    where
        F: Fn(&LedgerEvent) -> bool,
    {
        let mut events = self.repository.ledger.scan(predicate);
        events.sort_by_key(|e| e.position());
        events
    }
}

/// Order newest first and cut one page, remembering where it stopped
fn paginate(mut events: Vec<LedgerEvent>, limit: Option<usize>) -> LedgerPage {
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    events.sort_by(|a, b| b.position().cmp(&a.position()));

    let has_more = events.len() > limit;
    events.truncate(limit);
    let next_cursor = if has_more {
        events.last().map(|e| e.position().encode())
    } else {
        None
    };

    LedgerPage {
        events,
        next_cursor,
    }
}
