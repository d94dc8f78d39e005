//! Append-only event storage, one timeline per asset

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use dashmap::DashMap;
use uuid::Uuid;

use crate::models::ledger::LedgerEvent;

#[derive(Clone)]
pub struct LedgerRepository {
    timelines: Arc<DashMap<Uuid, Vec<LedgerEvent>>>,
    sequence: Arc<AtomicU64>,
}

impl LedgerRepository {
    pub fn new() -> Self {
        Self {
            timelines: Arc::new(DashMap::new()),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Append an event and return it as stored.
    ///
    /// Timestamps on one timeline never decrease: an event stamped before its
    /// predecessor takes the predecessor's timestamp and sorts after it by sequence.
    pub fn append(&self, mut event: LedgerEvent) -> LedgerEvent {
        let mut timeline = self.timelines.entry(event.asset_id).or_default();
        if let Some(last) = timeline.last() {
            if event.timestamp < last.timestamp {
                event.timestamp = last.timestamp;
            }
        }
        event.sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        timeline.push(event.clone());
        event
    }

    /// Events of one asset in commit order (oldest first)
    pub fn for_asset(&self, asset_id: Uuid) -> Vec<LedgerEvent> {
        self.timelines
            .get(&asset_id)
            .map(|t| t.value().clone())
            .unwrap_or_default()
    }

    /// Events of every asset matching `predicate`, in no particular order
    pub fn scan<F>(&self, predicate: F) -> Vec<LedgerEvent>
    where
        F: Fn(&LedgerEvent) -> bool,
    {
        self.timelines
            .iter()
            .flat_map(|t| {
                t.value()
                    .iter()
                    .filter(|e| predicate(e))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.timelines.iter().map(|t| t.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for LedgerRepository {
    fn default() -> Self {
        Self::new()
    }
}
