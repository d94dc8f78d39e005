//! Repository layer: in-process storage satisfying the engine's atomicity needs
//!
//! Assets live behind per-asset locks; everything else is a concurrent map.
//! Callers that change an asset hold its lock while writing the related
//! checkout, maintenance and ledger rows, and never await in between.

pub mod assets;
pub mod checkouts;
pub mod idempotency;
pub mod ledger;
pub mod maintenance;

use chrono::Duration;

/// Main repository struct holding every store
#[derive(Clone)]
pub struct Repository {
    pub assets: assets::AssetsRepository,
    pub checkouts: checkouts::CheckoutsRepository,
    pub ledger: ledger::LedgerRepository,
    pub maintenance: maintenance::MaintenanceRepository,
    pub idempotency: idempotency::IdempotencyRepository,
}

impl Repository {
    /// Create empty stores; idempotency entries expire after `idempotency_ttl`
    pub fn new(idempotency_ttl: Duration) -> Self {
        Self {
            assets: assets::AssetsRepository::new(),
            checkouts: checkouts::CheckoutsRepository::new(),
            ledger: ledger::LedgerRepository::new(),
            maintenance: maintenance::MaintenanceRepository::new(),
            idempotency: idempotency::IdempotencyRepository::new(idempotency_ttl),
        }
    }
}
