//! Business logic services

pub mod availability;
pub mod checkout;
pub mod ledger;
pub mod maintenance;
pub mod notifications;
pub mod registry;
pub mod stats;

use std::sync::Arc;

use chrono::Duration;

use crate::{clock::Clock, config::AppConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub registry: registry::AssetRegistry,
    pub checkout: checkout::CheckoutEngine,
    pub ledger: ledger::HistoryLedger,
    pub maintenance: maintenance::MaintenanceService,
    pub availability: availability::AvailabilityIndex,
    pub stats: stats::StatsAggregator,
    pub notifications: notifications::NotificationSender,
    pub clock: Arc<dyn Clock>,
}

impl Services {
    /// Wire every service onto one repository and clock
    pub fn new(
        repository: Repository,
        config: &AppConfig,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn notifications::Notifier>,
    ) -> Self {
        let ledger = ledger::HistoryLedger::new(repository.clone());
        let notifications = notifications::NotificationSender::new(notifier);

        Self {
            registry: registry::AssetRegistry::new(repository.clone(), ledger.clone(), clock.clone()),
            checkout: checkout::CheckoutEngine::new(
                repository.clone(),
                ledger.clone(),
                notifications.clone(),
                clock.clone(),
                &config.checkout,
            ),
            maintenance: maintenance::MaintenanceService::new(
                repository.clone(),
                ledger.clone(),
                clock.clone(),
            ),
            availability: availability::AvailabilityIndex::new(repository.clone(), clock.clone()),
            stats: stats::StatsAggregator::new(repository, ledger.clone(), clock.clone()),
            ledger,
            notifications,
            clock,
        }
    }

    /// Services over fresh in-process storage sized from the configuration
    pub fn in_memory(
        config: &AppConfig,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn notifications::Notifier>,
    ) -> Self {
        let ttl = Duration::seconds(config.checkout.idempotency_ttl_seconds);
        Self::new(Repository::new(ttl), config, clock, notifier)
    }
}
