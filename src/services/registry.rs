//! Asset registry: onboarding, lookup and the status changes outside checkout

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::{
        asset::{Asset, AssetQuery, CreateAsset},
        enums::{AssetStatus, EventType},
        ledger::{EventDetails, LedgerEvent, StatusChange},
    },
    repository::Repository,
};

use super::ledger::HistoryLedger;

#[derive(Clone)]
pub struct AssetRegistry {
    repository: Repository,
    ledger: HistoryLedger,
    clock: Arc<dyn Clock>,
}

impl AssetRegistry {
    pub fn new(repository: Repository, ledger: HistoryLedger, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            ledger,
            clock,
        }
    }

    /// Onboard a new asset (status AVAILABLE) and record its `created` event
    pub async fn create(&self, data: CreateAsset, actor: &str) -> AppResult<Asset> {
        data.validate()?;
        let now = self.clock.now();
        let asset = Asset::new(data, now);

        if let Some(ref serial) = asset.serial_number {
            self.repository.assets.reserve_serial(serial, asset.id)?;
        }

        // The asset is not reachable until inserted, so `created` is always first
        self.ledger.append(LedgerEvent::new(
            asset.id,
            EventType::Created,
            actor,
            now,
            EventDetails::Asset(asset.clone()),
        ));
        self.repository.assets.insert(asset.clone());

        tracing::info!(asset_id = %asset.id, category = %asset.category, "Asset onboarded");
        Ok(asset)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Asset> {
        self.repository.assets.get(id).await
    }

    /// List assets, sorted by category then model
    pub async fn list(&self, query: &AssetQuery) -> Vec<Asset> {
        let mut assets: Vec<Asset> = self
            .repository
            .assets
            .list()
            .await
            .into_iter()
            .filter(|a| query.category.as_ref().map_or(true, |c| &a.category == c))
            .filter(|a| query.status.map_or(true, |s| a.status == s))
            .collect();
        assets.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| a.model.cmp(&b.model))
                .then_with(|| a.id.cmp(&b.id))
        });
        assets
    }

    /// Retire an asset. Irreversible; a checked out asset must be returned first.
    pub async fn retire(&self, id: Uuid, reason: Option<String>, actor: &str) -> AppResult<Asset> {
        self.change_status(
            id,
            &[AssetStatus::Available, AssetStatus::Maintenance, AssetStatus::Missing],
            AssetStatus::Retired,
            EventType::Retired,
            reason,
            actor,
        )
        .await
    }

    /// Flag an asset on the shelf or in maintenance as missing
    pub async fn report_missing(
        &self,
        id: Uuid,
        reason: Option<String>,
        actor: &str,
    ) -> AppResult<Asset> {
        self.change_status(
            id,
            &[AssetStatus::Available, AssetStatus::Maintenance],
            AssetStatus::Missing,
            EventType::StatusChanged,
            reason,
            actor,
        )
        .await
    }

    /// Put a missing asset back on the shelf
    pub async fn recover(&self, id: Uuid, reason: Option<String>, actor: &str) -> AppResult<Asset> {
        self.change_status(
            id,
            &[AssetStatus::Missing],
            AssetStatus::Available,
            EventType::StatusChanged,
            reason,
            actor,
        )
        .await
    }

    /// Holder-free status change under the asset lock, recorded in the ledger
    async fn change_status(
        &self,
        id: Uuid,
        allowed_from: &[AssetStatus],
        to: AssetStatus,
        event_type: EventType,
        reason: Option<String>,
        actor: &str,
    ) -> AppResult<Asset> {
        let mut asset = self.repository.assets.lock(id).await?;
        let from = asset.status;

        if !allowed_from.contains(&from) {
            tracing::debug!(asset_id = %id, %from, %to, "Status change rejected");
            return Err(AppError::InvalidTransition(format!(
                "Asset {} cannot go from {} to {}",
                id, from, to
            )));
        }

        let now = self.clock.now();
        asset.set_status(to, None, now)?;
        if to == AssetStatus::Available {
            asset.active_maintenance_id = None;
        }
        self.ledger.append(LedgerEvent::new(
            id,
            event_type,
            actor,
            now,
            EventDetails::StatusChange(StatusChange { from, to, reason }),
        ));

        tracing::info!(asset_id = %id, %from, %to, "Asset status changed");
        Ok(asset.clone())
    }
}
