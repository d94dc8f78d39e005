//! Maintenance workflow
//!
//! Scheduling pulls an AVAILABLE asset off the shelf; completing the active
//! record puts it back. Damaged returns open records through the checkout engine.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::{
        checkout::Checkin,
        enums::{AssetStatus, EventType, MaintenancePriority, MaintenanceStatus, ReturnCondition},
        ledger::{EventDetails, LedgerEvent},
        maintenance::{CompleteMaintenance, MaintenanceRecord, ScheduleMaintenance},
    },
    repository::Repository,
};

use super::ledger::HistoryLedger;

/// Record opened when a returned asset needs attention
pub(crate) fn record_for_damaged_return(
    checkin: &Checkin,
    actor: &str,
    now: DateTime<Utc>,
) -> MaintenanceRecord {
    let priority = if checkin.return_condition == ReturnCondition::NeedsRepair {
        MaintenancePriority::High
    } else {
        MaintenancePriority::Medium
    };
    let description = checkin
        .damage_description
        .clone()
        .or_else(|| Some(format!("Returned in condition {}", checkin.return_condition)));

    MaintenanceRecord {
        id: Uuid::new_v4(),
        asset_id: checkin.asset_id,
        issue_type: "damage".to_string(),
        priority,
        status: MaintenanceStatus::Scheduled,
        description,
        scheduled_at: now,
        expected_completion: None,
        estimated_cost: None,
        total_cost: None,
        work_performed: Vec::new(),
        parts_replaced: Vec::new(),
        source_checkout_id: Some(checkin.checkout_id),
        scheduled_by: actor.to_string(),
        completed_at: None,
        completed_by: None,
    }
}

#[derive(Clone)]
pub struct MaintenanceService {
    repository: Repository,
    ledger: HistoryLedger,
    clock: Arc<dyn Clock>,
}

impl MaintenanceService {
    pub fn new(repository: Repository, ledger: HistoryLedger, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            ledger,
            clock,
        }
    }

    pub fn get(&self, id: Uuid) -> AppResult<MaintenanceRecord> {
        self.repository.maintenance.get(id)
    }

    /// Maintenance history of an asset, newest first
    pub fn list_for_asset(&self, asset_id: Uuid) -> AppResult<Vec<MaintenanceRecord>> {
        if !self.repository.assets.contains(asset_id) {
            return Err(AppError::NotFound(format!("Asset {} not found", asset_id)));
        }
        Ok(self.repository.maintenance.for_asset(asset_id))
    }

    /// Put an AVAILABLE asset into maintenance
    pub async fn schedule(
        &self,
        asset_id: Uuid,
        request: ScheduleMaintenance,
        actor: &str,
    ) -> AppResult<MaintenanceRecord> {
        request.validate()?;
        let mut asset = self.repository.assets.lock(asset_id).await?;
        let now = self.clock.now();

        if asset.status != AssetStatus::Available {
            return Err(AppError::InvalidTransition(format!(
                "Asset {} is {}, only available assets can enter maintenance",
                asset_id, asset.status
            )));
        }
        if let Some(expected) = request.expected_completion {
            if expected <= now {
                return Err(AppError::InvalidRequest(
                    "expected_completion must be in the future".to_string(),
                ));
            }
        }

        let record = MaintenanceRecord {
            id: Uuid::new_v4(),
            asset_id,
            issue_type: request.issue_type,
            priority: request.priority,
            status: MaintenanceStatus::Scheduled,
            description: request.description,
            scheduled_at: now,
            expected_completion: request.expected_completion,
            estimated_cost: request.estimated_cost,
            total_cost: None,
            work_performed: Vec::new(),
            parts_replaced: Vec::new(),
            source_checkout_id: None,
            scheduled_by: actor.to_string(),
            completed_at: None,
            completed_by: None,
        };

        asset.set_status(AssetStatus::Maintenance, None, now)?;
        asset.active_maintenance_id = Some(record.id);
        self.repository.maintenance.save(record.clone());
        self.ledger.append(LedgerEvent::new(
            asset_id,
            EventType::MaintenanceScheduled,
            actor,
            now,
            EventDetails::Maintenance(record.clone()),
        ));
        drop(asset);

        tracing::info!(
            asset_id = %asset_id,
            maintenance_id = %record.id,
            priority = ?record.priority,
            "Maintenance scheduled"
        );
        Ok(record)
    }

    /// Close a maintenance record. The asset returns to AVAILABLE when this
    /// record was the one holding it.
    pub async fn complete(
        &self,
        maintenance_id: Uuid,
        request: CompleteMaintenance,
        actor: &str,
    ) -> AppResult<MaintenanceRecord> {
        let asset_id = self.repository.maintenance.get(maintenance_id)?.asset_id;
        let mut asset = self.repository.assets.lock(asset_id).await?;
        let now = self.clock.now();

        let mut record = self.repository.maintenance.get(maintenance_id)?;
        if !record.is_open() {
            return Err(AppError::InvalidTransition(format!(
                "Maintenance {} is already completed",
                maintenance_id
            )));
        }

        record.status = MaintenanceStatus::Completed;
        record.completed_at = Some(now);
        record.completed_by = Some(actor.to_string());
        record.work_performed = request.work_performed;
        record.parts_replaced = request.parts_replaced;
        record.total_cost = request.total_cost;

        let releases_asset = asset.status == AssetStatus::Maintenance
            && asset.active_maintenance_id == Some(maintenance_id);
        if releases_asset {
            asset.set_status(AssetStatus::Available, None, now)?;
        }
        if asset.active_maintenance_id == Some(maintenance_id) {
            asset.active_maintenance_id = None;
        }

        self.repository.maintenance.save(record.clone());
        self.ledger.append(LedgerEvent::new(
            asset_id,
            EventType::MaintenanceCompleted,
            actor,
            now,
            EventDetails::Maintenance(record.clone()),
        ));
        drop(asset);

        tracing::info!(
            asset_id = %asset_id,
            maintenance_id = %maintenance_id,
            releases_asset,
            "Maintenance completed"
        );
        Ok(record)
    }
}
