//! Maintenance records

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::maintenance::MaintenanceRecord,
};

#[derive(Clone)]
pub struct MaintenanceRepository {
    records: Arc<DashMap<Uuid, MaintenanceRecord>>,
}

impl MaintenanceRepository {
    pub fn new() -> Self {
        Self {
            records: Arc::new(DashMap::new()),
        }
    }

    pub fn get(&self, id: Uuid) -> AppResult<MaintenanceRecord> {
        self.records
            .get(&id)
            .map(|r| r.value().clone())
            .ok_or_else(|| AppError::NotFound(format!("Maintenance record {} not found", id)))
    }

    /// Insert or replace a record
    pub fn save(&self, record: MaintenanceRecord) {
        self.records.insert(record.id, record);
    }

    /// Records of one asset, most recent first
    pub fn for_asset(&self, asset_id: Uuid) -> Vec<MaintenanceRecord> {
        let mut records: Vec<MaintenanceRecord> = self
            .records
            .iter()
            .filter(|r| r.asset_id == asset_id)
            .map(|r| r.value().clone())
            .collect();
        records.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));
        records
    }
}

impl Default for MaintenanceRepository {
    fn default() -> Self {
        Self::new()
    }
}
