//! Asset records behind per-asset locks

use std::sync::Arc;

use dashmap::{mapref::entry::Entry, DashMap};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::asset::Asset,
};

/// Exclusive handle on one asset; dropping it releases the asset
pub type AssetGuard = OwnedMutexGuard<Asset>;

#[derive(Clone)]
pub struct AssetsRepository {
    records: Arc<DashMap<Uuid, Arc<Mutex<Asset>>>>,
    serials: Arc<DashMap<String, Uuid>>,
}

impl AssetsRepository {
    pub fn new() -> Self {
        Self {
            records: Arc::new(DashMap::new()),
            serials: Arc::new(DashMap::new()),
        }
    }

    /// Claim a serial number for `asset_id`
    pub fn reserve_serial(&self, serial: &str, asset_id: Uuid) -> AppResult<()> {
        match self.serials.entry(serial.to_string()) {
            Entry::Occupied(_) => Err(AppError::Conflict(format!(
                "Serial number {} is already registered",
                serial
            ))),
            Entry::Vacant(slot) => {
                slot.insert(asset_id);
                Ok(())
            }
        }
    }

    /// Make a new asset visible
    pub fn insert(&self, asset: Asset) {
        self.records.insert(asset.id, Arc::new(Mutex::new(asset)));
    }

    /// Lock an asset for a read-then-write transition
    pub async fn lock(&self, id: Uuid) -> AppResult<AssetGuard> {
        let cell = self
            .records
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::NotFound(format!("Asset {} not found", id)))?;
        Ok(cell.lock_owned().await)
    }

    /// Consistent snapshot of one asset
    pub async fn get(&self, id: Uuid) -> AppResult<Asset> {
        let guard = self.lock(id).await?;
        Ok(guard.clone())
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.records.contains_key(&id)
    }

    /// Snapshot of every asset
    pub async fn list(&self) -> Vec<Asset> {
        // Collect cells first: no map reference may be held across an await
        let cells: Vec<Arc<Mutex<Asset>>> = self
            .records
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        let mut assets = Vec::with_capacity(cells.len());
        for cell in cells {
            assets.push(cell.lock().await.clone());
        }
        assets
    }
}

impl Default for AssetsRepository {
    fn default() -> Self {
        Self::new()
    }
}
