//! Availability over a time window
//!
//! Pure reads. An active checkout holds its asset over
//! `[checked_out_at, expected_return_date)`, or indefinitely once overdue.
//! The open maintenance record the asset is linked to holds it from
//! `scheduled_at` to its expected completion, or indefinitely when that is
//! unknown or already past.

use std::{collections::BTreeSet, sync::Arc};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::{asset::Asset, enums::AssetStatus},
    repository::Repository,
};

#[derive(Clone)]
pub struct AvailabilityIndex {
    repository: Repository,
    clock: Arc<dyn Clock>,
}

/// Half-open interval, `None` end meaning unbounded
#[derive(Debug, Clone, Copy)]
struct Hold {
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
}

impl Hold {
    fn overlaps(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        self.start < to && self.end.map_or(true, |end| from < end)
    }
}

impl AvailabilityIndex {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Whether the asset is free over `[from, to)`
    pub async fn is_available(
        &self,
        asset_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<bool> {
        validate_window(from, to)?;
        let asset = self.repository.assets.get(asset_id).await?;
        Ok(self.free_over(&asset, from, to, self.clock.now()))
    }

    /// Assets, optionally of one category, free over `[from, to)`
    pub async fn find_available(
        &self,
        category: Option<&str>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<BTreeSet<Uuid>> {
        validate_window(from, to)?;
        let now = self.clock.now();
        let found: BTreeSet<Uuid> = self
            .repository
            .assets
            .list()
            .await
            .iter()
            .filter(|a| category.map_or(true, |c| a.category == c))
            .filter(|a| self.free_over(a, from, to, now))
            .map(|a| a.id)
            .collect();

        tracing::debug!(?category, %from, %to, found = found.len(), "Availability scan");
        Ok(found)
    }

    fn free_over(&self, asset: &Asset, from: DateTime<Utc>, to: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        if asset.status == AssetStatus::Retired {
            return false;
        }
        !self
            .holds(asset, now)
            .iter()
            .any(|hold| hold.overlaps(from, to))
    }

    fn holds(&self, asset: &Asset, now: DateTime<Utc>) -> Vec<Hold> {
        let mut holds = Vec::new();

        if let Some(checkout) = self.repository.checkouts.active_for_asset(asset.id) {
            let end = if checkout.is_overdue_at(now) {
                None
            } else {
                Some(checkout.expected_return_date)
            };
            holds.push(Hold {
                start: checkout.checked_out_at,
                end,
            });
        }

        // Only the record the asset is held under counts; recovery unlinks it
        let maintenance = asset
            .active_maintenance_id
            .and_then(|id| self.repository.maintenance.get(id).ok())
            .filter(|m| m.is_open());
        if let Some(record) = maintenance {
            holds.push(Hold {
                start: record.scheduled_at,
                end: record.expected_completion.filter(|end| *end > now),
            });
        }

        holds
    }
}

fn validate_window(from: DateTime<Utc>, to: DateTime<Utc>) -> AppResult<()> {
    if from >= to {
        return Err(AppError::InvalidRequest(
            "Availability window must end after it starts".to_string(),
        ));
    }
    Ok(())
}
