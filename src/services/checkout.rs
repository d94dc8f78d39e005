//! Checkout engine: the only component that moves assets in and out of custody
//!
//! Every transition runs under the asset's lock and performs all of its writes
//! (checkout/checkin rows, asset status, ledger events, idempotency entry)
//! without awaiting, so concurrent requests on one asset are linearized and a
//! cancelled request leaves either everything or nothing behind.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    clock::Clock,
    config::CheckoutConfig,
    error::{AppError, AppResult},
    models::{
        asset::Asset,
        checkout::{Checkin, Checkout, CreateCheckin, CreateCheckout, ExtendCheckout},
        enums::{AssetStatus, CheckoutStatus, EventType},
        ledger::{EventDetails, LedgerEvent},
    },
    repository::{idempotency::IdempotentOperation, Repository},
};

use super::{
    ledger::HistoryLedger,
    maintenance::record_for_damaged_return,
    notifications::{Alert, NotificationSender},
};

#[derive(Clone)]
pub struct CheckoutEngine {
    repository: Repository,
    ledger: HistoryLedger,
    notifications: NotificationSender,
    clock: Arc<dyn Clock>,
    max_duration: Duration,
}

impl CheckoutEngine {
    pub fn new(
        repository: Repository,
        ledger: HistoryLedger,
        notifications: NotificationSender,
        clock: Arc<dyn Clock>,
        config: &CheckoutConfig,
    ) -> Self {
        Self {
            repository,
            ledger,
            notifications,
            clock,
            max_duration: Duration::days(config.max_duration_days),
        }
    }

    /// Get checkout by ID
    pub fn get(&self, id: Uuid) -> AppResult<Checkout> {
        self.repository.checkouts.get(id)
    }

    /// Checkin closing a checkout, if it was returned
    pub fn get_checkin(&self, checkout_id: Uuid) -> AppResult<Option<Checkin>> {
        self.repository.checkouts.get(checkout_id)?;
        Ok(self.repository.checkouts.get_checkin(checkout_id))
    }

    /// Active checkouts held by a user
    pub fn active_for_user(&self, user_id: &str) -> Vec<Checkout> {
        self.repository.checkouts.active_for_user(user_id)
    }

    /// Check an AVAILABLE asset out to a user.
    ///
    /// Exactly one of several concurrent checkouts of the same asset succeeds;
    /// the others fail with `AssetUnavailable`.
    pub async fn checkout(
        &self,
        request: CreateCheckout,
        actor: &str,
        idempotency_key: Option<&str>,
    ) -> AppResult<Checkout> {
        request.validate()?;
        let now = self.clock.now();
        let target = format!("{}:{}", request.asset_id, request.user_id);

        if let Some(previous) = self.replay::<Checkout>(IdempotentOperation::Checkout, idempotency_key, &target, now)? {
            return Ok(previous);
        }
        self.validate_return_date(now, request.expected_return_date)?;

        let mut asset = self.repository.assets.lock(request.asset_id).await?;

        // A request with the same key may have committed while we waited
        if let Some(previous) = self.replay::<Checkout>(IdempotentOperation::Checkout, idempotency_key, &target, now)? {
            return Ok(previous);
        }

        if asset.status != AssetStatus::Available {
            tracing::debug!(asset_id = %asset.id, status = %asset.status, "Checkout rejected");
            return Err(AppError::AssetUnavailable(format!(
                "Asset {} is {}",
                asset.id, asset.status
            )));
        }

        let checkout = Checkout {
            id: Uuid::new_v4(),
            asset_id: asset.id,
            user_id: request.user_id,
            event_name: request.event_name,
            checkout_type: request.checkout_type,
            checked_out_at: now,
            expected_return_date: request.expected_return_date,
            notes: request.notes,
            destination: request.destination,
            status: CheckoutStatus::Active,
            returned_at: None,
            checked_out_by: actor.to_string(),
            extensions: 0,
        };

        asset.set_status(AssetStatus::CheckedOut, Some(checkout.user_id.clone()), now)?;
        asset.active_checkout_id = Some(checkout.id);
        if checkout.destination.is_some() {
            asset.current_location = checkout.destination.clone();
        }
        self.repository.checkouts.save(checkout.clone());
        self.ledger.append(LedgerEvent::new(
            asset.id,
            EventType::Checkout,
            actor,
            now,
            EventDetails::Checkout(checkout.clone()),
        ));
        self.remember(IdempotentOperation::Checkout, idempotency_key, &target, &checkout, now);
        drop(asset);

        tracing::info!(
            asset_id = %checkout.asset_id,
            checkout_id = %checkout.id,
            user_id = %checkout.user_id,
            "Asset checked out"
        );
        Ok(checkout)
    }

    /// Close an active checkout.
    ///
    /// The asset goes back to AVAILABLE, or to MAINTENANCE with a new maintenance
    /// record when the return is damaged or needs repair.
    pub async fn checkin(
        &self,
        checkout_id: Uuid,
        request: CreateCheckin,
        actor: &str,
        idempotency_key: Option<&str>,
    ) -> AppResult<Checkin> {
        request.validate_damage()?;
        let now = self.clock.now();
        let target = checkout_id.to_string();

        if let Some(previous) = self.replay::<Checkin>(IdempotentOperation::Checkin, idempotency_key, &target, now)? {
            return Ok(previous);
        }

        let asset_id = self.repository.checkouts.get(checkout_id)?.asset_id;
        let mut asset = self.repository.assets.lock(asset_id).await?;

        if let Some(previous) = self.replay::<Checkin>(IdempotentOperation::Checkin, idempotency_key, &target, now)? {
            return Ok(previous);
        }

        // Re-read under the lock: a concurrent checkin may have closed it
        let mut checkout = self.repository.checkouts.get(checkout_id)?;
        if !checkout.is_active() {
            return Err(AppError::AlreadyReturned(format!(
                "Checkout {} was already returned",
                checkout_id
            )));
        }

        let mut checkin = Checkin {
            id: Uuid::new_v4(),
            checkout_id,
            asset_id,
            user_id: checkout.user_id.clone(),
            returned_at: now,
            return_condition: request.return_condition,
            has_damage: request.has_damage,
            damage_description: request.damage_description,
            return_notes: request.return_notes,
            return_location: request.return_location,
            is_overdue: now > checkout.expected_return_date,
            checked_in_by: actor.to_string(),
            maintenance_id: None,
        };

        checkout.status = CheckoutStatus::Returned;
        checkout.returned_at = Some(now);

        let maintenance = if checkin.requires_maintenance() {
            let record = record_for_damaged_return(&checkin, actor, now);
            checkin.maintenance_id = Some(record.id);
            Some(record)
        } else {
            None
        };

        release(&mut asset, &checkin, maintenance.as_ref().map(|m| m.id), now)?;

        self.repository.checkouts.save(checkout);
        self.repository.checkouts.save_checkin(checkin.clone());
        self.ledger.append(LedgerEvent::new(
            asset_id,
            EventType::Checkin,
            actor,
            now,
            EventDetails::Checkin(checkin.clone()),
        ));
        if let Some(ref record) = maintenance {
            self.repository.maintenance.save(record.clone());
            self.ledger.append(LedgerEvent::new(
                asset_id,
                EventType::MaintenanceScheduled,
                actor,
                now,
                EventDetails::Maintenance(record.clone()),
            ));
        }
        self.remember(IdempotentOperation::Checkin, idempotency_key, &target, &checkin, now);
        drop(asset);

        tracing::info!(
            asset_id = %asset_id,
            checkout_id = %checkout_id,
            user_id = %checkin.user_id,
            is_overdue = checkin.is_overdue,
            to_maintenance = maintenance.is_some(),
            "Asset checked in"
        );

        if checkin.has_damage {
            self.notifications.dispatch(Alert::Damage {
                checkout_id,
                asset_id,
                user_id: checkin.user_id.clone(),
                return_condition: checkin.return_condition,
                damage_description: checkin.damage_description.clone(),
                maintenance_id: checkin.maintenance_id,
            });
        }

        Ok(checkin)
    }

    /// Push back the expected return date of an active checkout
    pub async fn extend(
        &self,
        checkout_id: Uuid,
        request: ExtendCheckout,
        actor: &str,
    ) -> AppResult<Checkout> {
        let asset_id = self.repository.checkouts.get(checkout_id)?.asset_id;
        let asset = self.repository.assets.lock(asset_id).await?;
        let now = self.clock.now();

        let mut checkout = self.repository.checkouts.get(checkout_id)?;
        if !checkout.is_active() {
            return Err(AppError::AlreadyReturned(format!(
                "Checkout {} was already returned",
                checkout_id
            )));
        }
        if request.expected_return_date <= checkout.expected_return_date {
            return Err(AppError::InvalidRequest(
                "New return date must be later than the current one".to_string(),
            ));
        }
        if request.expected_return_date <= now {
            return Err(AppError::InvalidRequest(
                "New return date must be in the future".to_string(),
            ));
        }
        if request.expected_return_date - checkout.checked_out_at > self.max_duration {
            return Err(AppError::InvalidRequest(format!(
                "Checkout cannot exceed {} days",
                self.max_duration.num_days()
            )));
        }

        checkout.expected_return_date = request.expected_return_date;
        checkout.extensions += 1;
        self.repository.checkouts.save(checkout.clone());
        self.ledger.append(LedgerEvent::new(
            asset_id,
            EventType::CheckoutExtended,
            actor,
            now,
            EventDetails::Checkout(checkout.clone()),
        ));
        drop(asset);

        tracing::info!(
            checkout_id = %checkout_id,
            expected_return_date = %checkout.expected_return_date,
            "Checkout extended"
        );
        Ok(checkout)
    }

    /// Drop idempotency entries past their TTL
    pub fn purge_expired_keys(&self) -> usize {
        self.repository.idempotency.purge_expired(self.clock.now())
    }

    fn validate_return_date(&self, now: DateTime<Utc>, expected: DateTime<Utc>) -> AppResult<()> {
        if expected <= now {
            return Err(AppError::InvalidRequest(
                "expected_return_date must be after the checkout time".to_string(),
            ));
        }
        if expected - now > self.max_duration {
            return Err(AppError::InvalidRequest(format!(
                "Checkout cannot exceed {} days",
                self.max_duration.num_days()
            )));
        }
        Ok(())
    }

    fn replay<T: serde::de::DeserializeOwned>(
        &self,
        operation: IdempotentOperation,
        key: Option<&str>,
        target: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<T>> {
        match key {
            Some(key) => {
                let hit = self.repository.idempotency.get::<T>(operation, key, target, now)?;
                if hit.is_some() {
                    tracing::debug!(?operation, key, "Idempotent replay");
                }
                Ok(hit)
            }
            None => Ok(None),
        }
    }

    fn remember<T: serde::Serialize>(
        &self,
        operation: IdempotentOperation,
        key: Option<&str>,
        target: &str,
        value: &T,
        now: DateTime<Utc>,
    ) {
        if let Some(key) = key {
            // The transition is already committed; a cache miss only loses replay
            if let Err(e) = self.repository.idempotency.put(operation, key, target, value, now) {
                tracing::warn!(?operation, key, "Idempotency entry not stored: {}", e);
            }
        }
    }
}

/// Move a returned asset back to the shelf, or into maintenance
fn release(
    asset: &mut Asset,
    checkin: &Checkin,
    maintenance_id: Option<Uuid>,
    now: DateTime<Utc>,
) -> AppResult<()> {
    match maintenance_id {
        Some(id) => {
            asset.set_status(AssetStatus::Maintenance, None, now)?;
            asset.active_maintenance_id = Some(id);
        }
        None => asset.set_status(AssetStatus::Available, None, now)?,
    }
    asset.active_checkout_id = None;
    asset.current_location = checkin
        .return_location
        .clone()
        .or_else(|| asset.home_location.clone());
    Ok(())
}
