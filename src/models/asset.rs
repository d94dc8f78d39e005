//! Asset model

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::AssetStatus;
use crate::error::{AppError, AppResult};

/// Canonical record of a physical asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Asset {
    pub id: Uuid,
    /// Camera, lens, lighting, audio...
    pub category: String,
    pub manufacturer: String,
    pub model: String,
    /// Unique when present
    pub serial_number: Option<String>,
    pub status: AssetStatus,
    /// Present iff status is CHECKED_OUT
    pub current_holder: Option<String>,
    pub home_location: Option<String>,
    pub current_location: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_price: Option<Decimal>,
    pub daily_rate: Option<Decimal>,
    pub notes: Option<String>,
    /// Open checkout holding the asset
    pub active_checkout_id: Option<Uuid>,
    /// Maintenance record holding the asset
    pub active_maintenance_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub retired_at: Option<DateTime<Utc>>,
}

impl Asset {
    pub fn new(data: CreateAsset, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            category: data.category,
            manufacturer: data.manufacturer,
            model: data.model,
            serial_number: data.serial_number.filter(|s| !s.trim().is_empty()),
            status: AssetStatus::Available,
            current_holder: None,
            current_location: data.home_location.clone(),
            home_location: data.home_location,
            purchase_date: data.purchase_date,
            purchase_price: data.purchase_price,
            daily_rate: data.daily_rate,
            notes: data.notes,
            active_checkout_id: None,
            active_maintenance_id: None,
            created_at: now,
            updated_at: now,
            retired_at: None,
        }
    }

    /// Apply a status change, keeping `current_holder` present iff CHECKED_OUT.
    ///
    /// RETIRED is terminal: nothing moves an asset out of it.
    pub fn set_status(
        &mut self,
        status: AssetStatus,
        holder: Option<String>,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        if self.status == AssetStatus::Retired {
            return Err(AppError::InvalidTransition(format!(
                "Asset {} is retired",
                self.id
            )));
        }
        match (status, holder.as_deref()) {
            (AssetStatus::CheckedOut, None) | (AssetStatus::CheckedOut, Some("")) => {
                return Err(AppError::InvalidTransition(
                    "A checked out asset requires a holder".to_string(),
                ));
            }
            (AssetStatus::CheckedOut, Some(_)) => {}
            (other, Some(_)) => {
                return Err(AppError::InvalidTransition(format!(
                    "Asset with status {} cannot have a holder",
                    other
                )));
            }
            (_, None) => {}
        }

        self.status = status;
        self.current_holder = holder;
        self.updated_at = now;
        if status == AssetStatus::Retired {
            self.retired_at = Some(now);
        }
        Ok(())
    }

    /// Start of ownership used for utilization
    pub fn owned_since(&self) -> DateTime<Utc> {
        self.purchase_date
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|d| d.and_utc())
            .filter(|d| *d < self.created_at)
            .unwrap_or(self.created_at)
    }
}

/// Onboard asset request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAsset {
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    #[validate(length(min = 1, message = "Manufacturer is required"))]
    pub manufacturer: String,
    #[validate(length(min = 1, message = "Model is required"))]
    pub model: String,
    pub serial_number: Option<String>,
    pub home_location: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_price: Option<Decimal>,
    pub daily_rate: Option<Decimal>,
    pub notes: Option<String>,
}

/// Asset list filters
#[derive(Debug, Default, Clone, Deserialize, IntoParams, ToSchema)]
pub struct AssetQuery {
    pub category: Option<String>,
    pub status: Option<AssetStatus>,
}
