//! Checkout and checkin transaction records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::enums::{CheckoutStatus, CheckoutType, ReturnCondition};
use crate::error::{AppError, AppResult};

/// An asset leaving custody. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Checkout {
    pub id: Uuid,
    pub asset_id: Uuid,
    /// Holder of the asset
    pub user_id: String,
    pub event_name: Option<String>,
    pub checkout_type: CheckoutType,
    pub checked_out_at: DateTime<Utc>,
    pub expected_return_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub destination: Option<String>,
    pub status: CheckoutStatus,
    pub returned_at: Option<DateTime<Utc>>,
    /// User who recorded the checkout
    pub checked_out_by: String,
    pub extensions: u32,
}

impl Checkout {
    pub fn is_active(&self) -> bool {
        self.status == CheckoutStatus::Active
    }

    /// Overdue as of `now`; a returned checkout is never overdue here
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && self.expected_return_date < now
    }
}

/// Closure of a checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Checkin {
    pub id: Uuid,
    pub checkout_id: Uuid,
    pub asset_id: Uuid,
    /// Holder of the closed checkout
    pub user_id: String,
    pub returned_at: DateTime<Utc>,
    pub return_condition: ReturnCondition,
    pub has_damage: bool,
    pub damage_description: Option<String>,
    pub return_notes: Option<String>,
    pub return_location: Option<String>,
    /// Frozen at creation: returned_at > expected_return_date
    pub is_overdue: bool,
    pub checked_in_by: String,
    /// Maintenance record opened because of this return
    pub maintenance_id: Option<Uuid>,
}

impl Checkin {
    /// Damaged or needs_repair returns go to maintenance instead of the shelf
    pub fn requires_maintenance(&self) -> bool {
        self.has_damage || self.return_condition == ReturnCondition::NeedsRepair
    }
}

/// Checkout request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCheckout {
    pub asset_id: Uuid,
    /// User receiving the asset
    #[validate(length(min = 1, message = "user_id is required"))]
    pub user_id: String,
    pub expected_return_date: DateTime<Utc>,
    pub event_name: Option<String>,
    #[serde(default)]
    pub checkout_type: CheckoutType,
    pub notes: Option<String>,
    /// Where the asset is going
    pub destination: Option<String>,
}

/// Checkin request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateCheckin {
    pub return_condition: ReturnCondition,
    #[serde(default)]
    pub has_damage: bool,
    /// Required when has_damage is true
    pub damage_description: Option<String>,
    pub return_notes: Option<String>,
    /// Defaults to the asset's home location
    pub return_location: Option<String>,
}

impl CreateCheckin {
    pub fn validate_damage(&self) -> AppResult<()> {
        let described = self
            .damage_description
            .as_deref()
            .map(|d| !d.trim().is_empty())
            .unwrap_or(false);
        if self.has_damage && !described {
            return Err(AppError::InvalidRequest(
                "damage_description is required when has_damage is true".to_string(),
            ));
        }
        Ok(())
    }
}

/// Move the expected return date of an active checkout
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ExtendCheckout {
    pub expected_return_date: DateTime<Utc>,
}

/// Active checkout past its expected return date
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OverdueCheckout {
    #[serde(flatten)]
    pub checkout: Checkout,
    /// ceil((now - expected_return_date) / 1 day)
    pub days_overdue: i64,
}
