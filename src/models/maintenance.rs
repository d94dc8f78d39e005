//! Maintenance record model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::enums::{MaintenancePriority, MaintenanceStatus};

/// Maintenance hold on an asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MaintenanceRecord {
    pub id: Uuid,
    pub asset_id: Uuid,
    /// Free-form category (cleaning, repair, calibration, damage...)
    pub issue_type: String,
    pub priority: MaintenancePriority,
    pub status: MaintenanceStatus,
    pub description: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub expected_completion: Option<DateTime<Utc>>,
    pub estimated_cost: Option<Decimal>,
    pub total_cost: Option<Decimal>,
    pub work_performed: Vec<String>,
    pub parts_replaced: Vec<String>,
    /// Checkout whose damaged return opened this record
    pub source_checkout_id: Option<Uuid>,
    pub scheduled_by: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed_by: Option<String>,
}

impl MaintenanceRecord {
    pub fn is_open(&self) -> bool {
        self.status == MaintenanceStatus::Scheduled
    }
}

/// Schedule maintenance request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ScheduleMaintenance {
    #[validate(length(min = 1, message = "issue_type is required"))]
    pub issue_type: String,
    #[serde(default)]
    pub priority: MaintenancePriority,
    pub description: Option<String>,
    pub expected_completion: Option<DateTime<Utc>>,
    pub estimated_cost: Option<Decimal>,
}

/// Complete maintenance request
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CompleteMaintenance {
    #[serde(default)]
    pub work_performed: Vec<String>,
    #[serde(default)]
    pub parts_replaced: Vec<String>,
    pub total_cost: Option<Decimal>,
}
