//! Shared lifecycle enums

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// AssetStatus
// ---------------------------------------------------------------------------

/// Custody status of an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetStatus {
    Available,
    CheckedOut,
    Maintenance,
    Missing,
    Retired,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Available => "AVAILABLE",
            AssetStatus::CheckedOut => "CHECKED_OUT",
            AssetStatus::Maintenance => "MAINTENANCE",
            AssetStatus::Missing => "MISSING",
            AssetStatus::Retired => "RETIRED",
        }
    }
}

impl std::fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AssetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AVAILABLE" => Ok(AssetStatus::Available),
            "CHECKED_OUT" => Ok(AssetStatus::CheckedOut),
            "MAINTENANCE" => Ok(AssetStatus::Maintenance),
            "MISSING" => Ok(AssetStatus::Missing),
            "RETIRED" => Ok(AssetStatus::Retired),
            other => Err(format!("Unknown asset status: {}", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// CheckoutStatus / CheckoutType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStatus {
    Active,
    Returned,
}

/// Why the equipment left the shelf
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutType {
    #[default]
    Internal,
    Event,
    Production,
    Rental,
}

// ---------------------------------------------------------------------------
// ReturnCondition
// ---------------------------------------------------------------------------

/// Condition reported at checkin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReturnCondition {
    Excellent,
    Good,
    Fair,
    Poor,
    NeedsRepair,
}

impl std::fmt::Display for ReturnCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ReturnCondition::Excellent => "excellent",
            ReturnCondition::Good => "good",
            ReturnCondition::Fair => "fair",
            ReturnCondition::Poor => "poor",
            ReturnCondition::NeedsRepair => "needs_repair",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// EventType
// ---------------------------------------------------------------------------

/// Ledger event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Created,
    Checkout,
    Checkin,
    MaintenanceScheduled,
    MaintenanceCompleted,
    CheckoutExtended,
    StatusChanged,
    Retired,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Created => "created",
            EventType::Checkout => "checkout",
            EventType::Checkin => "checkin",
            EventType::MaintenanceScheduled => "maintenance_scheduled",
            EventType::MaintenanceCompleted => "maintenance_completed",
            EventType::CheckoutExtended => "checkout_extended",
            EventType::StatusChanged => "status_changed",
            EventType::Retired => "retired",
        }
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(EventType::Created),
            "checkout" => Ok(EventType::Checkout),
            "checkin" => Ok(EventType::Checkin),
            "maintenance_scheduled" => Ok(EventType::MaintenanceScheduled),
            "maintenance_completed" => Ok(EventType::MaintenanceCompleted),
            "checkout_extended" => Ok(EventType::CheckoutExtended),
            "status_changed" => Ok(EventType::StatusChanged),
            "retired" => Ok(EventType::Retired),
            other => Err(format!("Unknown event type: {}", other)),
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    Scheduled,
    Completed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MaintenancePriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}
