//! Derived usage statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Aggregates for one asset or one user over a time window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UsageStats {
    pub total_checkouts: u64,
    pub total_maintenance: u64,
    pub total_damages: u64,
    /// Mean closed checkout length in whole days
    pub avg_checkout_duration: i64,
    /// Percentage in [0, 100]
    pub utilization_rate: f64,
    pub total_days_checked_out: f64,
    pub total_days_owned: f64,
}

/// Time window for stats, `[from, to)`
#[derive(Debug, Default, Clone, Copy, Deserialize, IntoParams, ToSchema)]
pub struct StatsQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}
