//! Data models for Gearlog

pub mod asset;
pub mod checkout;
pub mod enums;
pub mod ledger;
pub mod maintenance;
pub mod stats;
pub mod user;

// Re-export commonly used types
pub use asset::Asset;
pub use checkout::{Checkin, Checkout};
pub use enums::{AssetStatus, CheckoutStatus, EventType, ReturnCondition};
pub use ledger::{EventDetails, LedgerEvent};
pub use maintenance::MaintenanceRecord;
pub use stats::UsageStats;
