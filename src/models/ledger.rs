//! Append-only lifecycle ledger events

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{
    asset::Asset,
    checkout::{Checkin, Checkout},
    enums::{AssetStatus, EventType},
    maintenance::MaintenanceRecord,
};
use crate::error::{AppError, AppResult};

/// One immutable entry of an asset's timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LedgerEvent {
    pub event_id: Uuid,
    /// Global insertion order, breaks timestamp ties
    pub sequence: u64,
    pub asset_id: Uuid,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    /// User who performed the transition
    pub actor: String,
    #[schema(value_type = Object)]
    pub details: EventDetails,
}

impl LedgerEvent {
    /// Build an event; the ledger assigns `sequence` on append.
    pub fn new(
        asset_id: Uuid,
        event_type: EventType,
        actor: &str,
        timestamp: DateTime<Utc>,
        details: EventDetails,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            sequence: 0,
            asset_id,
            event_type,
            timestamp,
            actor: actor.to_string(),
            details,
        }
    }

    /// Position of this event in timeline order
    pub fn position(&self) -> LedgerCursor {
        LedgerCursor {
            timestamp: self.timestamp,
            sequence: self.sequence,
        }
    }

    /// Whether `user_id` acted on this event or holds the checkout it records
    pub fn involves_user(&self, user_id: &str) -> bool {
        self.actor == user_id || self.details.user_id() == Some(user_id)
    }
}

/// Type-specific payload of a ledger event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventDetails {
    Asset(Asset),
    Checkout(Checkout),
    Checkin(Checkin),
    Maintenance(MaintenanceRecord),
    StatusChange(StatusChange),
}

impl EventDetails {
    pub fn checkout_id(&self) -> Option<Uuid> {
        match self {
            EventDetails::Checkout(c) => Some(c.id),
            EventDetails::Checkin(c) => Some(c.checkout_id),
            _ => None,
        }
    }

    /// Holder embedded in checkout/checkin payloads
    pub fn user_id(&self) -> Option<&str> {
        match self {
            EventDetails::Checkout(c) => Some(c.user_id.as_str()),
            EventDetails::Checkin(c) => Some(c.user_id.as_str()),
            _ => None,
        }
    }

    pub fn has_damage(&self) -> bool {
        matches!(self, EventDetails::Checkin(c) if c.has_damage)
    }
}

/// Payload of status_changed and retired events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StatusChange {
    pub from: AssetStatus,
    pub to: AssetStatus,
    pub reason: Option<String>,
}

/// Optional filters for ledger queries
#[derive(Debug, Default, Clone)]
pub struct LedgerFilter {
    /// Keep only these types; empty keeps all
    pub types: Vec<EventType>,
    /// Inclusive lower bound
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound
    pub to: Option<DateTime<Utc>>,
    /// Resume strictly after this position
    pub after: Option<LedgerCursor>,
}

impl LedgerFilter {
    pub fn matches(&self, event: &LedgerEvent) -> bool {
        if !self.types.is_empty() && !self.types.contains(&event.event_type) {
            return false;
        }
        if let Some(from) = self.from {
            if event.timestamp < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if event.timestamp >= to {
                return false;
            }
        }
        // Pages run newest first: "after" the cursor means older than it
        if let Some(after) = self.after {
            if event.position() >= after {
                return false;
            }
        }
        true
    }
}

/// A page of events, newest first
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LedgerPage {
    pub events: Vec<LedgerEvent>,
    /// Pass back as `cursor` to fetch the next page
    pub next_cursor: Option<String>,
}

/// Timeline position: timestamp first, insertion sequence second
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LedgerCursor {
    pub timestamp: DateTime<Utc>,
    pub sequence: u64,
}

impl LedgerCursor {
    /// Opaque token of `seconds.nanos:sequence`, exact to the nanosecond
    pub fn encode(&self) -> String {
        let raw = format!(
            "{}.{}:{}",
            self.timestamp.timestamp(),
            self.timestamp.timestamp_subsec_nanos(),
            self.sequence
        );
        URL_SAFE_NO_PAD.encode(raw)
    }

    pub fn decode(token: &str) -> AppResult<Self> {
        let invalid = || AppError::InvalidRequest("Invalid cursor".to_string());
        let bytes = URL_SAFE_NO_PAD.decode(token).map_err(|_| invalid())?;
        let raw = String::from_utf8(bytes).map_err(|_| invalid())?;
        let (instant, sequence) = raw.split_once(':').ok_or_else(invalid)?;
        let (secs, nanos) = instant.split_once('.').ok_or_else(invalid)?;
        let secs: i64 = secs.parse().map_err(|_| invalid())?;
        let nanos: u32 = nanos.parse().map_err(|_| invalid())?;
        let sequence: u64 = sequence.parse().map_err(|_| invalid())?;
        let timestamp = DateTime::<Utc>::from_timestamp(secs, nanos).ok_or_else(invalid)?;
        Ok(Self { timestamp, sequence })
    }
}
