//! Statistics service
//!
//! Every figure is recomputed from the ledger on each query. Overdue math
//! lives here only; handlers and the overdue sweep call into it.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::{
        checkout::OverdueCheckout,
        enums::EventType,
        ledger::LedgerEvent,
        stats::{StatsQuery, UsageStats},
    },
    repository::Repository,
};

use super::ledger::HistoryLedger;

const SECONDS_PER_DAY: f64 = 86_400.0;
const MILLIS_PER_DAY: i64 = 86_400_000;

/// Whole days past due, rounded up; zero when not yet due
pub fn days_overdue(expected_return_date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let late = (now - expected_return_date).num_milliseconds();
    if late <= 0 {
        0
    } else {
        (late + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
    }
}

fn days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    if end <= start {
        0.0
    } else {
        (end - start).num_seconds() as f64 / SECONDS_PER_DAY
    }
}

impl StatsQuery {
    fn validate(&self) -> AppResult<()> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from >= to {
                return Err(AppError::InvalidRequest(
                    "Stats window must end after it starts".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| at >= from) && self.to.map_or(true, |to| at < to)
    }

    /// Length in days of `[start, end)` once clipped to the window
    fn clipped_days(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
        let start = self.from.map_or(start, |from| start.max(from));
        let end = self.to.map_or(end, |to| end.min(to));
        days_between(start, end)
    }
}

/// Fold an oldest-first event sequence into usage figures.
///
/// Open checkouts count as checked out until `now`. `days_owned` is the
/// utilization denominator, already clipped by the caller.
pub fn summarize(
    events: &[LedgerEvent],
    window: &StatsQuery,
    now: DateTime<Utc>,
    days_owned: f64,
) -> UsageStats {
    let mut stats = UsageStats::default();
    let mut opened: HashMap<Uuid, DateTime<Utc>> = HashMap::new();
    let mut closed: HashMap<Uuid, DateTime<Utc>> = HashMap::new();

    for event in events {
        let in_window = window.contains(event.timestamp);
        match event.event_type {
            EventType::Checkout => {
                if let Some(id) = event.details.checkout_id() {
                    opened.insert(id, event.timestamp);
                }
                if in_window {
                    stats.total_checkouts += 1;
                }
            }
            EventType::Checkin => {
                if let Some(id) = event.details.checkout_id() {
                    closed.insert(id, event.timestamp);
                }
                if in_window && event.details.has_damage() {
                    stats.total_damages += 1;
                }
            }
            EventType::MaintenanceScheduled | EventType::MaintenanceCompleted if in_window => {
                stats.total_maintenance += 1;
            }
            _ => {}
        }
    }

    let mut durations = Vec::new();
    for (id, checked_out_at) in &opened {
        let returned_at = closed.get(id).copied();
        let end = returned_at.unwrap_or(now).min(now);
        stats.total_days_checked_out += window.clipped_days(*checked_out_at, end);

        if let Some(returned_at) = returned_at {
            let ends_in_window = window.to.map_or(true, |to| returned_at < to);
            if window.contains(*checked_out_at) && ends_in_window {
                durations.push(days_between(*checked_out_at, returned_at));
            }
        }
    }

    if !durations.is_empty() {
        let mean = durations.iter().sum::<f64>() / durations.len() as f64;
        stats.avg_checkout_duration = mean.round() as i64;
    }

    stats.total_days_owned = days_owned.max(0.0);
    stats.utilization_rate = if stats.total_days_owned > 0.0 {
        (stats.total_days_checked_out / stats.total_days_owned * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };
    stats
}

#[derive(Clone)]
pub struct StatsAggregator {
    repository: Repository,
    ledger: HistoryLedger,
    clock: Arc<dyn Clock>,
}

impl StatsAggregator {
    pub fn new(repository: Repository, ledger: HistoryLedger, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            ledger,
            clock,
        }
    }

    /// Usage of one asset over the window, measured against the time it was owned
    pub async fn asset_stats(&self, asset_id: Uuid, window: StatsQuery) -> AppResult<UsageStats> {
        window.validate()?;
        let asset = self.repository.assets.get(asset_id).await?;
        let now = self.clock.now();

        let owned_until = asset.retired_at.unwrap_or(now).min(now);
        let days_owned = window.clipped_days(asset.owned_since(), owned_until);
        let events = self.ledger.timeline(asset_id);

        Ok(summarize(&events, &window, now, days_owned))
    }

    /// Usage attributed to one user, measured against the window length
    pub fn user_stats(&self, user_id: &str, window: StatsQuery) -> AppResult<UsageStats> {
        window.validate()?;
        let now = self.clock.now();
        let events = self.ledger.scan(|e| match e.details.user_id() {
            Some(holder) => holder == user_id,
            None => e.actor == user_id,
        });

        let start = window.from.or_else(|| events.first().map(|e| e.timestamp));
        let end = window.to.unwrap_or(now).min(now);
        let days = start.map_or(0.0, |start| days_between(start, end));

        Ok(summarize(&events, &window, now, days))
    }

    /// Active checkouts past due, most overdue first
    pub fn overdue(&self, user_id: Option<&str>) -> Vec<OverdueCheckout> {
        let now = self.clock.now();
        let mut overdue: Vec<OverdueCheckout> = self
            .repository
            .checkouts
            .active()
            .into_iter()
            .filter(|c| c.is_overdue_at(now))
            .filter(|c| user_id.map_or(true, |u| c.user_id == u))
            .map(|checkout| OverdueCheckout {
                days_overdue: days_overdue(checkout.expected_return_date, now),
                checkout,
            })
            .collect();

        overdue.sort_by(|a, b| {
            b.days_overdue
                .cmp(&a.days_overdue)
                .then_with(|| a.checkout.expected_return_date.cmp(&b.checkout.expected_return_date))
                .then_with(|| a.checkout.id.cmp(&b.checkout.id))
        });
        overdue
    }
}
