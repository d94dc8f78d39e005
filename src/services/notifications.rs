//! Overdue and damage alerts
//!
//! Delivery is fire-and-forget: the engine hands an [`Alert`] to the
//! [`NotificationSender`], which spawns the delivery and only logs failures.

use std::{collections::HashSet, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::{
    config::NotificationsConfig,
    error::{AppError, AppResult},
    models::enums::ReturnCondition,
};

use super::stats::StatsAggregator;

/// Alert handed to the notification collaborator
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Alert {
    Overdue {
        checkout_id: Uuid,
        asset_id: Uuid,
        user_id: String,
        expected_return_date: DateTime<Utc>,
        days_overdue: i64,
    },
    Damage {
        checkout_id: Uuid,
        asset_id: Uuid,
        user_id: String,
        return_condition: ReturnCondition,
        damage_description: Option<String>,
        maintenance_id: Option<Uuid>,
    },
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, alert: Alert) -> AppResult<()>;
}

/// Writes alerts to the log only
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, alert: Alert) -> AppResult<()> {
        tracing::info!(?alert, "Alert raised");
        Ok(())
    }
}

/// Posts alerts as JSON to a webhook, retrying with exponential backoff
#[derive(Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    max_retries: u32,
    initial_backoff: Duration,
}

impl WebhookNotifier {
    pub fn new(url: &str, config: &NotificationsConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.to_string(),
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, alert: Alert) -> AppResult<()> {
        let mut backoff = self.initial_backoff;
        let mut last_error = String::new();

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }

            match self.client.post(&self.url).json(&alert).send().await {
                Ok(response) if response.status().is_success() => return Ok(()),
                Ok(response) => last_error = format!("webhook answered {}", response.status()),
                Err(e) => last_error = e.to_string(),
            }
            tracing::warn!(attempt, error = %last_error, "Alert delivery failed");
        }

        Err(AppError::Transport(format!(
            "Alert not delivered after {} attempts: {}",
            self.max_retries + 1,
            last_error
        )))
    }
}

/// Build the notifier described by the configuration
pub fn notifier_from_config(config: &NotificationsConfig) -> AppResult<Arc<dyn Notifier>> {
    match config.webhook_url.as_deref().filter(|u| !u.is_empty()) {
        Some(url) => Ok(Arc::new(WebhookNotifier::new(url, config)?)),
        None => Ok(Arc::new(LogNotifier)),
    }
}

/// Fire-and-forget dispatcher
#[derive(Clone)]
pub struct NotificationSender {
    notifier: Arc<dyn Notifier>,
}

impl NotificationSender {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Deliver in the background; the caller never waits
    pub fn dispatch(&self, alert: Alert) {
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.send(alert).await {
                tracing::warn!("Alert dropped: {}", e);
            }
        });
    }
}

/// Periodic scan raising one alert per checkout when it becomes overdue
pub struct OverdueSweep {
    stats: StatsAggregator,
    sender: NotificationSender,
    alerted: HashSet<Uuid>,
}

impl OverdueSweep {
    pub fn new(stats: StatsAggregator, sender: NotificationSender) -> Self {
        Self {
            stats,
            sender,
            alerted: HashSet::new(),
        }
    }

    /// Alert newly overdue checkouts; returns how many alerts were sent
    pub fn run_once(&mut self) -> usize {
        let overdue = self.stats.overdue(None);
        let still_overdue: HashSet<Uuid> = overdue.iter().map(|o| o.checkout.id).collect();
        self.alerted.retain(|id| still_overdue.contains(id));

        let mut sent = 0;
        for entry in overdue {
            if !self.alerted.insert(entry.checkout.id) {
                continue;
            }
            self.sender.dispatch(Alert::Overdue {
                checkout_id: entry.checkout.id,
                asset_id: entry.checkout.asset_id,
                user_id: entry.checkout.user_id.clone(),
                expected_return_date: entry.checkout.expected_return_date,
                days_overdue: entry.days_overdue,
            });
            sent += 1;
        }
        sent
    }

    pub fn spawn(mut self, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let sent = self.run_once();
                if sent > 0 {
                    tracing::info!(sent, "Overdue alerts dispatched");
                }
            }
        })
    }
}
