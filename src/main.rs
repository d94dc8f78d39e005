//! Gearlog Server - equipment lifecycle and audit timeline
//!
//! REST API server tracking asset custody, maintenance and history.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gearlog_server::{
    api,
    clock::SystemClock,
    config::AppConfig,
    services::{
        notifications::{notifier_from_config, OverdueSweep},
        Services,
    },
    AppState,
};

/// How often expired idempotency keys are dropped
const IDEMPOTENCY_PURGE_PERIOD: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("gearlog_server={},tower_http=debug", config.logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Gearlog Server v{}", env!("CARGO_PKG_VERSION"));

    let notifier = notifier_from_config(&config.notifications)
        .context("Failed to create notifier")?;
    let services = Services::in_memory(&config, Arc::new(SystemClock), notifier);

    // Background jobs
    if config.notifications.overdue_sweep_seconds > 0 {
        OverdueSweep::new(services.stats.clone(), services.notifications.clone())
            .spawn(Duration::from_secs(config.notifications.overdue_sweep_seconds));
        tracing::info!(
            period_seconds = config.notifications.overdue_sweep_seconds,
            "Overdue sweep started"
        );
    }
    let checkout = services.checkout.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(IDEMPOTENCY_PURGE_PERIOD);
        loop {
            ticker.tick().await;
            let purged = checkout.purge_expired_keys();
            if purged > 0 {
                tracing::debug!(purged, "Expired idempotency keys dropped");
            }
        }
    });

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };
    let app = api::router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
