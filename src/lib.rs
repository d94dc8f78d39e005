//! Gearlog equipment lifecycle server
//!
//! Tracks production equipment through checkout, return and maintenance,
//! keeps an append-only audit timeline per asset, and derives availability
//! and usage statistics from it. Exposed as a REST JSON API.

use std::sync::Arc;

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
