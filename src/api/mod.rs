//! API handlers for Gearlog REST endpoints

pub mod assets;
pub mod availability;
pub mod checkouts;
pub mod health;
pub mod history;
pub mod maintenance;
pub mod openapi;
pub mod stats;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Header carrying the client's idempotency key
pub const IDEMPOTENCY_KEY: &str = "idempotency-key";

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Idempotency key sent by the client, if any
pub(crate) fn idempotency_key(headers: &HeaderMap) -> Result<Option<String>, AppError> {
    match headers.get(IDEMPOTENCY_KEY) {
        None => Ok(None),
        Some(value) => {
            let key = value
                .to_str()
                .map_err(|_| AppError::InvalidRequest("Idempotency-Key must be ASCII".to_string()))?
                .trim();
            if key.is_empty() {
                return Err(AppError::InvalidRequest("Idempotency-Key is empty".to_string()));
            }
            Ok(Some(key.to_string()))
        }
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Assets
        .route("/assets", get(assets::list_assets).post(assets::create_asset))
        .route("/assets/:id", get(assets::get_asset))
        .route("/assets/:id/retire", post(assets::retire_asset))
        .route("/assets/:id/missing", post(assets::report_missing))
        .route("/assets/:id/recover", post(assets::recover_asset))
        .route("/assets/:id/history", get(history::asset_history))
        .route("/assets/:id/stats", get(stats::asset_stats))
        .route("/assets/:id/availability", get(availability::asset_availability))
        .route(
            "/assets/:id/maintenance",
            get(maintenance::list_maintenance).post(maintenance::schedule_maintenance),
        )
        // Maintenance
        .route("/maintenance/:id/complete", post(maintenance::complete_maintenance))
        // Availability
        .route("/availability", get(availability::find_available))
        // Checkouts
        .route("/checkouts", post(checkouts::create_checkout))
        .route("/checkouts/:id", get(checkouts::get_checkout))
        .route("/checkouts/:id/checkin", post(checkouts::checkin))
        .route("/checkouts/:id/extend", post(checkouts::extend_checkout))
        .route("/overdue", get(checkouts::list_overdue))
        // Users
        .route("/users/:id/history", get(history::user_history))
        .route("/users/:id/stats", get(stats::user_stats))
        .route("/users/:id/checkouts", get(checkouts::user_checkouts))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
