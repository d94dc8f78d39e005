//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{assets, availability, checkouts, health, history, maintenance, stats};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Gearlog API",
        version = "0.3.0",
        description = "Equipment lifecycle and audit timeline REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    modifiers(&BearerAuth),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Assets
        assets::list_assets,
        assets::get_asset,
        assets::create_asset,
        assets::retire_asset,
        assets::report_missing,
        assets::recover_asset,
        // Checkouts
        checkouts::create_checkout,
        checkouts::get_checkout,
        checkouts::checkin,
        checkouts::extend_checkout,
        checkouts::list_overdue,
        checkouts::user_checkouts,
        // History
        history::asset_history,
        history::user_history,
        // Stats
        stats::asset_stats,
        stats::user_stats,
        // Availability
        availability::asset_availability,
        availability::find_available,
        // Maintenance
        maintenance::list_maintenance,
        maintenance::schedule_maintenance,
        maintenance::complete_maintenance,
    ),
    components(
        schemas(
            // Assets
            crate::models::asset::Asset,
            crate::models::asset::CreateAsset,
            crate::models::enums::AssetStatus,
            assets::StatusChangeRequest,
            // Checkouts
            crate::models::checkout::Checkout,
            crate::models::checkout::Checkin,
            crate::models::checkout::CreateCheckout,
            crate::models::checkout::CreateCheckin,
            crate::models::checkout::ExtendCheckout,
            crate::models::checkout::OverdueCheckout,
            crate::models::enums::CheckoutStatus,
            crate::models::enums::CheckoutType,
            crate::models::enums::ReturnCondition,
            // History
            crate::models::ledger::LedgerEvent,
            crate::models::ledger::LedgerPage,
            crate::models::ledger::StatusChange,
            crate::models::enums::EventType,
            // Maintenance
            crate::models::maintenance::MaintenanceRecord,
            crate::models::maintenance::ScheduleMaintenance,
            crate::models::maintenance::CompleteMaintenance,
            crate::models::enums::MaintenanceStatus,
            crate::models::enums::MaintenancePriority,
            // Stats
            crate::models::stats::UsageStats,
            // Availability
            availability::AvailabilityResponse,
            availability::AvailableAssets,
            // Health
            health::HealthResponse,
            health::ReadinessResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "assets", description = "Asset registry"),
        (name = "checkouts", description = "Checkout and checkin"),
        (name = "history", description = "Lifecycle ledger"),
        (name = "stats", description = "Usage statistics"),
        (name = "availability", description = "Availability windows"),
        (name = "maintenance", description = "Maintenance workflow"),
        (name = "users", description = "Per-user views")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
