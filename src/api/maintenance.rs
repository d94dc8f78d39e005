//! Maintenance workflow endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::maintenance::{CompleteMaintenance, MaintenanceRecord, ScheduleMaintenance},
    AppState,
};

use super::AuthenticatedUser;

/// Maintenance history of an asset
#[utoipa::path(
    get,
    path = "/assets/{id}/maintenance",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Maintenance records, newest first", body = Vec<MaintenanceRecord>),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn list_maintenance(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<MaintenanceRecord>>> {
    claims.require_staff()?;
    Ok(Json(state.services.maintenance.list_for_asset(id)?))
}

/// Send an available asset to maintenance
#[utoipa::path(
    post,
    path = "/assets/{id}/maintenance",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Asset ID")),
    request_body = ScheduleMaintenance,
    responses(
        (status = 201, description = "Maintenance scheduled", body = MaintenanceRecord),
        (status = 404, description = "Asset not found"),
        (status = 422, description = "Asset is not available")
    )
)]
pub async fn schedule_maintenance(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ScheduleMaintenance>,
) -> AppResult<(StatusCode, Json<MaintenanceRecord>)> {
    claims.require_staff()?;
    let record = state
        .services
        .maintenance
        .schedule(id, request, claims.user_id())
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Complete a maintenance record
#[utoipa::path(
    post,
    path = "/maintenance/{id}/complete",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Maintenance ID")),
    request_body(content = CompleteMaintenance, description = "Work report, may be omitted"),
    responses(
        (status = 200, description = "Maintenance completed", body = MaintenanceRecord),
        (status = 404, description = "Maintenance record not found"),
        (status = 422, description = "Already completed")
    )
)]
pub async fn complete_maintenance(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    body: Option<Json<CompleteMaintenance>>,
) -> AppResult<Json<MaintenanceRecord>> {
    claims.require_staff()?;
    let request = body.map(|Json(b)| b).unwrap_or_default();
    Ok(Json(
        state
            .services
            .maintenance
            .complete(id, request, claims.user_id())
            .await?,
    ))
}
