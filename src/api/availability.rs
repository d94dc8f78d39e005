//! Availability endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{error::AppResult, AppState};

use super::AuthenticatedUser;

/// Window to check, `[from, to)`
#[derive(Debug, Deserialize, IntoParams)]
pub struct WindowQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Search for free assets
#[derive(Debug, Deserialize, IntoParams)]
pub struct FindAvailableQuery {
    pub category: Option<String>,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityResponse {
    pub asset_id: Uuid,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub available: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AvailableAssets {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub asset_ids: Vec<Uuid>,
}

/// Whether an asset is free over a window
#[utoipa::path(
    get,
    path = "/assets/{id}/availability",
    tag = "availability",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Asset ID"), WindowQuery),
    responses(
        (status = 200, description = "Availability of the asset", body = AvailabilityResponse),
        (status = 400, description = "Empty window"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn asset_availability(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Query(window): Query<WindowQuery>,
) -> AppResult<Json<AvailabilityResponse>> {
    let available = state
        .services
        .availability
        .is_available(id, window.from, window.to)
        .await?;
    Ok(Json(AvailabilityResponse {
        asset_id: id,
        from: window.from,
        to: window.to,
        available,
    }))
}

/// Assets free over a window, optionally of one category
#[utoipa::path(
    get,
    path = "/availability",
    tag = "availability",
    security(("bearer_auth" = [])),
    params(FindAvailableQuery),
    responses(
        (status = 200, description = "Free assets", body = AvailableAssets),
        (status = 400, description = "Empty window")
    )
)]
pub async fn find_available(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<FindAvailableQuery>,
) -> AppResult<Json<AvailableAssets>> {
    let found = state
        .services
        .availability
        .find_available(query.category.as_deref(), query.from, query.to)
        .await?;
    Ok(Json(AvailableAssets {
        from: query.from,
        to: query.to,
        asset_ids: found.into_iter().collect(),
    }))
}
