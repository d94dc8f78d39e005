//! Asset registry endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::asset::{Asset, AssetQuery, CreateAsset},
    AppState,
};

use super::AuthenticatedUser;

/// Optional reason attached to a status change
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct StatusChangeRequest {
    pub reason: Option<String>,
}

/// List assets
#[utoipa::path(
    get,
    path = "/assets",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(AssetQuery),
    responses(
        (status = 200, description = "Assets sorted by category and model", body = Vec<Asset>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_assets(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<AssetQuery>,
) -> AppResult<Json<Vec<Asset>>> {
    Ok(Json(state.services.registry.list(&query).await))
}

/// Get asset by ID
#[utoipa::path(
    get,
    path = "/assets/{id}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset details", body = Asset),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn get_asset(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Asset>> {
    Ok(Json(state.services.registry.get(id).await?))
}

/// Onboard a new asset
#[utoipa::path(
    post,
    path = "/assets",
    tag = "assets",
    security(("bearer_auth" = [])),
    request_body = CreateAsset,
    responses(
        (status = 201, description = "Asset created", body = Asset),
        (status = 400, description = "Invalid attributes"),
        (status = 403, description = "Staff rights required"),
        (status = 409, description = "Serial number already registered")
    )
)]
pub async fn create_asset(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateAsset>,
) -> AppResult<(StatusCode, Json<Asset>)> {
    claims.require_staff()?;
    let asset = state.services.registry.create(data, claims.user_id()).await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

/// Retire an asset (terminal)
#[utoipa::path(
    post,
    path = "/assets/{id}/retire",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Asset ID")),
    request_body(content = StatusChangeRequest, description = "Optional reason"),
    responses(
        (status = 200, description = "Asset retired", body = Asset),
        (status = 404, description = "Asset not found"),
        (status = 422, description = "Asset is checked out or already retired")
    )
)]
pub async fn retire_asset(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    body: Option<Json<StatusChangeRequest>>,
) -> AppResult<Json<Asset>> {
    claims.require_staff()?;
    let reason = body.and_then(|Json(b)| b.reason);
    Ok(Json(state.services.registry.retire(id, reason, claims.user_id()).await?))
}

/// Report an asset missing
#[utoipa::path(
    post,
    path = "/assets/{id}/missing",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Asset ID")),
    request_body(content = StatusChangeRequest, description = "Optional reason"),
    responses(
        (status = 200, description = "Asset marked missing", body = Asset),
        (status = 404, description = "Asset not found"),
        (status = 422, description = "Asset is checked out, missing or retired")
    )
)]
pub async fn report_missing(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    body: Option<Json<StatusChangeRequest>>,
) -> AppResult<Json<Asset>> {
    claims.require_staff()?;
    let reason = body.and_then(|Json(b)| b.reason);
    Ok(Json(
        state
            .services
            .registry
            .report_missing(id, reason, claims.user_id())
            .await?,
    ))
}

/// Recover a missing asset
#[utoipa::path(
    post,
    path = "/assets/{id}/recover",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Asset ID")),
    request_body(content = StatusChangeRequest, description = "Optional reason"),
    responses(
        (status = 200, description = "Asset available again", body = Asset),
        (status = 404, description = "Asset not found"),
        (status = 422, description = "Asset is not missing")
    )
)]
pub async fn recover_asset(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    body: Option<Json<StatusChangeRequest>>,
) -> AppResult<Json<Asset>> {
    claims.require_staff()?;
    let reason = body.and_then(|Json(b)| b.reason);
    Ok(Json(state.services.registry.recover(id, reason, claims.user_id()).await?))
}
