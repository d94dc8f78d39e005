//! Usage statistics endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::stats::{StatsQuery, UsageStats},
    AppState,
};

use super::AuthenticatedUser;

/// Usage statistics of one asset
#[utoipa::path(
    get,
    path = "/assets/{id}/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Asset ID"), StatsQuery),
    responses(
        (status = 200, description = "Usage statistics", body = UsageStats),
        (status = 400, description = "Window ends before it starts"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn asset_stats(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Query(window): Query<StatsQuery>,
) -> AppResult<Json<UsageStats>> {
    claims.require_staff()?;
    Ok(Json(state.services.stats.asset_stats(id, window).await?))
}

/// Usage statistics of one user
#[utoipa::path(
    get,
    path = "/users/{id}/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID"), StatsQuery),
    responses(
        (status = 200, description = "Usage statistics", body = UsageStats),
        (status = 400, description = "Window ends before it starts"),
        (status = 403, description = "Insufficient rights")
    )
)]
pub async fn user_stats(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<String>,
    Query(window): Query<StatsQuery>,
) -> AppResult<Json<UsageStats>> {
    claims.require_self_or_staff(&user_id)?;
    Ok(Json(state.services.stats.user_stats(&user_id, window)?))
}
