//! Checkout and checkin endpoints

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::checkout::{
        Checkin, Checkout, CreateCheckin, CreateCheckout, ExtendCheckout, OverdueCheckout,
    },
    AppState,
};

use super::{idempotency_key, AuthenticatedUser};

/// Overdue listing filter
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct OverdueQuery {
    /// Restrict to one holder; members always see only their own
    pub user_id: Option<String>,
}

/// Check an asset out
#[utoipa::path(
    post,
    path = "/checkouts",
    tag = "checkouts",
    security(("bearer_auth" = [])),
    params(("Idempotency-Key" = Option<String>, Header, description = "Replays the first result for a repeated key")),
    request_body = CreateCheckout,
    responses(
        (status = 201, description = "Checkout created", body = Checkout),
        (status = 400, description = "Invalid return date or user"),
        (status = 403, description = "Members may only check out to themselves"),
        (status = 404, description = "Asset not found"),
        (status = 409, description = "Asset unavailable")
    )
)]
pub async fn create_checkout(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    headers: HeaderMap,
    Json(request): Json<CreateCheckout>,
) -> AppResult<(StatusCode, Json<Checkout>)> {
    claims.require_self_or_staff(&request.user_id)?;
    let key = idempotency_key(&headers)?;

    let checkout = state
        .services
        .checkout
        .checkout(request, claims.user_id(), key.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(checkout)))
}

/// Get checkout by ID
#[utoipa::path(
    get,
    path = "/checkouts/{id}",
    tag = "checkouts",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Checkout ID")),
    responses(
        (status = 200, description = "Checkout details", body = Checkout),
        (status = 404, description = "Checkout not found")
    )
)]
pub async fn get_checkout(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Checkout>> {
    let checkout = state.services.checkout.get(id)?;
    claims.require_self_or_staff(&checkout.user_id)?;
    Ok(Json(checkout))
}

/// Return a checked out asset
#[utoipa::path(
    post,
    path = "/checkouts/{id}/checkin",
    tag = "checkouts",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Checkout ID"),
        ("Idempotency-Key" = Option<String>, Header, description = "Replays the first result for a repeated key")
    ),
    request_body = CreateCheckin,
    responses(
        (status = 201, description = "Checkin recorded", body = Checkin),
        (status = 400, description = "Damage reported without description"),
        (status = 404, description = "Checkout not found"),
        (status = 409, description = "Checkout already returned")
    )
)]
pub async fn checkin(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<CreateCheckin>,
) -> AppResult<(StatusCode, Json<Checkin>)> {
    let checkout = state.services.checkout.get(id)?;
    claims.require_self_or_staff(&checkout.user_id)?;
    let key = idempotency_key(&headers)?;

    let checkin = state
        .services
        .checkout
        .checkin(id, request, claims.user_id(), key.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(checkin)))
}

/// Extend the expected return date
#[utoipa::path(
    post,
    path = "/checkouts/{id}/extend",
    tag = "checkouts",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Checkout ID")),
    request_body = ExtendCheckout,
    responses(
        (status = 200, description = "Checkout extended", body = Checkout),
        (status = 400, description = "New date not later than the current one"),
        (status = 404, description = "Checkout not found"),
        (status = 409, description = "Checkout already returned")
    )
)]
pub async fn extend_checkout(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ExtendCheckout>,
) -> AppResult<Json<Checkout>> {
    let checkout = state.services.checkout.get(id)?;
    claims.require_self_or_staff(&checkout.user_id)?;

    let checkout = state
        .services
        .checkout
        .extend(id, request, claims.user_id())
        .await?;
    Ok(Json(checkout))
}

/// Overdue checkouts, most overdue first
#[utoipa::path(
    get,
    path = "/overdue",
    tag = "checkouts",
    security(("bearer_auth" = [])),
    params(OverdueQuery),
    responses(
        (status = 200, description = "Overdue checkouts with days overdue", body = Vec<OverdueCheckout>),
        (status = 403, description = "Members may only list their own")
    )
)]
pub async fn list_overdue(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<OverdueQuery>,
) -> AppResult<Json<Vec<OverdueCheckout>>> {
    let user_id = match query.user_id {
        Some(user_id) => {
            claims.require_self_or_staff(&user_id)?;
            Some(user_id)
        }
        None if claims.is_staff() => None,
        None => Some(claims.user_id().to_string()),
    };

    Ok(Json(state.services.stats.overdue(user_id.as_deref())))
}

/// Active checkouts held by a user
#[utoipa::path(
    get,
    path = "/users/{id}/checkouts",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Active checkouts", body = Vec<Checkout>),
        (status = 403, description = "Insufficient rights")
    )
)]
pub async fn user_checkouts(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<Checkout>>> {
    claims.require_self_or_staff(&user_id)?;
    Ok(Json(state.services.checkout.active_for_user(&user_id)))
}
