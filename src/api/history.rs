//! Lifecycle history endpoints

use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::EventType,
        ledger::{LedgerCursor, LedgerFilter, LedgerPage},
    },
    AppState,
};

use super::AuthenticatedUser;

/// History query parameters
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// Page size (default 50, max 500)
    pub limit: Option<usize>,
    /// `next_cursor` of the previous page
    pub cursor: Option<String>,
    /// Comma separated event types, e.g. `checkout,checkin`
    pub types: Option<String>,
    /// Inclusive lower bound on event time
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on event time
    pub to: Option<DateTime<Utc>>,
}

impl HistoryQuery {
    fn filter(&self) -> AppResult<LedgerFilter> {
        let types = match self.types.as_deref() {
            None => Vec::new(),
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(|t| EventType::from_str(t).map_err(AppError::InvalidRequest))
                .collect::<AppResult<Vec<_>>>()?,
        };
        let after = self.cursor.as_deref().map(LedgerCursor::decode).transpose()?;

        Ok(LedgerFilter {
            types,
            from: self.from,
            to: self.to,
            after,
        })
    }
}

/// Timeline of one asset, newest first
#[utoipa::path(
    get,
    path = "/assets/{id}/history",
    tag = "history",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Asset ID"), HistoryQuery),
    responses(
        (status = 200, description = "A page of ledger events", body = LedgerPage),
        (status = 400, description = "Bad cursor or event type"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn asset_history(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<LedgerPage>> {
    claims.require_staff()?;
    let filter = query.filter()?;
    Ok(Json(state.services.ledger.query(id, query.limit, &filter)?))
}

/// Events a user acted on or held the asset for, newest first
#[utoipa::path(
    get,
    path = "/users/{id}/history",
    tag = "history",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID"), HistoryQuery),
    responses(
        (status = 200, description = "A page of ledger events", body = LedgerPage),
        (status = 400, description = "Bad cursor or event type"),
        (status = 403, description = "Insufficient rights")
    )
)]
pub async fn user_history(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<LedgerPage>> {
    claims.require_self_or_staff(&user_id)?;
    let filter = query.filter()?;
    Ok(Json(
        state
            .services
            .ledger
            .query_by_user(&user_id, query.limit, &filter),
    ))
}
