//! HTTP handlers for the daily stock log

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::error::AppResult;
use crate::handlers::SeasonQuery;
use crate::middleware::CurrentUser;
use crate::services::{daily_logs::DailyLogInput, DailyLogService};
use crate::AppState;

/// The processed daily ledger view
pub async fn list_daily_logs(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<SeasonQuery>,
) -> AppResult<impl IntoResponse> {
    let season = query.checked()?;
    let service = DailyLogService::new(state.store, state.config.mill.clone());
    let view = service.list(&user.username, season).await?;
    Ok(Json(view))
}

/// Add or edit a daily log entry
pub async fn upsert_daily_log(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<SeasonQuery>,
    Json(input): Json<DailyLogInput>,
) -> AppResult<impl IntoResponse> {
    let season = query.checked()?;
    let is_new = input.id.is_none();
    let service = DailyLogService::new(state.store, state.config.mill.clone());
    let saved = service.upsert(&user.username, season, input).await?;
    let status = if is_new {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(saved)))
}

/// Delete a daily log entry
pub async fn delete_daily_log(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Query(query): Query<SeasonQuery>,
) -> AppResult<impl IntoResponse> {
    let season = query.checked()?;
    let service = DailyLogService::new(state.store, state.config.mill.clone());
    service.delete(&user.username, season, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
