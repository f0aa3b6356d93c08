//! HTTP handlers for FRK purchases

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::error::AppResult;
use crate::handlers::SeasonQuery;
use crate::middleware::CurrentUser;
use crate::services::{frk::FrkInput, FrkService};
use crate::AppState;

/// List FRK purchases
pub async fn list_frk_records(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<SeasonQuery>,
) -> AppResult<impl IntoResponse> {
    let season = query.checked()?;
    let service = FrkService::new(state.store, state.config.mill.clone());
    let records = service.list(&user.username, season).await?;
    Ok(Json(records))
}

/// Log an FRK purchase
pub async fn create_frk_record(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<SeasonQuery>,
    Json(input): Json<FrkInput>,
) -> AppResult<impl IntoResponse> {
    let season = query.checked()?;
    let service = FrkService::new(state.store, state.config.mill.clone());
    let record = service.create(&user.username, season, input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Delete an FRK purchase record
pub async fn delete_frk_record(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Query(query): Query<SeasonQuery>,
) -> AppResult<impl IntoResponse> {
    let season = query.checked()?;
    let service = FrkService::new(state.store, state.config.mill.clone());
    service.delete(&user.username, season, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// FRK stock summary
pub async fn frk_stock_summary(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<SeasonQuery>,
) -> AppResult<impl IntoResponse> {
    let season = query.checked()?;
    let service = FrkService::new(state.store, state.config.mill.clone());
    let stock = service.stock(&user.username, season).await?;
    Ok(Json(stock))
}
