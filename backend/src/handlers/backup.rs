//! HTTP handlers for backup and restore

use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::{backup::RestoreStrategy, BackupService};
use crate::AppState;

/// A restore request: the backup file contents plus the chosen strategy.
#[derive(Debug, Deserialize)]
pub struct RestoreRequest {
    pub data: BTreeMap<String, String>,
    pub strategy: RestoreStrategy,
}

#[derive(Debug, Serialize)]
pub struct RestoreResponse {
    pub slots_written: usize,
}

/// Export every application slot as a flat backup object
pub async fn export_backup(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> AppResult<impl IntoResponse> {
    let service = BackupService::new(state.store);
    let data = service.export().await?;
    Ok(Json(data))
}

/// Preview which profiles and seasons a backup file contains
pub async fn preview_backup(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Json(data): Json<BTreeMap<String, String>>,
) -> AppResult<impl IntoResponse> {
    let service = BackupService::new(state.store);
    let preview = service.preview(&data)?;
    Ok(Json(preview))
}

/// Apply a backup file with the chosen strategy
pub async fn restore_backup(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Json(request): Json<RestoreRequest>,
) -> AppResult<impl IntoResponse> {
    let service = BackupService::new(state.store);
    let slots_written = service.restore(request.data, request.strategy).await?;
    Ok(Json(RestoreResponse { slots_written }))
}
