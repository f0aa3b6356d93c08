//! Authentication handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::{auth::RecoverInput, auth::RegisterInput, AuthService, ReleaseOrderService};
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Register a new profile
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<impl axum::response::IntoResponse> {
    let service = AuthService::new(state.store, &state.config);
    let tokens = service.register(input).await?;
    Ok((StatusCode::CREATED, Json(tokens)))
}

/// Log in with username and password
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<impl axum::response::IntoResponse> {
    let service = AuthService::new(state.store, &state.config);
    let tokens = service.login(&input.username, &input.password).await?;
    Ok(Json(tokens))
}

/// Reset a forgotten password with the recovery phrase
pub async fn recover(
    State(state): State<AppState>,
    Json(input): Json<RecoverInput>,
) -> AppResult<impl axum::response::IntoResponse> {
    let service = AuthService::new(state.store, &state.config);
    service.recover(input).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Seasons available to the current user
pub async fn list_seasons(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<impl axum::response::IntoResponse> {
    let service = ReleaseOrderService::new(state.store);
    let seasons = service.list_seasons(&user.username).await?;
    Ok(Json(seasons))
}
