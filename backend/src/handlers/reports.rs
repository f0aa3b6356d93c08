//! HTTP handlers for registers and reports

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::AppResult;
use crate::handlers::SeasonQuery;
use crate::middleware::CurrentUser;
use crate::services::{reports::LiftingRegisterFilter, ReportsService};
use crate::AppState;

/// Season plus the lifting-register filters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterQuery {
    pub season: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub godown: Option<String>,
}

impl RegisterQuery {
    fn split(self) -> (SeasonQuery, LiftingRegisterFilter) {
        (
            SeasonQuery {
                season: self.season,
            },
            LiftingRegisterFilter {
                start_date: self.start_date,
                end_date: self.end_date,
                godown: self.godown,
            },
        )
    }
}

/// Season stock summary across paddy, rice and FRK
pub async fn stock_report(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<SeasonQuery>,
) -> AppResult<impl IntoResponse> {
    let season = query.checked()?;
    let service = ReportsService::new(state.store, state.config.mill.clone());
    let summary = service.stock_summary(&user.username, season).await?;
    Ok(Json(summary))
}

/// Bag inventory and empty-bag availability
pub async fn bag_report(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<SeasonQuery>,
) -> AppResult<impl IntoResponse> {
    let season = query.checked()?;
    let service = ReportsService::new(state.store, state.config.mill.clone());
    let report = service.bag_report(&user.username, season).await?;
    Ok(Json(report))
}

/// Godown-wise register
pub async fn godown_report(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<SeasonQuery>,
) -> AppResult<impl IntoResponse> {
    let season = query.checked()?;
    let service = ReportsService::new(state.store, state.config.mill.clone());
    let register = service.godown_register(&user.username, season).await?;
    Ok(Json(register))
}

/// DO-wise register
pub async fn do_report(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<SeasonQuery>,
) -> AppResult<impl IntoResponse> {
    let season = query.checked()?;
    let service = ReportsService::new(state.store, state.config.mill.clone());
    let register = service.do_register(&user.username, season).await?;
    Ok(Json(register))
}

/// Season by-product totals
pub async fn byproduct_report(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<SeasonQuery>,
) -> AppResult<impl IntoResponse> {
    let season = query.checked()?;
    let service = ReportsService::new(state.store, state.config.mill.clone());
    let totals = service.byproducts(&user.username, season).await?;
    Ok(Json(totals))
}

/// The filtered lifting register
pub async fn lifting_register_report(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<RegisterQuery>,
) -> AppResult<impl IntoResponse> {
    let (season, filter) = query.split();
    let season = season.checked()?.to_string();
    let service = ReportsService::new(state.store, state.config.mill.clone());
    let register = service
        .lifting_register(&user.username, &season, &filter)
        .await?;
    Ok(Json(register))
}

/// The filtered lifting register as a CSV download
pub async fn lifting_register_csv(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<RegisterQuery>,
) -> AppResult<impl IntoResponse> {
    let (season, filter) = query.split();
    let season = season.checked()?.to_string();
    let service = ReportsService::new(state.store, state.config.mill.clone());
    let csv = service
        .lifting_register_csv(&user.username, &season, &filter)
        .await?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"lifting-register.csv\"",
            ),
        ],
        csv,
    ))
}
