//! HTTP handlers for paddy lifting

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::str::FromStr;

use crate::error::{AppError, AppResult};
use crate::handlers::{read_upload, SeasonQuery, ACCEPTED_IMAGE_TYPES};
use crate::middleware::CurrentUser;
use crate::services::{lifting::LiftRequest, LiftingService, ReportsService};
use crate::AppState;

/// Weighing-slip values ready to prefill the lifting form.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeighingSlipPrefill {
    pub rst_no: Option<String>,
    pub truck_no: Option<String>,
    /// The slip's net weight converted from kilograms to quintals.
    pub gross_quantity_qtls: Option<Decimal>,
    pub number_of_bags: Option<String>,
}

/// Godown-wise pending board
pub async fn godown_board(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<SeasonQuery>,
) -> AppResult<impl IntoResponse> {
    let season = query.checked()?;
    let service = ReportsService::new(state.store, state.config.mill.clone());
    let board = service.godown_register(&user.username, season).await?;
    Ok(Json(board))
}

/// Preview the distribution plan for a lift
pub async fn plan_lift(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<SeasonQuery>,
    Json(request): Json<LiftRequest>,
) -> AppResult<impl IntoResponse> {
    let season = query.checked()?;
    let service = LiftingService::new(state.store, state.config.mill.clone());
    let plan = service.plan(&user.username, season, &request).await?;
    Ok(Json(plan))
}

/// Record a lift
pub async fn record_lift(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<SeasonQuery>,
    Json(request): Json<LiftRequest>,
) -> AppResult<impl IntoResponse> {
    let season = query.checked()?;
    let service = LiftingService::new(state.store, state.config.mill.clone());
    let records = service.record(&user.username, season, request).await?;
    Ok((StatusCode::CREATED, Json(records)))
}

/// List lifting records
pub async fn list_lifting_records(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<SeasonQuery>,
) -> AppResult<impl IntoResponse> {
    let season = query.checked()?;
    let service = LiftingService::new(state.store, state.config.mill.clone());
    let records = service.list(&user.username, season).await?;
    Ok(Json(records))
}

/// Delete a lifting record
pub async fn delete_lifting_record(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Query(query): Query<SeasonQuery>,
) -> AppResult<impl IntoResponse> {
    let season = query.checked()?;
    let service = LiftingService::new(state.store, state.config.mill.clone());
    service.delete(&user.username, season, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Extract weighing-slip fields from an uploaded photo
pub async fn extract_weighing_slip(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let (bytes, content_type) = read_upload(&mut multipart).await?;
    if !ACCEPTED_IMAGE_TYPES.contains(&content_type.as_str()) {
        return Err(AppError::ValidationError(
            "Please upload a valid image file (JPG, PNG)".to_string(),
        ));
    }

    let image_base64 = BASE64.encode(&bytes);
    let fields = state
        .extraction
        .extract_weighing_slip(&image_base64, &content_type)
        .await?;

    // The slip's net weight is printed in kilograms; the form works in
    // quintals to three decimals.
    let gross_quantity_qtls = fields
        .lifted_quantity_in_kg
        .as_deref()
        .and_then(|kg| Decimal::from_str(kg.trim()).ok())
        .map(|kg| {
            (kg / Decimal::from(100))
                .round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
        });

    Ok(Json(WeighingSlipPrefill {
        rst_no: fields.rst_no,
        truck_no: fields.truck_no,
        gross_quantity_qtls,
        number_of_bags: fields.number_of_bags,
    }))
}
