//! HTTP handlers for CMR deposit orders and rice deliveries

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::error::{AppError, AppResult};
use crate::handlers::{read_upload, SeasonQuery};
use crate::middleware::CurrentUser;
use crate::services::{
    deliveries::CmrOrderUpdate, deliveries::DeliveryInput, DeliveryService,
};
use crate::AppState;

/// Import a CMR deposit order from the official PDF
pub async fn import_cmr_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<SeasonQuery>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let season = query.checked()?.to_string();

    let (bytes, content_type) = read_upload(&mut multipart).await?;
    if content_type != "application/pdf" {
        return Err(AppError::ValidationError(
            "Please upload a valid PDF file".to_string(),
        ));
    }
    let pdf_base64 = BASE64.encode(&bytes);

    if !state.extraction.validate_cmr_order(&pdf_base64).await? {
        return Err(AppError::ValidationError(
            "Incorrect document type. Upload a 'CMR DEPOSIT ORDER' only.".to_string(),
        ));
    }
    let fields = state.extraction.extract_cmr_order(&pdf_base64).await?;

    let service = DeliveryService::new(state.store, state.config.mill.clone());
    let order = service.import_cmr(&user.username, &season, fields).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// List CMR deposit orders
pub async fn list_cmr_orders(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<SeasonQuery>,
) -> AppResult<impl IntoResponse> {
    let season = query.checked()?;
    let service = DeliveryService::new(state.store, state.config.mill.clone());
    let orders = service.list_cmr(&user.username, season).await?;
    Ok(Json(orders))
}

/// Manually edit a CMR deposit order
pub async fn update_cmr_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Query(query): Query<SeasonQuery>,
    Json(update): Json<CmrOrderUpdate>,
) -> AppResult<impl IntoResponse> {
    let season = query.checked()?;
    let service = DeliveryService::new(state.store, state.config.mill.clone());
    let order = service
        .update_cmr(&user.username, season, &id, update)
        .await?;
    Ok(Json(order))
}

/// Delete a CMR deposit order
pub async fn delete_cmr_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Query(query): Query<SeasonQuery>,
) -> AppResult<impl IntoResponse> {
    let season = query.checked()?;
    let service = DeliveryService::new(state.store, state.config.mill.clone());
    service.delete_cmr(&user.username, season, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create a delivery challan
pub async fn create_delivery(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<SeasonQuery>,
    Json(input): Json<DeliveryInput>,
) -> AppResult<impl IntoResponse> {
    let season = query.checked()?;
    let service = DeliveryService::new(state.store, state.config.mill.clone());
    let record = service.create_delivery(&user.username, season, input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// List delivery challans
pub async fn list_deliveries(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<SeasonQuery>,
) -> AppResult<impl IntoResponse> {
    let season = query.checked()?;
    let service = DeliveryService::new(state.store, state.config.mill.clone());
    let records = service.list_deliveries(&user.username, season).await?;
    Ok(Json(records))
}

/// Delete a delivery challan
pub async fn delete_delivery(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Query(query): Query<SeasonQuery>,
) -> AppResult<impl IntoResponse> {
    let season = query.checked()?;
    let service = DeliveryService::new(state.store, state.config.mill.clone());
    service.delete_delivery(&user.username, season, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Stock position for the delivery page
pub async fn delivery_summary(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<SeasonQuery>,
) -> AppResult<impl IntoResponse> {
    let season = query.checked()?;
    let service = DeliveryService::new(state.store, state.config.mill.clone());
    let summary = service.summary(&user.username, season).await?;
    Ok(Json(summary))
}
