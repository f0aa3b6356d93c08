//! HTTP handlers for release order management

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::{read_upload, SeasonQuery};
use crate::middleware::CurrentUser;
use crate::services::ReleaseOrderService;
use crate::AppState;
use shared::ReleaseOrder;

#[derive(Debug, Deserialize)]
pub struct ImportQuery {
    pub season: String,
    /// Set when the user has confirmed saving an order into its own,
    /// different season.
    #[serde(default)]
    pub confirm_season_switch: bool,
}

/// List release orders for a season
pub async fn list_release_orders(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<SeasonQuery>,
) -> AppResult<impl IntoResponse> {
    let season = query.checked()?;
    let service = ReleaseOrderService::new(state.store);
    let orders = service.list(&user.username, season).await?;
    Ok(Json(orders))
}

/// Import a release order from the official PDF
pub async fn import_release_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ImportQuery>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    shared::validate_season(&query.season)
        .map_err(|msg| AppError::ValidationError(msg.to_string()))?;

    let (bytes, content_type) = read_upload(&mut multipart).await?;
    if content_type != "application/pdf" {
        return Err(AppError::ValidationError(
            "Please upload a valid PDF file".to_string(),
        ));
    }
    let pdf_base64 = BASE64.encode(&bytes);

    if !state.extraction.validate_release_order(&pdf_base64).await? {
        return Err(AppError::ValidationError(
            "Incorrect document type. Upload a 'Dhan Delivery Order' (धान डिलेवरी आर्डर) only."
                .to_string(),
        ));
    }
    let fields = state.extraction.extract_release_order(&pdf_base64).await?;

    let service = ReleaseOrderService::new(state.store);
    let outcome = service
        .save_imported(
            &user.username,
            &query.season,
            fields,
            query.confirm_season_switch,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// Manually edit a release order
pub async fn update_release_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(do_no): Path<String>,
    Query(query): Query<SeasonQuery>,
    Json(order): Json<ReleaseOrder>,
) -> AppResult<impl IntoResponse> {
    let season = query.checked()?;
    let service = ReleaseOrderService::new(state.store);
    let updated = service.update(&user.username, season, &do_no, order).await?;
    Ok(Json(updated))
}

/// Delete a release order and its lifting records
pub async fn delete_release_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(do_no): Path<String>,
    Query(query): Query<SeasonQuery>,
) -> AppResult<impl IntoResponse> {
    let season = query.checked()?;
    let service = ReleaseOrderService::new(state.store);
    service.delete(&user.username, season, &do_no).await?;
    Ok(StatusCode::NO_CONTENT)
}
