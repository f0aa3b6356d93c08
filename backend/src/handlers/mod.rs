//! HTTP handlers for Mill Mitra

mod auth;
mod backup;
mod daily_logs;
mod deliveries;
mod frk;
mod health;
mod lifting;
mod release_orders;
mod reports;

pub use auth::*;
pub use backup::*;
pub use daily_logs::*;
pub use deliveries::*;
pub use frk::*;
pub use health::*;
pub use lifting::*;
pub use release_orders::*;
pub use reports::*;

use axum::extract::Multipart;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Uploads above this size are rejected before extraction.
pub(crate) const FILE_SIZE_LIMIT: usize = 5 * 1024 * 1024;

pub(crate) const ACCEPTED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// Season selector carried by every season-scoped route.
#[derive(Debug, Deserialize)]
pub struct SeasonQuery {
    pub season: String,
}

impl SeasonQuery {
    /// The season after format validation.
    pub fn checked(&self) -> AppResult<&str> {
        shared::validate_season(&self.season).map_err(|msg| AppError::Validation {
            field: "season".to_string(),
            message: msg.to_string(),
            message_hi: "सीज़न अमान्य है".to_string(),
        })?;
        Ok(&self.season)
    }
}

/// Pull the uploaded file out of a multipart body.
pub(crate) async fn read_upload(multipart: &mut Multipart) -> AppResult<(Vec<u8>, String)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::ValidationError(format!("Invalid upload: {}", err)))?
    {
        if field.name() == Some("file") {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|err| AppError::ValidationError(format!("Invalid upload: {}", err)))?;
            if bytes.len() > FILE_SIZE_LIMIT {
                return Err(AppError::ValidationError(format!(
                    "File is too large. Upload a file smaller than {}MB.",
                    FILE_SIZE_LIMIT / 1024 / 1024
                )));
            }
            return Ok((bytes.to_vec(), content_type));
        }
    }
    Err(AppError::ValidationError(
        "Missing 'file' field in upload".to_string(),
    ))
}
