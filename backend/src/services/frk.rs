//! FRK purchase service
//!
//! Fortified Rice Kernel purchases only ever add stock; consumption is
//! derived from deliveries at the blend ratio.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::store::Store;
use shared::{
    frk_stock, legacy_storage_key, storage_key, FrkRecord, FrkStock, MillParams, RecordKind,
    RiceDeliveryRecord,
};

/// FRK service
#[derive(Clone)]
pub struct FrkService {
    store: Store,
    params: MillParams,
}

/// Input for logging an FRK purchase.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FrkInput {
    pub date: NaiveDate,
    #[validate(length(min = 1, message = "Invoice number is required"))]
    pub invoice_no: String,
    #[validate(length(min = 1, message = "Supplier is required"))]
    pub supplier: String,
    pub quantity_qtls: Decimal,
}

impl FrkService {
    /// Create a new FrkService instance
    pub fn new(store: Store, params: MillParams) -> Self {
        Self { store, params }
    }

    /// Log a purchase.
    pub async fn create(
        &self,
        username: &str,
        season: &str,
        input: FrkInput,
    ) -> AppResult<FrkRecord> {
        input
            .validate()
            .map_err(|err| AppError::ValidationError(err.to_string()))?;
        shared::validate_positive_quantity(input.quantity_qtls).map_err(|msg| {
            AppError::Validation {
                field: "quantityQtls".to_string(),
                message: msg.to_string(),
                message_hi: "मात्रा धनात्मक होनी चाहिए".to_string(),
            }
        })?;

        let mut records = self.list(username, season).await?;
        let record = FrkRecord {
            id: format!("frk-{}", Uuid::new_v4()),
            date: input.date,
            invoice_no: input.invoice_no,
            supplier: input.supplier,
            quantity_qtls: input.quantity_qtls,
        };
        records.push(record.clone());
        records.sort_by(|a, b| b.date.cmp(&a.date));
        self.save(username, season, &records).await?;
        Ok(record)
    }

    /// Purchases, most recent first.
    pub async fn list(&self, username: &str, season: &str) -> AppResult<Vec<FrkRecord>> {
        let mut records: Vec<FrkRecord> = self
            .store
            .load_collection(
                &storage_key(username, RecordKind::FrkRecords, season),
                &legacy_storage_key(RecordKind::FrkRecords, season),
            )
            .await?;
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }

    /// Delete a purchase record.
    pub async fn delete(&self, username: &str, season: &str, id: &str) -> AppResult<()> {
        let mut records = self.list(username, season).await?;
        let before = records.len();
        records.retain(|rec| rec.id != id);
        if records.len() == before {
            return Err(AppError::NotFound("FRK record".to_string()));
        }
        self.save(username, season, &records).await
    }

    /// Purchased / consumed / available totals.
    pub async fn stock(&self, username: &str, season: &str) -> AppResult<FrkStock> {
        let records = self.list(username, season).await?;
        let deliveries: Vec<RiceDeliveryRecord> = self
            .store
            .load_collection(
                &storage_key(username, RecordKind::RiceDeliveryRecords, season),
                &legacy_storage_key(RecordKind::RiceDeliveryRecords, season),
            )
            .await?;
        Ok(frk_stock(&records, &deliveries, &self.params))
    }

    async fn save(&self, username: &str, season: &str, records: &[FrkRecord]) -> AppResult<()> {
        self.store
            .save_collection(&storage_key(username, RecordKind::FrkRecords, season), records)
            .await
    }
}
