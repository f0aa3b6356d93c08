//! Daily stock log service
//!
//! Every write re-validates the entire chronological chain: an edit to an
//! early day changes every later day's WIP, so the gate must look at the
//! whole candidate set before anything is committed.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::Store;
use shared::{
    average_bag_weight_qtls, bag_inventory, daily_totals, empty_bag_availability,
    legacy_storage_key, migrate_daily_logs, migrate_lifting_records, recompute_chain,
    rice_quantity_from_bags, storage_key, validate_chain, BagInventory, DailyStockLog,
    DailyTotals, LiftingRecord, MillParams, RecordKind, RiceDeliveryRecord,
};

/// Daily stock log service
#[derive(Clone)]
pub struct DailyLogService {
    store: Store,
    params: MillParams,
}

/// User-entered fields of a daily log.
///
/// Rice quantity is always derived from the bag count; paddy consumed and
/// WIP are derived over the whole chain.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLogInput {
    /// Present when editing an existing entry.
    #[serde(default)]
    pub id: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub paddy_bags_opened_new: u32,
    #[serde(default)]
    pub paddy_bags_opened_used: u32,
    #[serde(default)]
    pub rice_bags_new: u32,
    #[serde(default)]
    pub bran_sold: Decimal,
    #[serde(default)]
    pub husk_sold: Decimal,
    #[serde(default)]
    pub sortex_broken_sold: Decimal,
    #[serde(default)]
    pub non_sortex_broken_sold: Decimal,
    #[serde(default)]
    pub murgidana_sold: Decimal,
    #[serde(default)]
    pub rejection_sold: Decimal,
}

/// Processed view of the season's daily logs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLogView {
    /// Logs with derived fields recomputed, most recent first.
    pub logs: Vec<DailyStockLog>,
    pub totals: DailyTotals,
    pub average_bag_weight_qtls: Decimal,
    pub bag_inventory: BagInventory,
    /// Empty new bags available for packing rice.
    pub empty_bags_available: i64,
}

impl DailyLogService {
    /// Create a new DailyLogService instance
    pub fn new(store: Store, params: MillParams) -> Self {
        Self { store, params }
    }

    /// The processed ledger view for the season.
    pub async fn list(&self, username: &str, season: &str) -> AppResult<DailyLogView> {
        let logs = self.load_logs(username, season).await?;
        let lifts = self.load_lifts(username, season).await?;
        let deliveries: Vec<RiceDeliveryRecord> = self
            .store
            .load_collection(
                &storage_key(username, RecordKind::RiceDeliveryRecords, season),
                &legacy_storage_key(RecordKind::RiceDeliveryRecords, season),
            )
            .await?;

        let average = average_bag_weight_qtls(&lifts, &self.params);
        let processed = recompute_chain(&logs, average);
        let totals = daily_totals(&processed);
        let inventory = bag_inventory(&lifts, &processed);
        let empty_bags = empty_bag_availability(&processed, &deliveries);

        let mut newest_first = processed;
        newest_first.reverse();

        Ok(DailyLogView {
            logs: newest_first,
            totals,
            average_bag_weight_qtls: average,
            bag_inventory: inventory,
            empty_bags_available: empty_bags,
        })
    }

    /// Add or edit a daily log entry.
    ///
    /// The candidate chain (existing entries with the new or edited one
    /// merged in, re-sorted by date) is validated in full before anything is
    /// written; a violation anywhere in the chain blocks the save.
    pub async fn upsert(
        &self,
        username: &str,
        season: &str,
        input: DailyLogInput,
    ) -> AppResult<DailyStockLog> {
        let mut logs = self.load_logs(username, season).await?;

        let entry = DailyStockLog {
            id: input
                .id
                .clone()
                .unwrap_or_else(|| format!("daily-{}", Uuid::new_v4())),
            date: input.date,
            paddy_bags_opened_new: input.paddy_bags_opened_new,
            paddy_bags_opened_used: input.paddy_bags_opened_used,
            paddy_consumed_qtls: Decimal::ZERO,
            rice_bags_new: input.rice_bags_new,
            rice_quantity: rice_quantity_from_bags(input.rice_bags_new, &self.params),
            bran_sold: input.bran_sold,
            husk_sold: input.husk_sold,
            sortex_broken_sold: input.sortex_broken_sold,
            non_sortex_broken_sold: input.non_sortex_broken_sold,
            murgidana_sold: input.murgidana_sold,
            rejection_sold: input.rejection_sold,
            work_in_progress_qtls: Decimal::ZERO,
        };

        if input.id.is_some() {
            let slot = logs
                .iter_mut()
                .find(|log| log.id == entry.id)
                .ok_or_else(|| AppError::NotFound("Daily log".to_string()))?;
            *slot = entry.clone();
        } else {
            logs.push(entry.clone());
        }

        let lifts = self.load_lifts(username, season).await?;
        let average = average_bag_weight_qtls(&lifts, &self.params);
        validate_chain(&logs, average)?;

        // Persist the chain with its derived fields current.
        let processed = recompute_chain(&logs, average);
        let saved = processed
            .iter()
            .find(|log| log.id == entry.id)
            .cloned()
            .unwrap_or(entry);
        self.save_logs(username, season, &processed).await?;
        Ok(saved)
    }

    /// Delete a daily log entry.
    ///
    /// Later days' WIP shifts accordingly on the next read; the remaining
    /// chain is not re-gated on delete.
    pub async fn delete(&self, username: &str, season: &str, id: &str) -> AppResult<()> {
        let mut logs = self.load_logs(username, season).await?;
        let before = logs.len();
        logs.retain(|log| log.id != id);
        if logs.len() == before {
            return Err(AppError::NotFound("Daily log".to_string()));
        }

        let lifts = self.load_lifts(username, season).await?;
        let average = average_bag_weight_qtls(&lifts, &self.params);
        let processed = recompute_chain(&logs, average);
        self.save_logs(username, season, &processed).await
    }

    async fn load_logs(&self, username: &str, season: &str) -> AppResult<Vec<DailyStockLog>> {
        let raw = self
            .store
            .load_values(
                &storage_key(username, RecordKind::DailyStockLogs, season),
                &legacy_storage_key(RecordKind::DailyStockLogs, season),
            )
            .await?;
        Ok(migrate_daily_logs(raw))
    }

    async fn load_lifts(&self, username: &str, season: &str) -> AppResult<Vec<LiftingRecord>> {
        let raw = self
            .store
            .load_values(
                &storage_key(username, RecordKind::LiftingRecords, season),
                &legacy_storage_key(RecordKind::LiftingRecords, season),
            )
            .await?;
        Ok(migrate_lifting_records(raw))
    }

    async fn save_logs(
        &self,
        username: &str,
        season: &str,
        logs: &[DailyStockLog],
    ) -> AppResult<()> {
        self.store
            .save_collection(
                &storage_key(username, RecordKind::DailyStockLogs, season),
                logs,
            )
            .await
    }
}
