//! Reporting service
//!
//! Registers and season summaries: every figure is a full reduction over a
//! fresh snapshot of the record collections.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::store::Store;
use rust_decimal::Decimal;
use shared::{
    bag_inventory, byproduct_totals, do_wise_summary, empty_bag_availability, godown_summary,
    legacy_storage_key, migrate_daily_logs, migrate_lifting_records, stock_summary, storage_key,
    BagInventory, ByProductTotals, DailyStockLog, DoSummary, FrkRecord, GodownSummary,
    LiftingRecord, MillParams, RecordKind, ReleaseOrder, RiceDeliveryRecord, StockSummary,
};

/// Reports service
#[derive(Clone)]
pub struct ReportsService {
    store: Store,
    params: MillParams,
}

/// Filters for the lifting register.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiftingRegisterFilter {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub godown: Option<String>,
}

/// Column totals over a filtered lifting register.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LiftingRegisterTotals {
    pub gross_qtls: Decimal,
    pub bag_weight_qtls: Decimal,
    pub net_qtls: Decimal,
    pub new_bags: u64,
    pub used_bags: u64,
}

/// A filtered lifting register with its totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiftingRegister {
    pub records: Vec<LiftingRecord>,
    pub totals: LiftingRegisterTotals,
}

/// The bag-side report: inventory plus empty bags free for packing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BagReport {
    pub inventory: BagInventory,
    pub empty_bags_available: i64,
}

impl ReportsService {
    /// Create a new ReportsService instance
    pub fn new(store: Store, params: MillParams) -> Self {
        Self { store, params }
    }

    /// Season stock position across paddy, rice and FRK.
    pub async fn stock_summary(&self, username: &str, season: &str) -> AppResult<StockSummary> {
        let lifts = self.load_lifts(username, season).await?;
        let logs = self.load_logs(username, season).await?;
        let deliveries: Vec<RiceDeliveryRecord> = self
            .load(username, season, RecordKind::RiceDeliveryRecords)
            .await?;
        let frk: Vec<FrkRecord> = self.load(username, season, RecordKind::FrkRecords).await?;
        Ok(stock_summary(&lifts, &logs, &deliveries, &frk, &self.params))
    }

    /// Bag inventory and empty-bag availability.
    pub async fn bag_report(&self, username: &str, season: &str) -> AppResult<BagReport> {
        let lifts = self.load_lifts(username, season).await?;
        let logs = self.load_logs(username, season).await?;
        let deliveries: Vec<RiceDeliveryRecord> = self
            .load(username, season, RecordKind::RiceDeliveryRecords)
            .await?;
        Ok(BagReport {
            inventory: bag_inventory(&lifts, &logs),
            empty_bags_available: empty_bag_availability(&logs, &deliveries),
        })
    }

    /// Godown-wise allotment / lifted / pending register.
    pub async fn godown_register(
        &self,
        username: &str,
        season: &str,
    ) -> AppResult<Vec<GodownSummary>> {
        let orders: Vec<ReleaseOrder> = self
            .load(username, season, RecordKind::ReleaseOrders)
            .await?;
        let lifts = self.load_lifts(username, season).await?;
        Ok(godown_summary(&orders, &lifts))
    }

    /// DO-wise paddy and rice position register.
    pub async fn do_register(&self, username: &str, season: &str) -> AppResult<Vec<DoSummary>> {
        let orders: Vec<ReleaseOrder> = self
            .load(username, season, RecordKind::ReleaseOrders)
            .await?;
        let lifts = self.load_lifts(username, season).await?;
        let deliveries: Vec<RiceDeliveryRecord> = self
            .load(username, season, RecordKind::RiceDeliveryRecords)
            .await?;
        Ok(do_wise_summary(&orders, &lifts, &deliveries, &self.params))
    }

    /// Season totals per by-product category.
    pub async fn byproducts(&self, username: &str, season: &str) -> AppResult<ByProductTotals> {
        let logs = self.load_logs(username, season).await?;
        Ok(byproduct_totals(&logs))
    }

    /// The lifting register, filtered by date range and godown, most recent
    /// first, with column totals.
    pub async fn lifting_register(
        &self,
        username: &str,
        season: &str,
        filter: &LiftingRegisterFilter,
    ) -> AppResult<LiftingRegister> {
        let mut records = self.load_lifts(username, season).await?;

        if let Some(start) = filter.start_date {
            records.retain(|lr| lr.lifting_date.date_naive() >= start);
        }
        if let Some(end) = filter.end_date {
            records.retain(|lr| lr.lifting_date.date_naive() <= end);
        }
        if let Some(godown) = &filter.godown {
            records.retain(|lr| &lr.godown == godown);
        }
        records.sort_by(|a, b| b.lifting_date.cmp(&a.lifting_date));

        let totals = records
            .iter()
            .fold(LiftingRegisterTotals::default(), |mut acc, lr| {
                acc.gross_qtls += lr.gross_lifted_quantity;
                acc.bag_weight_qtls += lr.total_bag_weight;
                acc.net_qtls += lr.net_paddy_quantity;
                acc.new_bags += lr.number_of_new_bags as u64;
                acc.used_bags += lr.number_of_used_bags as u64;
                acc
            });

        Ok(LiftingRegister { records, totals })
    }

    /// The lifting register rendered as CSV for download.
    pub async fn lifting_register_csv(
        &self,
        username: &str,
        season: &str,
        filter: &LiftingRegisterFilter,
    ) -> AppResult<String> {
        let register = self.lifting_register(username, season, filter).await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record([
                "Date",
                "RST No.",
                "DO No.",
                "Godown",
                "Truck No.",
                "Gross (Qtls)",
                "Bag Weight (Qtls)",
                "Net Paddy (Qtls)",
                "New Bags",
                "Used Bags",
            ])
            .map_err(|err| AppError::Internal(format!("CSV write failed: {}", err)))?;
        for lr in &register.records {
            writer
                .write_record([
                    lr.lifting_date.date_naive().to_string(),
                    lr.rst_no.clone(),
                    lr.do_no.clone(),
                    lr.godown.clone(),
                    lr.truck_no.clone(),
                    lr.gross_lifted_quantity.to_string(),
                    lr.total_bag_weight.to_string(),
                    lr.net_paddy_quantity.to_string(),
                    lr.number_of_new_bags.to_string(),
                    lr.number_of_used_bags.to_string(),
                ])
                .map_err(|err| AppError::Internal(format!("CSV write failed: {}", err)))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|err| AppError::Internal(format!("CSV write failed: {}", err)))?;
        String::from_utf8(bytes).map_err(|err| AppError::Internal(format!("CSV encoding: {}", err)))
    }

    async fn load<T: serde::de::DeserializeOwned>(
        &self,
        username: &str,
        season: &str,
        kind: RecordKind,
    ) -> AppResult<Vec<T>> {
        self.store
            .load_collection(
                &storage_key(username, kind, season),
                &legacy_storage_key(kind, season),
            )
            .await
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
}
