//! Paddy lifting service
//!
//! Wraps the pure lift allocator with fresh snapshots of the season's
//! collections: compute the distribution plan for display, then record the
//! lift as one or two appended records.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::store::Store;
use shared::{
    allocate_lift, legacy_storage_key, migrate_lifting_records, pending_orders,
    plan_distribution, storage_key, tare_weight_qtls, LiftInput, LiftSlot, LiftingRecord,
    MillParams, RecordKind, ReleaseOrder,
};

/// Lifting service
#[derive(Clone)]
pub struct LiftingService {
    store: Store,
    params: MillParams,
}

/// Input for planning or recording a lift.
///
/// Bag weights default to the configured constants when omitted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiftRequest {
    pub godown: String,
    pub gross_quantity: Decimal,
    #[serde(default)]
    pub rst_no: String,
    #[serde(default)]
    pub truck_no: String,
    #[serde(default)]
    pub number_of_new_bags: u32,
    #[serde(default)]
    pub new_bag_weight_g: Option<Decimal>,
    #[serde(default)]
    pub number_of_used_bags: u32,
    #[serde(default)]
    pub used_bag_weight_g: Option<Decimal>,
    #[serde(default)]
    pub second_do_no: Option<String>,
}

impl LiftingService {
    /// Create a new LiftingService instance
    pub fn new(store: Store, params: MillParams) -> Self {
        Self { store, params }
    }

    /// Distribution plan for the given weighing-slip values, for display
    /// before the user commits the lift.
    pub async fn plan(
        &self,
        username: &str,
        season: &str,
        request: &LiftRequest,
    ) -> AppResult<Vec<LiftSlot>> {
        let orders = self.load_orders(username, season).await?;
        let lifts = self.load_lifts(username, season).await?;

        let tare = tare_weight_qtls(
            request.number_of_new_bags,
            request
                .new_bag_weight_g
                .unwrap_or(self.params.new_bag_weight_g),
            request.number_of_used_bags,
            request
                .used_bag_weight_g
                .unwrap_or(self.params.used_bag_weight_g),
        );
        let net = request.gross_quantity - tare;
        let candidates = pending_orders(&orders, &lifts, &request.godown);
        Ok(plan_distribution(net, &candidates))
    }

    /// Record a lift, appending one record per order it touches.
    pub async fn record(
        &self,
        username: &str,
        season: &str,
        request: LiftRequest,
    ) -> AppResult<Vec<LiftingRecord>> {
        let orders = self.load_orders(username, season).await?;
        let mut lifts = self.load_lifts(username, season).await?;

        let input = LiftInput {
            godown: request.godown,
            gross_quantity: request.gross_quantity,
            rst_no: request.rst_no,
            truck_no: request.truck_no,
            number_of_new_bags: request.number_of_new_bags,
            new_bag_weight_g: request
                .new_bag_weight_g
                .unwrap_or(self.params.new_bag_weight_g),
            number_of_used_bags: request.number_of_used_bags,
            used_bag_weight_g: request
                .used_bag_weight_g
                .unwrap_or(self.params.used_bag_weight_g),
            second_do_no: request.second_do_no,
        };

        let new_records = allocate_lift(&input, &orders, &lifts, Utc::now())?;
        lifts.extend(new_records.iter().cloned());
        self.store
            .save_collection(
                &storage_key(username, RecordKind::LiftingRecords, season),
                &lifts,
            )
            .await?;

        let total: Decimal = new_records.iter().map(|lr| lr.net_paddy_quantity).sum();
        tracing::info!(
            username,
            season,
            records = new_records.len(),
            %total,
            "recorded paddy lift"
        );
        Ok(new_records)
    }

    /// All lifting records for the season, most recent first.
    pub async fn list(&self, username: &str, season: &str) -> AppResult<Vec<LiftingRecord>> {
        let mut lifts = self.load_lifts(username, season).await?;
        lifts.sort_by(|a, b| b.lifting_date.cmp(&a.lifting_date));
        Ok(lifts)
    }

    /// Delete one lifting record.
    pub async fn delete(&self, username: &str, season: &str, id: &str) -> AppResult<()> {
        let mut lifts = self.load_lifts(username, season).await?;
        let before = lifts.len();
        lifts.retain(|lr| lr.id != id);
        if lifts.len() == before {
            return Err(AppError::NotFound("Lifting record".to_string()));
        }
        self.store
            .save_collection(
                &storage_key(username, RecordKind::LiftingRecords, season),
                &lifts,
            )
            .await
    }

    async fn load_orders(&self, username: &str, season: &str) -> AppResult<Vec<ReleaseOrder>> {
        self.store
            .load_collection(
                &storage_key(username, RecordKind::ReleaseOrders, season),
                &legacy_storage_key(RecordKind::ReleaseOrders, season),
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
}
