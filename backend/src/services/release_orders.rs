//! Release order management service
//!
//! Orders arrive by importing the official Dhan Delivery Order PDF through
//! the extraction service; from then on they are edited manually. Deleting
//! an order cascades to its lifting records, since those reference it by
//! order number.

use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::external::document_extraction::ReleaseOrderFields;
use crate::store::Store;
use shared::{
    legacy_storage_key, migrate_lifting_records, parse_storage_key, storage_key,
    validate_release_order, LiftingRecord, RecordKind, ReleaseOrder,
};

/// Seasons offered even before any data exists.
const DEFAULT_SEASONS: [&str; 2] = ["2024-2025", "2023-2024"];

/// Release order service
#[derive(Clone)]
pub struct ReleaseOrderService {
    store: Store,
}

/// What happened to an imported order.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum ImportOutcome {
    /// A new order was added to the requested season.
    Added { order: ReleaseOrder },
    /// An order with the same number already existed and was replaced.
    Updated { order: ReleaseOrder },
    /// The order belongs to a different procurement season and was saved
    /// there after the caller confirmed the switch.
    SavedToOtherSeason { order: ReleaseOrder, season: String },
}

impl ReleaseOrderService {
    /// Create a new ReleaseOrderService instance
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// List a user's release orders for a season, sorted by order number.
    pub async fn list(&self, username: &str, season: &str) -> AppResult<Vec<ReleaseOrder>> {
        let mut orders: Vec<ReleaseOrder> = self
            .store
            .load_collection(
                &storage_key(username, RecordKind::ReleaseOrders, season),
                &legacy_storage_key(RecordKind::ReleaseOrders, season),
            )
            .await?;
        orders.sort_by(|a, b| a.do_no.cmp(&b.do_no));
        Ok(orders)
    }

    /// Save an imported order into the right season.
    ///
    /// An order whose procurement year differs from the active season is only
    /// saved (into its own season's collection) when the caller has confirmed
    /// the switch; otherwise the mismatch is reported as a conflict.
    pub async fn save_imported(
        &self,
        username: &str,
        season: &str,
        fields: ReleaseOrderFields,
        confirm_season_switch: bool,
    ) -> AppResult<ImportOutcome> {
        let order = ReleaseOrder {
            do_no: fields.do_no,
            do_date: fields.do_date,
            lot_no: fields.lot_no,
            issue_center: fields.issue_center,
            godown: fields.godown,
            quantity: fields.quantity,
            valid_upto: fields.valid_upto,
            uparjan_varsh: fields.uparjan_varsh,
        };
        validate_release_order(&order).map_err(|msg| AppError::ValidationError(msg.to_string()))?;

        if !order.uparjan_varsh.is_empty() && order.uparjan_varsh != season {
            if !confirm_season_switch {
                return Err(AppError::Conflict {
                    resource: "season".to_string(),
                    message: format!(
                        "This release order is for season '{}', not the active season '{}'. Confirm the switch to save it there.",
                        order.uparjan_varsh, season
                    ),
                    message_hi: format!(
                        "यह रिलीज़ ऑर्डर सीज़न '{}' का है, सक्रिय सीज़न '{}' का नहीं",
                        order.uparjan_varsh, season
                    ),
                });
            }
            let target_season = order.uparjan_varsh.clone();
            self.upsert(username, &target_season, order.clone()).await?;
            return Ok(ImportOutcome::SavedToOtherSeason {
                order,
                season: target_season,
            });
        }

        let existed = self.upsert(username, season, order.clone()).await?;
        Ok(if existed {
            ImportOutcome::Updated { order }
        } else {
            ImportOutcome::Added { order }
        })
    }

    /// Manually edit an order. The order number itself is immutable.
    pub async fn update(
        &self,
        username: &str,
        season: &str,
        do_no: &str,
        updated: ReleaseOrder,
    ) -> AppResult<ReleaseOrder> {
        validate_release_order(&updated)
            .map_err(|msg| AppError::ValidationError(msg.to_string()))?;
        if updated.do_no != do_no {
            return Err(AppError::Validation {
                field: "doNo".to_string(),
                message: "The order number cannot be changed".to_string(),
                message_hi: "डी.ओ. क्रमांक बदला नहीं जा सकता".to_string(),
            });
        }

        let mut orders = self.list(username, season).await?;
        let slot = orders
            .iter_mut()
            .find(|ro| ro.do_no == do_no)
            .ok_or_else(|| AppError::NotFound("Release order".to_string()))?;
        *slot = updated.clone();
        orders.sort_by(|a, b| a.do_no.cmp(&b.do_no));
        self.save(username, season, &orders).await?;
        Ok(updated)
    }

    /// Delete an order and every lifting record written against it.
    pub async fn delete(&self, username: &str, season: &str, do_no: &str) -> AppResult<()> {
        let mut orders = self.list(username, season).await?;
        let before = orders.len();
        orders.retain(|ro| ro.do_no != do_no);
        if orders.len() == before {
            return Err(AppError::NotFound("Release order".to_string()));
        }
        self.save(username, season, &orders).await?;

        let lifting_key = storage_key(username, RecordKind::LiftingRecords, season);
        let raw = self
            .store
            .load_values(
                &lifting_key,
                &legacy_storage_key(RecordKind::LiftingRecords, season),
            )
            .await?;
        let mut lifts: Vec<LiftingRecord> = migrate_lifting_records(raw);
        lifts.retain(|lr| lr.do_no != do_no);
        self.store.save_collection(&lifting_key, &lifts).await?;

        tracing::info!(username, season, do_no, "deleted release order and its lifting records");
        Ok(())
    }

    /// Seasons known for this user: defaults plus every season that has a
    /// release-order slot.
    pub async fn list_seasons(&self, username: &str) -> AppResult<Vec<String>> {
        let mut seasons: Vec<String> = DEFAULT_SEASONS.iter().map(|s| s.to_string()).collect();
        for (key, _) in self.store.list_raw().await? {
            if let Some(parsed) = parse_storage_key(&key) {
                let owned = parsed.username.as_deref().map_or(true, |u| u == username);
                if owned && parsed.kind == RecordKind::ReleaseOrders {
                    seasons.push(parsed.season);
                }
            }
        }
        seasons.sort_by(|a, b| b.cmp(a));
        seasons.dedup();
        Ok(seasons)
    }

    /// Insert or replace one order in a season's collection. Returns whether
    /// an order with the same number already existed.
    async fn upsert(&self, username: &str, season: &str, order: ReleaseOrder) -> AppResult<bool> {
        let mut orders = self.list(username, season).await?;
        let existed = match orders.iter_mut().find(|ro| ro.do_no == order.do_no) {
            Some(slot) => {
                *slot = order;
                true
            }
            None => {
                orders.push(order);
                false
            }
        };
        orders.sort_by(|a, b| a.do_no.cmp(&b.do_no));
        self.save(username, season, &orders).await?;
        Ok(existed)
    }

    async fn save(&self, username: &str, season: &str, orders: &[ReleaseOrder]) -> AppResult<()> {
        self.store
            .save_collection(
                &storage_key(username, RecordKind::ReleaseOrders, season),
                orders,
            )
            .await
    }
}
