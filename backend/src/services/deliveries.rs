//! Rice delivery service: CMR deposit orders and delivery challans
//!
//! A CMR deposit order authorizes deliveries against a release order and may
//! only be imported once lifting for that order is complete. Each delivery
//! challan is gated on plain-rice stock, FRK stock and the order's remaining
//! rice entitlement.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::external::document_extraction::CmrOrderFields;
use crate::store::Store;
use shared::{
    agency_split, frk_stock, legacy_storage_key, migrate_daily_logs, migrate_lifting_records,
    plain_rice_stock, qty_tolerance, storage_key, AgencySplit, CmrDepositOrder, DailyStockLog,
    DeliveryAgency, FrkRecord, LiftingRecord, MillParams, RecordKind, ReleaseOrder,
    RiceDeliveryRecord,
};

/// Delivery service
#[derive(Clone)]
pub struct DeliveryService {
    store: Store,
    params: MillParams,
}

/// Input for creating a delivery challan.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryInput {
    pub do_no: String,
    pub cmr_order_no: String,
    pub agency: DeliveryAgency,
    pub date: NaiveDate,
    #[validate(length(min = 1, message = "Vehicle number is required"))]
    pub vehicle_no: String,
    #[validate(length(min = 1, message = "Batch number is required"))]
    pub batch_no: String,
    #[validate(range(min = 1, message = "At least one bag must be delivered"))]
    pub bags_delivered: u32,
}

/// Manually editable fields of a CMR deposit order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmrOrderUpdate {
    pub do_no: String,
    pub order_no: String,
    pub deposit_date: String,
    pub deposited_at: String,
}

/// Stock position shown on the delivery page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliverySummary {
    pub available_plain_rice_qtls: Decimal,
    pub available_plain_rice_bags: i64,
    pub available_frk_qtls: Decimal,
    pub agency_split: AgencySplit,
}

impl DeliveryService {
    /// Create a new DeliveryService instance
    pub fn new(store: Store, params: MillParams) -> Self {
        Self { store, params }
    }

    /// Register an extracted CMR deposit order.
    ///
    /// Gates: the referenced release order must exist, its paddy lifting must
    /// be complete, and the order number must be new for the season.
    pub async fn import_cmr(
        &self,
        username: &str,
        season: &str,
        fields: CmrOrderFields,
    ) -> AppResult<CmrDepositOrder> {
        let orders: Vec<ReleaseOrder> = self
            .load(username, season, RecordKind::ReleaseOrders)
            .await?;
        let target = orders
            .iter()
            .find(|ro| ro.do_no == fields.do_no)
            .ok_or_else(|| AppError::Validation {
                field: "doNo".to_string(),
                message: format!(
                    "DO number '{}' was not found in the saved release orders for this season. Upload the release order first.",
                    fields.do_no
                ),
                message_hi: format!("डी.ओ. क्रमांक '{}' इस सीज़न में नहीं मिला", fields.do_no),
            })?;

        let lifts = self.load_lifts(username, season).await?;
        let lifted: Decimal = lifts
            .iter()
            .filter(|lr| lr.do_no == fields.do_no)
            .map(|lr| lr.net_paddy_quantity)
            .sum();
        let pending = target.allotted_qtls() - lifted;
        if pending > qty_tolerance() {
            return Err(AppError::Validation {
                field: "doNo".to_string(),
                message: format!(
                    "Paddy lifting is still pending for DO {}. A CMR cannot be registered until lifting is complete. Pending: {:.3} Qtls.",
                    fields.do_no, pending
                ),
                message_hi: format!(
                    "डी.ओ. {} के लिए धान का उठाव अभी बाकी है ({:.3} क्विंटल)",
                    fields.do_no, pending
                ),
            });
        }

        let mut cmr_orders: Vec<CmrDepositOrder> = self
            .load(username, season, RecordKind::CmrDepositOrders)
            .await?;
        if cmr_orders.iter().any(|order| order.order_no == fields.order_no) {
            return Err(AppError::DuplicateEntry("CMR order number".to_string()));
        }

        let order = CmrDepositOrder {
            id: format!("cmr-{}", Uuid::new_v4()),
            do_no: fields.do_no,
            order_no: fields.order_no,
            deposit_date: fields.deposit_date,
            deposited_at: fields.deposited_at,
        };
        cmr_orders.push(order.clone());
        cmr_orders.sort_by(|a, b| a.order_no.cmp(&b.order_no));
        self.save(username, season, RecordKind::CmrDepositOrders, &cmr_orders)
            .await?;
        Ok(order)
    }

    /// List CMR deposit orders, sorted by order number.
    pub async fn list_cmr(&self, username: &str, season: &str) -> AppResult<Vec<CmrDepositOrder>> {
        let mut orders: Vec<CmrDepositOrder> = self
            .load(username, season, RecordKind::CmrDepositOrders)
            .await?;
        orders.sort_by(|a, b| a.order_no.cmp(&b.order_no));
        Ok(orders)
    }

    /// Manually edit a CMR deposit order.
    pub async fn update_cmr(
        &self,
        username: &str,
        season: &str,
        id: &str,
        update: CmrOrderUpdate,
    ) -> AppResult<CmrDepositOrder> {
        let mut orders: Vec<CmrDepositOrder> = self
            .load(username, season, RecordKind::CmrDepositOrders)
            .await?;
        let slot = orders
            .iter_mut()
            .find(|order| order.id == id)
            .ok_or_else(|| AppError::NotFound("CMR deposit order".to_string()))?;
        slot.do_no = update.do_no;
        slot.order_no = update.order_no;
        slot.deposit_date = update.deposit_date;
        slot.deposited_at = update.deposited_at;
        let updated = slot.clone();
        orders.sort_by(|a, b| a.order_no.cmp(&b.order_no));
        self.save(username, season, RecordKind::CmrDepositOrders, &orders)
            .await?;
        Ok(updated)
    }

    /// Delete a CMR deposit order. Challans already created from it survive.
    pub async fn delete_cmr(&self, username: &str, season: &str, id: &str) -> AppResult<()> {
        let mut orders: Vec<CmrDepositOrder> = self
            .load(username, season, RecordKind::CmrDepositOrders)
            .await?;
        let before = orders.len();
        orders.retain(|order| order.id != id);
        if orders.len() == before {
            return Err(AppError::NotFound("CMR deposit order".to_string()));
        }
        self.save(username, season, RecordKind::CmrDepositOrders, &orders)
            .await
    }

    /// Create a delivery challan against a CMR order.
    pub async fn create_delivery(
        &self,
        username: &str,
        season: &str,
        input: DeliveryInput,
    ) -> AppResult<RiceDeliveryRecord> {
        input
            .validate()
            .map_err(|err| AppError::ValidationError(err.to_string()))?;

        let quantity = Decimal::from(input.bags_delivered) * self.params.rice_bag_weight_qtl;

        let logs = self.load_logs(username, season).await?;
        let deliveries: Vec<RiceDeliveryRecord> = self
            .load(username, season, RecordKind::RiceDeliveryRecords)
            .await?;
        let frk: Vec<FrkRecord> = self.load(username, season, RecordKind::FrkRecords).await?;

        // Stock gates: the challan consumes plain rice and FRK at the blend
        // ratio.
        let plain_needed = quantity * (Decimal::ONE - self.params.frk_blend_ratio);
        let plain_available = plain_rice_stock(&logs, &deliveries, &self.params);
        if plain_needed > plain_available + qty_tolerance() {
            return Err(AppError::InsufficientStock(format!(
                "Not enough plain rice stock. Required: {:.3} Qtls, available: {:.3} Qtls.",
                plain_needed, plain_available
            )));
        }

        let frk_needed = quantity * self.params.frk_blend_ratio;
        let frk_available = frk_stock(&frk, &deliveries, &self.params).available;
        if frk_needed > frk_available + qty_tolerance() {
            return Err(AppError::InsufficientStock(format!(
                "Not enough FRK stock. Required: {:.4} Qtls, available: {:.4} Qtls.",
                frk_needed, frk_available
            )));
        }

        // Entitlement gate: rice owed for an order follows from the paddy
        // actually lifted against it.
        let lifts = self.load_lifts(username, season).await?;
        let lifted: Decimal = lifts
            .iter()
            .filter(|lr| lr.do_no == input.do_no)
            .map(|lr| lr.net_paddy_quantity)
            .sum();
        if lifted <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "doNo".to_string(),
                message: format!("No paddy has been lifted against DO {}", input.do_no),
                message_hi: format!("डी.ओ. {} के लिए कोई धान नहीं उठाया गया", input.do_no),
            });
        }
        let entitlement = lifted * self.params.cmr_turnout_ratio;
        let delivered_for_do: Decimal = deliveries
            .iter()
            .filter(|rec| rec.do_no == input.do_no)
            .map(|rec| rec.quantity_delivered_qtls)
            .sum();
        let remaining = entitlement - delivered_for_do;
        if quantity > remaining + qty_tolerance() {
            return Err(AppError::InsufficientStock(format!(
                "Cannot deliver {:.3} Qtls. Only {:.3} Qtls remaining for DO {}.",
                quantity, remaining, input.do_no
            )));
        }

        let record = RiceDeliveryRecord {
            id: format!("delivery-{}", Uuid::new_v4()),
            do_no: input.do_no,
            cmr_order_no: input.cmr_order_no,
            agency: input.agency,
            date: input.date,
            vehicle_no: input.vehicle_no,
            batch_no: input.batch_no,
            bags_delivered: input.bags_delivered,
            quantity_delivered_qtls: quantity,
        };

        let mut all = deliveries;
        all.push(record.clone());
        self.save(username, season, RecordKind::RiceDeliveryRecords, &all)
            .await?;
        tracing::info!(username, season, %quantity, "created delivery challan");
        Ok(record)
    }

    /// Delivery challans, most recent first.
    pub async fn list_deliveries(
        &self,
        username: &str,
        season: &str,
    ) -> AppResult<Vec<RiceDeliveryRecord>> {
        let mut deliveries: Vec<RiceDeliveryRecord> = self
            .load(username, season, RecordKind::RiceDeliveryRecords)
            .await?;
        deliveries.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(deliveries)
    }

    /// Delete a delivery challan.
    pub async fn delete_delivery(&self, username: &str, season: &str, id: &str) -> AppResult<()> {
        let mut deliveries: Vec<RiceDeliveryRecord> = self
            .load(username, season, RecordKind::RiceDeliveryRecords)
            .await?;
        let before = deliveries.len();
        deliveries.retain(|rec| rec.id != id);
        if deliveries.len() == before {
            return Err(AppError::NotFound("Delivery record".to_string()));
        }
        self.save(username, season, RecordKind::RiceDeliveryRecords, &deliveries)
            .await
    }

    /// Stock position for the delivery page.
    pub async fn summary(&self, username: &str, season: &str) -> AppResult<DeliverySummary> {
        let logs = self.load_logs(username, season).await?;
        let deliveries: Vec<RiceDeliveryRecord> = self
            .load(username, season, RecordKind::RiceDeliveryRecords)
            .await?;
        let frk: Vec<FrkRecord> = self.load(username, season, RecordKind::FrkRecords).await?;

        let plain = plain_rice_stock(&logs, &deliveries, &self.params);
        let plain_bags = if plain > Decimal::ZERO {
            (plain / self.params.rice_bag_weight_qtl)
                .floor()
                .to_i64()
                .unwrap_or(0)
        } else {
            0
        };

        Ok(DeliverySummary {
            available_plain_rice_qtls: plain,
            available_plain_rice_bags: plain_bags,
            available_frk_qtls: frk_stock(&frk, &deliveries, &self.params).available,
            agency_split: agency_split(&deliveries),
        })
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

    async fn save<T: serde::Serialize>(
        &self,
        username: &str,
        season: &str,
        kind: RecordKind,
        records: &[T],
    ) -> AppResult<()> {
        self.store
            .save_collection(&storage_key(username, kind, season), records)
            .await
    }
}
