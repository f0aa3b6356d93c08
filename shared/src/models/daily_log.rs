//! Daily milling stock log models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One calendar day's production entry.
///
/// Only the bag counts, rice bags and by-product sales are user input.
/// `paddy_consumed_qtls` and `work_in_progress_qtls` are derived by the
/// production ledger over the whole chronologically sorted chain whenever the
/// set changes; they are never edited independently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyStockLog {
    pub id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub paddy_bags_opened_new: u32,
    #[serde(default)]
    pub paddy_bags_opened_used: u32,
    #[serde(default)]
    pub paddy_consumed_qtls: Decimal,
    #[serde(default)]
    pub rice_bags_new: u32,
    #[serde(default)]
    pub rice_quantity: Decimal,
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
    /// Closing work-in-progress balance for this day.
    #[serde(default)]
    pub work_in_progress_qtls: Decimal,
}

impl DailyStockLog {
    /// Paddy bags opened on this day, both bag types.
    pub fn bags_opened(&self) -> u32 {
        self.paddy_bags_opened_new + self.paddy_bags_opened_used
    }

    /// Total finished output recorded for the day, in quintals: rice plus
    /// every by-product category.
    pub fn total_output(&self) -> Decimal {
        self.rice_quantity
            + self.bran_sold
            + self.husk_sold
            + self.sortex_broken_sold
            + self.non_sortex_broken_sold
            + self.murgidana_sold
            + self.rejection_sold
    }
}
