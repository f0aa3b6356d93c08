//! Paddy lifting models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One physical pickup of paddy from a godown, attributed to exactly one
/// release order.
///
/// Records are append-only: a lift that spans two orders is written as two
/// records by the allocator, and each carries the tare recomputed from its
/// own bag counts. Invariant: `net_paddy_quantity >= 0`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LiftingRecord {
    pub id: String,
    /// Weighing slip (Kanta Parchi) number.
    pub rst_no: String,
    pub do_no: String,
    pub godown: String,
    /// Gross weighed quantity in quintals (the slip's net weight).
    pub gross_lifted_quantity: Decimal,
    /// Tare weight of this record's bags, in quintals.
    pub total_bag_weight: Decimal,
    /// Lifted paddy quantity: gross minus tare.
    pub net_paddy_quantity: Decimal,
    pub truck_no: String,
    #[serde(default)]
    pub number_of_new_bags: u32,
    #[serde(default)]
    pub number_of_used_bags: u32,
    pub lifting_date: DateTime<Utc>,
}

impl LiftingRecord {
    pub fn total_bags(&self) -> u32 {
        self.number_of_new_bags + self.number_of_used_bags
    }
}
