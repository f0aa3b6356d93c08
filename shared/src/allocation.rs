//! Lift allocation
//!
//! Turns one weighing-slip event into lifting records apportioned across a
//! godown's outstanding release orders. The oldest pending order always
//! absorbs first; any remainder goes whole to a single user-chosen second
//! order. No order may receive more than its remaining pending quantity
//! (0.001 Qtl tolerance).

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{LiftingRecord, ReleaseOrder};
use crate::types::qty_tolerance;

/// Why a lift could not be recorded.
#[derive(Debug, Error, PartialEq)]
pub enum AllocationError {
    #[error("gross lifted quantity must be a positive number")]
    InvalidGrossQuantity,

    #[error("at least one bag of either type is required")]
    NoBags,

    #[error("net paddy quantity is not positive after deducting bag weight")]
    NonPositiveNet,

    #[error("RST number and truck number are required")]
    MissingIdentifiers,

    #[error("no release order with pending quantity exists for godown {godown}")]
    NothingPending { godown: String },

    #[error("total lifted quantity {allocated} Qtls exceeds pending amount {pending} Qtls for the godown")]
    ExceedsGodownPending { allocated: Decimal, pending: Decimal },

    #[error("a release order must be selected for the remaining {remainder} Qtls")]
    SecondOrderNotSelected { remainder: Decimal },

    #[error("order {do_no} is not a pending order for this godown")]
    UnknownSecondOrder { do_no: String },

    #[error("lifted quantity {quantity} Qtls for order {do_no} exceeds its pending amount {pending} Qtls")]
    ExceedsOrderPending {
        do_no: String,
        quantity: Decimal,
        pending: Decimal,
    },
}

/// A release order with its derived pending balance.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PendingOrder {
    pub do_no: String,
    pub allotted: Decimal,
    pub lifted: Decimal,
    pub pending: Decimal,
}

/// One row of a lift distribution plan.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LiftSlot {
    /// Target order; `None` until the user picks one for the remainder slot.
    pub do_no: Option<String>,
    pub quantity: Decimal,
    pub max_quantity: Decimal,
    /// The oldest-order slot is locked and not user-selectable.
    pub locked: bool,
    /// Orders the user may choose between, for the unlocked slot.
    pub available_orders: Vec<PendingOrder>,
}

/// Input for recording one lift.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiftInput {
    pub godown: String,
    /// The slip's net weight, in quintals.
    pub gross_quantity: Decimal,
    pub rst_no: String,
    pub truck_no: String,
    #[serde(default)]
    pub number_of_new_bags: u32,
    pub new_bag_weight_g: Decimal,
    #[serde(default)]
    pub number_of_used_bags: u32,
    pub used_bag_weight_g: Decimal,
    /// Order chosen for the remainder when the lift spans two orders.
    #[serde(default)]
    pub second_do_no: Option<String>,
}

/// Bag tare weight in quintals for the given bag counts.
pub fn tare_weight_qtls(
    new_bags: u32,
    new_weight_g: Decimal,
    used_bags: u32,
    used_weight_g: Decimal,
) -> Decimal {
    let grams = Decimal::from(new_bags) * new_weight_g + Decimal::from(used_bags) * used_weight_g;
    grams / Decimal::from(1000) / Decimal::from(100)
}

/// Pending balances for a godown's release orders, oldest order number first.
///
/// An order's pending quantity is always derived: allotted minus the sum of
/// net paddy already lifted against it. Orders with nothing meaningful left
/// (pending <= 0.001) are dropped.
pub fn pending_orders(
    orders: &[ReleaseOrder],
    lifts: &[LiftingRecord],
    godown: &str,
) -> Vec<PendingOrder> {
    let mut pending: Vec<PendingOrder> = orders
        .iter()
        .filter(|ro| ro.godown == godown)
        .map(|ro| {
            let lifted: Decimal = lifts
                .iter()
                .filter(|lr| lr.do_no == ro.do_no)
                .map(|lr| lr.net_paddy_quantity)
                .sum();
            let allotted = ro.allotted_qtls();
            PendingOrder {
                do_no: ro.do_no.clone(),
                allotted,
                lifted,
                pending: allotted - lifted,
            }
        })
        .filter(|po| po.pending > qty_tolerance())
        .collect();
    pending.sort_by(|a, b| a.do_no.cmp(&b.do_no));
    pending
}

/// Plan how a net quantity spreads across a godown's pending orders.
///
/// The oldest order takes `min(net, pending)` in a locked slot; any remainder
/// becomes a single user-selectable slot covering the other candidates. A
/// lift never spans more than two orders.
pub fn plan_distribution(net_quantity: Decimal, candidates: &[PendingOrder]) -> Vec<LiftSlot> {
    let mut slots = Vec::new();
    if net_quantity <= Decimal::ZERO || candidates.is_empty() {
        return slots;
    }

    let first = &candidates[0];
    let from_first = net_quantity.min(first.pending);
    slots.push(LiftSlot {
        do_no: Some(first.do_no.clone()),
        quantity: from_first,
        max_quantity: first.pending,
        locked: true,
        available_orders: Vec::new(),
    });

    let remainder = net_quantity - from_first;
    if remainder > Decimal::ZERO && candidates.len() > 1 {
        slots.push(LiftSlot {
            do_no: None,
            quantity: remainder,
            max_quantity: remainder,
            locked: false,
            available_orders: candidates[1..].to_vec(),
        });
    }
    slots
}

/// Apportion a bag count across slots proportionally to `shares`.
///
/// Every slot but the last rounds to the nearest whole bag; the last slot
/// takes the residual so the counts always sum back to `total` exactly.
pub fn apportion_bags(total: u32, shares: &[Decimal]) -> Vec<u32> {
    if shares.is_empty() {
        return Vec::new();
    }
    let mut counts = Vec::with_capacity(shares.len());
    let mut distributed: u32 = 0;
    for share in &shares[..shares.len() - 1] {
        let rounded = (share * Decimal::from(total))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u32()
            .unwrap_or(0);
        counts.push(rounded);
        distributed += rounded;
    }
    counts.push(total.saturating_sub(distributed));
    counts
}

/// Convert one weighing-slip event into one or two lifting records.
///
/// `orders` and `lifts` must be the full collections for the season; pending
/// balances are derived fresh from them on every call. The emitted records
/// recompute gross and tare from their own apportioned bag counts, so
/// per-record gross values sum to the input gross only up to bag-weight
/// rounding, which is accepted.
pub fn allocate_lift(
    input: &LiftInput,
    orders: &[ReleaseOrder],
    lifts: &[LiftingRecord],
    lifting_date: DateTime<Utc>,
) -> Result<Vec<LiftingRecord>, AllocationError> {
    if input.gross_quantity <= Decimal::ZERO {
        return Err(AllocationError::InvalidGrossQuantity);
    }
    if input.number_of_new_bags + input.number_of_used_bags == 0 {
        return Err(AllocationError::NoBags);
    }
    if input.rst_no.trim().is_empty() || input.truck_no.trim().is_empty() {
        return Err(AllocationError::MissingIdentifiers);
    }

    let tare = tare_weight_qtls(
        input.number_of_new_bags,
        input.new_bag_weight_g,
        input.number_of_used_bags,
        input.used_bag_weight_g,
    );
    let net = input.gross_quantity - tare;
    if net <= Decimal::ZERO {
        return Err(AllocationError::NonPositiveNet);
    }

    let candidates = pending_orders(orders, lifts, &input.godown);
    if candidates.is_empty() {
        return Err(AllocationError::NothingPending {
            godown: input.godown.clone(),
        });
    }

    let slots = plan_distribution(net, &candidates);
    let godown_pending: Decimal = candidates.iter().map(|po| po.pending).sum();
    let allocated: Decimal = slots.iter().map(|slot| slot.quantity).sum();
    if allocated > godown_pending + qty_tolerance() {
        return Err(AllocationError::ExceedsGodownPending {
            allocated,
            pending: godown_pending,
        });
    }

    // Resolve every slot to a concrete order before apportioning bags.
    let mut resolved: Vec<(String, Decimal)> = Vec::with_capacity(slots.len());
    for slot in &slots {
        if slot.locked {
            match &slot.do_no {
                Some(do_no) => resolved.push((do_no.clone(), slot.quantity)),
                None => {
                    return Err(AllocationError::SecondOrderNotSelected {
                        remainder: slot.quantity,
                    })
                }
            }
            continue;
        }
        let chosen = match &input.second_do_no {
            Some(do_no) => do_no,
            None => {
                return Err(AllocationError::SecondOrderNotSelected {
                    remainder: slot.quantity,
                })
            }
        };
        let order = slot
            .available_orders
            .iter()
            .find(|po| &po.do_no == chosen)
            .ok_or_else(|| AllocationError::UnknownSecondOrder {
                do_no: chosen.clone(),
            })?;
        if slot.quantity > order.pending + qty_tolerance() {
            return Err(AllocationError::ExceedsOrderPending {
                do_no: order.do_no.clone(),
                quantity: slot.quantity,
                pending: order.pending,
            });
        }
        resolved.push((order.do_no.clone(), slot.quantity));
    }

    let total_quantity: Decimal = resolved.iter().map(|(_, qty)| *qty).sum();
    let shares: Vec<Decimal> = resolved
        .iter()
        .map(|(_, qty)| qty / total_quantity)
        .collect();
    let new_bags = apportion_bags(input.number_of_new_bags, &shares);
    let used_bags = apportion_bags(input.number_of_used_bags, &shares);

    let records = resolved
        .into_iter()
        .enumerate()
        .map(|(i, (do_no, quantity))| {
            let bag_weight = tare_weight_qtls(
                new_bags[i],
                input.new_bag_weight_g,
                used_bags[i],
                input.used_bag_weight_g,
            );
            LiftingRecord {
                id: format!("lift-{}-{}", lifting_date.timestamp_millis(), do_no),
                rst_no: input.rst_no.trim().to_string(),
                do_no,
                godown: input.godown.clone(),
                gross_lifted_quantity: quantity + bag_weight,
                total_bag_weight: bag_weight,
                net_paddy_quantity: quantity,
                truck_no: input.truck_no.trim().to_string(),
                number_of_new_bags: new_bags[i],
                number_of_used_bags: used_bags[i],
                lifting_date,
            }
        })
        .collect();

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_tare_weight() {
        // 200 new bags of 580 g = 116 kg = 1.16 Qtls
        let tare = tare_weight_qtls(200, dec("580"), 0, dec("500"));
        assert_eq!(tare, dec("1.16"));

        // Mixed: 100 x 580 g + 50 x 500 g = 83 kg = 0.83 Qtls
        let tare = tare_weight_qtls(100, dec("580"), 50, dec("500"));
        assert_eq!(tare, dec("0.83"));
    }

    #[test]
    fn test_apportion_bags_conserves_total() {
        let shares = vec![dec("100") / dec("119.84"), dec("19.84") / dec("119.84")];
        let counts = apportion_bags(200, &shares);
        assert_eq!(counts.iter().sum::<u32>(), 200);
        assert_eq!(counts, vec![167, 33]);
    }

    #[test]
    fn test_apportion_bags_single_slot() {
        assert_eq!(apportion_bags(200, &[Decimal::ONE]), vec![200]);
        assert_eq!(apportion_bags(0, &[Decimal::ONE]), vec![0]);
    }

    #[test]
    fn test_plan_distribution_splits_remainder() {
        let candidates = vec![
            PendingOrder {
                do_no: "DO-1".to_string(),
                allotted: dec("100"),
                lifted: Decimal::ZERO,
                pending: dec("100"),
            },
            PendingOrder {
                do_no: "DO-2".to_string(),
                allotted: dec("50"),
                lifted: Decimal::ZERO,
                pending: dec("50"),
            },
        ];

        let slots = plan_distribution(dec("119.84"), &candidates);
        assert_eq!(slots.len(), 2);
        assert!(slots[0].locked);
        assert_eq!(slots[0].do_no.as_deref(), Some("DO-1"));
        assert_eq!(slots[0].quantity, dec("100"));
        assert!(!slots[1].locked);
        assert_eq!(slots[1].do_no, None);
        assert_eq!(slots[1].quantity, dec("19.84"));
        assert_eq!(slots[1].available_orders.len(), 1);
    }

    #[test]
    fn test_plan_distribution_fits_in_first_order() {
        let candidates = vec![PendingOrder {
            do_no: "DO-1".to_string(),
            allotted: dec("100"),
            lifted: dec("20"),
            pending: dec("80"),
        }];

        let slots = plan_distribution(dec("50"), &candidates);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].quantity, dec("50"));
    }
}
