//! Derived summaries consumed by dashboards and reports
//!
//! Stateless reductions over the record collections, recomputed in full from
//! a fresh snapshot on every request. None of these depend on temporal
//! ordering.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::ledger::average_bag_weight_qtls;
use crate::models::{
    DailyStockLog, DeliveryAgency, FrkRecord, LiftingRecord, ReleaseOrder, RiceDeliveryRecord,
};
use crate::types::MillParams;

/// Per-godown allotment, lifted and pending totals.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GodownSummary {
    pub godown: String,
    pub do_nos: Vec<String>,
    pub total_allotted: Decimal,
    pub total_lifted: Decimal,
    pub pending: Decimal,
}

/// Godown pending = sum of allotments minus sum of net paddy lifted, grouped
/// by godown and sorted by godown name.
pub fn godown_summary(orders: &[ReleaseOrder], lifts: &[LiftingRecord]) -> Vec<GodownSummary> {
    let mut by_godown: BTreeMap<String, GodownSummary> = BTreeMap::new();

    for ro in orders {
        if ro.godown.is_empty() {
            continue;
        }
        let entry = by_godown
            .entry(ro.godown.clone())
            .or_insert_with(|| GodownSummary {
                godown: ro.godown.clone(),
                do_nos: Vec::new(),
                total_allotted: Decimal::ZERO,
                total_lifted: Decimal::ZERO,
                pending: Decimal::ZERO,
            });
        entry.total_allotted += ro.allotted_qtls();
        entry.do_nos.push(ro.do_no.clone());
    }

    for lr in lifts {
        if let Some(entry) = by_godown.get_mut(&lr.godown) {
            entry.total_lifted += lr.net_paddy_quantity;
        }
    }

    let mut summaries: Vec<GodownSummary> = by_godown.into_values().collect();
    for summary in &mut summaries {
        summary.do_nos.sort();
        summary.pending = summary.total_allotted - summary.total_lifted;
    }
    summaries
}

/// Season-wide lifted totals and the derived average bag weight.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaddyStats {
    pub total_lifted_qtls: Decimal,
    pub total_new_bags: u64,
    pub total_used_bags: u64,
    pub average_bag_weight_qtls: Decimal,
}

pub fn paddy_stats(lifts: &[LiftingRecord], params: &MillParams) -> PaddyStats {
    PaddyStats {
        total_lifted_qtls: lifts.iter().map(|lr| lr.net_paddy_quantity).sum(),
        total_new_bags: lifts.iter().map(|lr| lr.number_of_new_bags as u64).sum(),
        total_used_bags: lifts.iter().map(|lr| lr.number_of_used_bags as u64).sum(),
        average_bag_weight_qtls: average_bag_weight_qtls(lifts, params),
    }
}

/// Paddy bag counts: lifted versus opened, per bag type.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BagInventory {
    pub lifted_new: u64,
    pub lifted_used: u64,
    pub opened_new: u64,
    pub opened_used: u64,
    pub stock_new: i64,
    pub stock_used: i64,
}

pub fn bag_inventory(lifts: &[LiftingRecord], logs: &[DailyStockLog]) -> BagInventory {
    let lifted_new: u64 = lifts.iter().map(|lr| lr.number_of_new_bags as u64).sum();
    let lifted_used: u64 = lifts.iter().map(|lr| lr.number_of_used_bags as u64).sum();
    let opened_new: u64 = logs.iter().map(|log| log.paddy_bags_opened_new as u64).sum();
    let opened_used: u64 = logs.iter().map(|log| log.paddy_bags_opened_used as u64).sum();
    BagInventory {
        lifted_new,
        lifted_used,
        opened_new,
        opened_used,
        stock_new: lifted_new as i64 - opened_new as i64,
        stock_used: lifted_used as i64 - opened_used as i64,
    }
}

/// Plain (unfortified) rice on hand: everything produced minus the plain-rice
/// share of what has been delivered.
pub fn plain_rice_stock(
    logs: &[DailyStockLog],
    deliveries: &[RiceDeliveryRecord],
    params: &MillParams,
) -> Decimal {
    let produced: Decimal = logs.iter().map(|log| log.rice_quantity).sum();
    let delivered: Decimal = deliveries
        .iter()
        .map(|rec| rec.quantity_delivered_qtls)
        .sum();
    produced - delivered * (Decimal::ONE - params.frk_blend_ratio)
}

/// FRK purchased, consumed and on hand.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FrkStock {
    pub purchased: Decimal,
    pub consumed: Decimal,
    pub available: Decimal,
}

/// FRK is consumed at the blend ratio of every quintal of fortified rice
/// delivered.
pub fn frk_stock(
    frk: &[FrkRecord],
    deliveries: &[RiceDeliveryRecord],
    params: &MillParams,
) -> FrkStock {
    let purchased: Decimal = frk.iter().map(|rec| rec.quantity_qtls).sum();
    let delivered: Decimal = deliveries
        .iter()
        .map(|rec| rec.quantity_delivered_qtls)
        .sum();
    let consumed = delivered * params.frk_blend_ratio;
    FrkStock {
        purchased,
        consumed,
        available: purchased - consumed,
    }
}

/// DO-wise paddy and rice position for the register.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DoSummary {
    pub do_no: String,
    pub godown: String,
    pub paddy_allotted: Decimal,
    pub paddy_lifted: Decimal,
    pub paddy_pending: Decimal,
    pub rice_entitlement: Decimal,
    pub rice_delivered: Decimal,
    pub rice_pending: Decimal,
}

/// Rice entitlement per order is the net paddy lifted against it times the
/// turnout ratio. The pending figure subtracts only the plain-rice portion of
/// deliveries, not the FRK share.
pub fn do_wise_summary(
    orders: &[ReleaseOrder],
    lifts: &[LiftingRecord],
    deliveries: &[RiceDeliveryRecord],
    params: &MillParams,
) -> Vec<DoSummary> {
    let mut summaries: Vec<DoSummary> = orders
        .iter()
        .map(|ro| {
            let lifted: Decimal = lifts
                .iter()
                .filter(|lr| lr.do_no == ro.do_no)
                .map(|lr| lr.net_paddy_quantity)
                .sum();
            let delivered: Decimal = deliveries
                .iter()
                .filter(|rec| rec.do_no == ro.do_no)
                .map(|rec| rec.quantity_delivered_qtls)
                .sum();
            let allotted = ro.allotted_qtls();
            let entitlement = lifted * params.cmr_turnout_ratio;
            let plain_delivered = delivered * (Decimal::ONE - params.frk_blend_ratio);
            DoSummary {
                do_no: ro.do_no.clone(),
                godown: ro.godown.clone(),
                paddy_allotted: allotted,
                paddy_lifted: lifted,
                paddy_pending: allotted - lifted,
                rice_entitlement: entitlement,
                rice_delivered: delivered,
                rice_pending: entitlement - plain_delivered,
            }
        })
        .collect();
    summaries.sort_by(|a, b| a.do_no.cmp(&b.do_no));
    summaries
}

/// Empty new bags available for packing rice: new paddy bags opened during
/// milling minus bags already sent out with rice deliveries.
pub fn empty_bag_availability(logs: &[DailyStockLog], deliveries: &[RiceDeliveryRecord]) -> i64 {
    let opened: i64 = logs.iter().map(|log| log.paddy_bags_opened_new as i64).sum();
    let used: i64 = deliveries.iter().map(|rec| rec.bags_delivered as i64).sum();
    opened - used
}

/// Season totals per by-product category.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ByProductTotals {
    pub bran: Decimal,
    pub husk: Decimal,
    pub sortex_broken: Decimal,
    pub non_sortex_broken: Decimal,
    pub murgidana: Decimal,
    pub rejection: Decimal,
}

pub fn byproduct_totals(logs: &[DailyStockLog]) -> ByProductTotals {
    logs.iter().fold(ByProductTotals::default(), |mut acc, log| {
        acc.bran += log.bran_sold;
        acc.husk += log.husk_sold;
        acc.sortex_broken += log.sortex_broken_sold;
        acc.non_sortex_broken += log.non_sortex_broken_sold;
        acc.murgidana += log.murgidana_sold;
        acc.rejection += log.rejection_sold;
        acc
    })
}

/// FCI / MPSCSC percentage split of total delivered quantity.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgencySplit {
    pub total_delivered_qtls: Decimal,
    pub fci_percent: Decimal,
    pub mpscsc_percent: Decimal,
}

pub fn agency_split(deliveries: &[RiceDeliveryRecord]) -> AgencySplit {
    let total: Decimal = deliveries
        .iter()
        .map(|rec| rec.quantity_delivered_qtls)
        .sum();
    let agency_total = |agency: DeliveryAgency| -> Decimal {
        deliveries
            .iter()
            .filter(|rec| rec.agency == agency)
            .map(|rec| rec.quantity_delivered_qtls)
            .sum()
    };
    let percent = |share: Decimal| -> Decimal {
        if total > Decimal::ZERO {
            share / total * Decimal::from(100)
        } else {
            Decimal::ZERO
        }
    };
    AgencySplit {
        total_delivered_qtls: total,
        fci_percent: percent(agency_total(DeliveryAgency::Fci)),
        mpscsc_percent: percent(agency_total(DeliveryAgency::Mpscsc)),
    }
}

/// Season stock position across paddy, rice and FRK.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockSummary {
    pub current_paddy_stock_qtls: Decimal,
    pub current_paddy_stock_bags: i64,
    pub current_rice_stock_qtls: Decimal,
    pub current_rice_stock_bags: i64,
    pub current_frk_stock_qtls: Decimal,
}

pub fn stock_summary(
    lifts: &[LiftingRecord],
    logs: &[DailyStockLog],
    deliveries: &[RiceDeliveryRecord],
    frk: &[FrkRecord],
    params: &MillParams,
) -> StockSummary {
    let stats = paddy_stats(lifts, params);
    let consumed: Decimal = logs
        .iter()
        .map(|log| Decimal::from(log.bags_opened()) * stats.average_bag_weight_qtls)
        .sum();
    let paddy_stock = stats.total_lifted_qtls - consumed;
    let paddy_bags = if paddy_stock > Decimal::ZERO {
        (paddy_stock / stats.average_bag_weight_qtls)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .unwrap_or(0)
    } else {
        0
    };

    let rice_stock = plain_rice_stock(logs, deliveries, params);
    let rice_bags = if rice_stock > Decimal::ZERO {
        (rice_stock / params.rice_bag_weight_qtl)
            .floor()
            .to_i64()
            .unwrap_or(0)
    } else {
        0
    };

    StockSummary {
        current_paddy_stock_qtls: paddy_stock,
        current_paddy_stock_bags: paddy_bags,
        current_rice_stock_qtls: rice_stock,
        current_rice_stock_bags: rice_bags,
        current_frk_stock_qtls: frk_stock(frk, deliveries, params).available,
    }
}
