//! Daily production ledger
//!
//! Derives per-day paddy consumption and the running work-in-progress (WIP)
//! balance over a season's daily stock logs. The whole chronological chain is
//! recomputed from scratch whenever the set changes: an edit to an early day
//! changes every later day's WIP, so there is no incremental path.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::models::{DailyStockLog, LiftingRecord};
use crate::types::{qty_tolerance, MillParams};

/// A day whose recorded output exceeds the paddy available to it.
#[derive(Debug, Error, PartialEq)]
#[error("total output {output} Qtls exceeds available paddy {available} Qtls on {date}")]
pub struct ChainViolation {
    pub date: NaiveDate,
    pub output: Decimal,
    pub available: Decimal,
}

impl ChainViolation {
    /// How far the day's output overshoots its available paddy.
    pub fn shortfall(&self) -> Decimal {
        self.output - self.available
    }
}

/// Lifetime average weight of a lifted paddy bag, in quintals.
///
/// Computed once per pass as total net paddy lifted over total bags lifted,
/// across all lifting records for the season; falls back to the configured
/// constant while nothing has been lifted. Treated as constant for every day
/// of a single computation pass.
pub fn average_bag_weight_qtls(lifts: &[LiftingRecord], params: &MillParams) -> Decimal {
    let total_net: Decimal = lifts.iter().map(|lr| lr.net_paddy_quantity).sum();
    let total_bags: u64 = lifts.iter().map(|lr| lr.total_bags() as u64).sum();
    if total_bags > 0 {
        total_net / Decimal::from(total_bags)
    } else {
        params.fallback_paddy_bag_weight_qtl
    }
}

/// Rice quantity derived from the packed bag count.
pub fn rice_quantity_from_bags(rice_bags: u32, params: &MillParams) -> Decimal {
    Decimal::from(rice_bags) * params.rice_bag_weight_qtl
}

/// Recompute the derived fields of every log across the chronological chain.
///
/// Returns the logs sorted oldest-first with `paddy_consumed_qtls` and
/// `work_in_progress_qtls` recomputed. Negative WIP clamps to zero before it
/// carries forward: an over-reported day absorbs the shortfall instead of
/// pushing a deficit onto later days.
pub fn recompute_chain(logs: &[DailyStockLog], average_bag_weight: Decimal) -> Vec<DailyStockLog> {
    let mut sorted: Vec<DailyStockLog> = logs.to_vec();
    sorted.sort_by_key(|log| log.date);

    let mut wip = Decimal::ZERO;
    for log in &mut sorted {
        let consumed = Decimal::from(log.bags_opened()) * average_bag_weight;
        let available = consumed + wip;
        wip = (available - log.total_output()).max(Decimal::ZERO);
        log.paddy_consumed_qtls = consumed;
        log.work_in_progress_qtls = wip;
    }
    sorted
}

/// Validate the whole chronological chain before committing a write.
///
/// Walks the logs oldest-first and reports the first day whose output exceeds
/// its available paddy (with the 0.001 Qtl tolerance). The caller must pass
/// the candidate set including the added or edited entry; nothing is written
/// when this fails.
pub fn validate_chain(
    logs: &[DailyStockLog],
    average_bag_weight: Decimal,
) -> Result<(), ChainViolation> {
    let mut sorted: Vec<&DailyStockLog> = logs.iter().collect();
    sorted.sort_by_key(|log| log.date);

    let mut wip = Decimal::ZERO;
    for log in sorted {
        let available = Decimal::from(log.bags_opened()) * average_bag_weight + wip;
        let output = log.total_output();
        if output > available + qty_tolerance() {
            return Err(ChainViolation {
                date: log.date,
                output,
                available,
            });
        }
        wip = (available - output).max(Decimal::ZERO);
    }
    Ok(())
}

/// Season-to-date column totals over a processed chain, plus the closing WIP
/// of the most recent day.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotals {
    pub paddy_bags_opened_new: u64,
    pub paddy_bags_opened_used: u64,
    pub paddy_consumed_qtls: Decimal,
    pub rice_bags_new: u64,
    pub rice_quantity: Decimal,
    pub bran_sold: Decimal,
    pub husk_sold: Decimal,
    pub sortex_broken_sold: Decimal,
    pub non_sortex_broken_sold: Decimal,
    pub murgidana_sold: Decimal,
    pub rejection_sold: Decimal,
    /// Closing WIP of the latest day in the chain.
    pub current_wip_qtls: Decimal,
}

/// Column totals over logs already processed by [`recompute_chain`]
/// (oldest-first).
pub fn daily_totals(processed: &[DailyStockLog]) -> DailyTotals {
    let mut totals = processed.iter().fold(DailyTotals::default(), |mut acc, log| {
        acc.paddy_bags_opened_new += log.paddy_bags_opened_new as u64;
        acc.paddy_bags_opened_used += log.paddy_bags_opened_used as u64;
        acc.paddy_consumed_qtls += log.paddy_consumed_qtls;
        acc.rice_bags_new += log.rice_bags_new as u64;
        acc.rice_quantity += log.rice_quantity;
        acc.bran_sold += log.bran_sold;
        acc.husk_sold += log.husk_sold;
        acc.sortex_broken_sold += log.sortex_broken_sold;
        acc.non_sortex_broken_sold += log.non_sortex_broken_sold;
        acc.murgidana_sold += log.murgidana_sold;
        acc.rejection_sold += log.rejection_sold;
        acc
    });
    totals.current_wip_qtls = processed
        .last()
        .map(|log| log.work_in_progress_qtls)
        .unwrap_or(Decimal::ZERO);
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn log(id: &str, date: &str, bags_new: u32, rice: &str, bran: &str) -> DailyStockLog {
        DailyStockLog {
            id: id.to_string(),
            date: NaiveDate::from_str(date).unwrap(),
            paddy_bags_opened_new: bags_new,
            paddy_bags_opened_used: 0,
            paddy_consumed_qtls: Decimal::ZERO,
            rice_bags_new: 0,
            rice_quantity: dec(rice),
            bran_sold: dec(bran),
            husk_sold: Decimal::ZERO,
            sortex_broken_sold: Decimal::ZERO,
            non_sortex_broken_sold: Decimal::ZERO,
            murgidana_sold: Decimal::ZERO,
            rejection_sold: Decimal::ZERO,
            work_in_progress_qtls: Decimal::ZERO,
        }
    }

    #[test]
    fn test_wip_carries_forward() {
        // Day 1: 100 bags x 0.4 = 40.0 consumed, output 38.0 -> WIP 2.0
        // Day 2: 75 bags x 0.4 = 30.0 consumed, available 32.0, output 31.0 -> WIP 1.0
        let logs = vec![
            log("d1", "2024-12-01", 100, "36.0", "2.0"),
            log("d2", "2024-12-02", 75, "30.0", "1.0"),
        ];

        let processed = recompute_chain(&logs, dec("0.4"));
        assert_eq!(processed[0].paddy_consumed_qtls, dec("40.0"));
        assert_eq!(processed[0].work_in_progress_qtls, dec("2.0"));
        assert_eq!(processed[1].paddy_consumed_qtls, dec("30.0"));
        assert_eq!(processed[1].work_in_progress_qtls, dec("1.0"));
    }

    #[test]
    fn test_chain_sorts_by_date() {
        let logs = vec![
            log("late", "2024-12-05", 50, "18.0", "0"),
            log("early", "2024-12-01", 100, "38.0", "0"),
        ];

        let processed = recompute_chain(&logs, dec("0.4"));
        assert_eq!(processed[0].id, "early");
        assert_eq!(processed[1].id, "late");
        // Early day leaves WIP 2.0; late day has 20.0 + 2.0 available.
        assert_eq!(processed[1].work_in_progress_qtls, dec("4.0"));
    }

    #[test]
    fn test_average_bag_weight_fallback() {
        let params = MillParams::default();
        assert_eq!(average_bag_weight_qtls(&[], &params), dec("0.4"));
    }

    #[test]
    fn test_totals_take_latest_wip() {
        let logs = vec![
            log("d1", "2024-12-01", 100, "36.0", "2.0"),
            log("d2", "2024-12-02", 75, "30.0", "1.0"),
        ];
        let processed = recompute_chain(&logs, dec("0.4"));
        let totals = daily_totals(&processed);
        assert_eq!(totals.paddy_consumed_qtls, dec("70.0"));
        assert_eq!(totals.rice_quantity, dec("66.0"));
        assert_eq!(totals.current_wip_qtls, dec("1.0"));
    }
}
