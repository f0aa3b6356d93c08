//! Daily production ledger tests for Mill Mitra
//!
//! Covers the WIP carry-forward chain, the chain-wide validation gate, and
//! the clamp-at-zero behavior.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{
    average_bag_weight_qtls, daily_totals, recompute_chain, rice_quantity_from_bags,
    validate_chain, DailyStockLog, MillParams,
};

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::from_str(s).unwrap()
}

fn log(id: &str, day: &str, bags: u32, rice: &str, bran: &str, husk: &str) -> DailyStockLog {
    DailyStockLog {
        id: id.to_string(),
        date: date(day),
        paddy_bags_opened_new: bags,
        paddy_bags_opened_used: 0,
        paddy_consumed_qtls: Decimal::ZERO,
        rice_bags_new: 0,
        rice_quantity: dec(rice),
        bran_sold: dec(bran),
        husk_sold: dec(husk),
        sortex_broken_sold: Decimal::ZERO,
        non_sortex_broken_sold: Decimal::ZERO,
        murgidana_sold: Decimal::ZERO,
        rejection_sold: Decimal::ZERO,
        work_in_progress_qtls: Decimal::ZERO,
    }
}

// ============================================================================
// Scenario: the validation gate
// ============================================================================
// Day 1 consumes 40.0 Qtls and outputs 38.0 -> WIP 2.0. Day 2 consumes 30.0,
// so 32.0 is available; an output of 33.0 must be rejected.

#[test]
fn test_output_beyond_available_is_rejected() {
    let logs = vec![
        log("d1", "2024-12-01", 100, "36.0", "2.0", "0"),
        log("d2", "2024-12-02", 75, "31.0", "2.0", "0"),
    ];

    let violation = validate_chain(&logs, dec("0.4")).unwrap_err();
    assert_eq!(violation.date, date("2024-12-02"));
    assert_eq!(violation.output, dec("33.0"));
    assert_eq!(violation.available, dec("32.0"));
    assert_eq!(violation.shortfall(), dec("1.0"));
}

#[test]
fn test_chain_within_available_passes() {
    let logs = vec![
        log("d1", "2024-12-01", 100, "36.0", "2.0", "0"),
        log("d2", "2024-12-02", 75, "30.0", "2.0", "0"),
    ];
    assert!(validate_chain(&logs, dec("0.4")).is_ok());
}

#[test]
fn test_tolerance_admits_hairline_output() {
    // Output exceeds available by exactly 0.001: still accepted.
    let logs = vec![log("d1", "2024-12-01", 100, "40.001", "0", "0")];
    assert!(validate_chain(&logs, dec("0.4")).is_ok());

    let logs = vec![log("d1", "2024-12-01", 100, "40.002", "0", "0")];
    assert!(validate_chain(&logs, dec("0.4")).is_err());
}

// ============================================================================
// Scenario: WIP clamping
// ============================================================================
// A day whose output exceeds its available paddy leaves WIP 0, not a
// negative balance; the next day starts from 0.

#[test]
fn test_negative_wip_clamps_to_zero() {
    // Day 1: available 40.0, output 41.0 (possible in restored or legacy
    // data that never passed the gate).
    let logs = vec![
        log("d1", "2024-12-01", 100, "41.0", "0", "0"),
        log("d2", "2024-12-02", 100, "12.0", "0", "0"),
    ];

    let processed = recompute_chain(&logs, dec("0.4"));
    assert_eq!(processed[0].work_in_progress_qtls, Decimal::ZERO);
    // Day 2's available is 40.0 + 0, not 40.0 - 1.0.
    assert_eq!(processed[1].work_in_progress_qtls, dec("28.0"));
}

// ============================================================================
// Chain recomputation
// ============================================================================

#[test]
fn test_editing_an_early_day_shifts_later_wip() {
    let original = vec![
        log("d1", "2024-12-01", 100, "36.0", "2.0", "0"),
        log("d2", "2024-12-02", 75, "30.0", "1.0", "0"),
    ];
    let processed = recompute_chain(&original, dec("0.4"));
    assert_eq!(processed[1].work_in_progress_qtls, dec("1.0"));

    // Raising day 1's output to 39.0 shrinks day 2's closing WIP.
    let mut edited = original.clone();
    edited[0] = log("d1", "2024-12-01", 100, "37.0", "2.0", "0");
    let processed = recompute_chain(&edited, dec("0.4"));
    assert_eq!(processed[0].work_in_progress_qtls, dec("1.0"));
    assert_eq!(processed[1].work_in_progress_qtls, Decimal::ZERO);
}

#[test]
fn test_edit_that_breaks_a_later_day_is_caught() {
    // Day 2 leans on day 1's WIP; shrinking day 1's consumption must fail
    // the re-validation even though day 2 itself was not edited.
    let mut logs = vec![
        log("d1", "2024-12-01", 100, "36.0", "2.0", "0"),
        log("d2", "2024-12-02", 75, "31.0", "1.0", "0"),
    ];
    assert!(validate_chain(&logs, dec("0.4")).is_ok());

    // Day 1 stays valid (38.0 output against 38.0 available) but leaves no
    // WIP for day 2.
    logs[0] = log("d1", "2024-12-01", 95, "36.0", "2.0", "0");
    let violation = validate_chain(&logs, dec("0.4")).unwrap_err();
    assert_eq!(violation.date, date("2024-12-02"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Recomputing the same sorted log set always yields identical derived
    /// fields: the chain is a pure function of its inputs.
    #[test]
    fn property_chain_is_deterministic(
        bags in proptest::collection::vec(1u32..500, 1..8),
        outputs in proptest::collection::vec(0u32..100, 1..8),
    ) {
        let logs: Vec<DailyStockLog> = bags
            .iter()
            .zip(outputs.iter().cycle())
            .enumerate()
            .map(|(i, (b, o))| {
                log(
                    &format!("d{}", i),
                    &format!("2024-12-{:02}", i + 1),
                    *b,
                    &o.to_string(),
                    "0",
                    "0",
                )
            })
            .collect();

        let first = recompute_chain(&logs, dec("0.4"));
        let second = recompute_chain(&logs, dec("0.4"));
        prop_assert_eq!(first, second);
    }

    /// WIP never goes negative anywhere in the chain.
    #[test]
    fn property_wip_never_negative(
        bags in proptest::collection::vec(0u32..500, 1..10),
        outputs in proptest::collection::vec(0u32..300, 1..10),
    ) {
        let logs: Vec<DailyStockLog> = bags
            .iter()
            .zip(outputs.iter().cycle())
            .enumerate()
            .map(|(i, (b, o))| {
                log(
                    &format!("d{}", i),
                    &format!("2024-12-{:02}", i + 1),
                    *b,
                    &o.to_string(),
                    "0",
                    "0",
                )
            })
            .collect();

        for processed in recompute_chain(&logs, dec("0.4")) {
            prop_assert!(processed.work_in_progress_qtls >= Decimal::ZERO);
        }
    }
}

// ============================================================================
// Average bag weight
// ============================================================================

#[test]
fn test_average_bag_weight_from_lifts() {
    use chrono::{TimeZone, Utc};
    use shared::LiftingRecord;

    let lifts = vec![
        LiftingRecord {
            id: "lift-1".to_string(),
            rst_no: "12800".to_string(),
            do_no: "DO-1".to_string(),
            godown: "G1".to_string(),
            gross_lifted_quantity: dec("81.16"),
            total_bag_weight: dec("1.16"),
            net_paddy_quantity: dec("80.0"),
            truck_no: "MP19HA4165".to_string(),
            number_of_new_bags: 200,
            number_of_used_bags: 0,
            lifting_date: Utc.with_ymd_and_hms(2024, 12, 1, 9, 0, 0).unwrap(),
        },
        LiftingRecord {
            id: "lift-2".to_string(),
            rst_no: "12801".to_string(),
            do_no: "DO-1".to_string(),
            godown: "G1".to_string(),
            gross_lifted_quantity: dec("40.5"),
            total_bag_weight: dec("0.5"),
            net_paddy_quantity: dec("40.0"),
            truck_no: "UP64T8002".to_string(),
            number_of_used_bags: 100,
            number_of_new_bags: 0,
            lifting_date: Utc.with_ymd_and_hms(2024, 12, 2, 9, 0, 0).unwrap(),
        },
    ];

    // 120.0 Qtls over 300 bags = 0.4 Qtls/bag
    assert_eq!(
        average_bag_weight_qtls(&lifts, &MillParams::default()),
        dec("0.4")
    );
}

#[test]
fn test_average_falls_back_before_any_lift() {
    assert_eq!(
        average_bag_weight_qtls(&[], &MillParams::default()),
        dec("0.4")
    );
}

// ============================================================================
// Derived rice quantity and totals
// ============================================================================

#[test]
fn test_rice_quantity_is_half_quintal_per_bag() {
    let params = MillParams::default();
    assert_eq!(rice_quantity_from_bags(200, &params), dec("100.0"));
    assert_eq!(rice_quantity_from_bags(0, &params), Decimal::ZERO);
}

#[test]
fn test_totals_sum_every_category() {
    let mut a = log("d1", "2024-12-01", 100, "30.0", "2.0", "5.0");
    a.sortex_broken_sold = dec("1.0");
    a.non_sortex_broken_sold = dec("1.5");
    a.murgidana_sold = dec("0.5");
    a.rejection_sold = dec("0.2");
    let b = log("d2", "2024-12-02", 50, "15.0", "1.0", "2.0");

    let processed = recompute_chain(&[a, b], dec("0.4"));
    let totals = daily_totals(&processed);

    assert_eq!(totals.paddy_consumed_qtls, dec("60.0"));
    assert_eq!(totals.rice_quantity, dec("45.0"));
    assert_eq!(totals.bran_sold, dec("3.0"));
    assert_eq!(totals.husk_sold, dec("7.0"));
    assert_eq!(totals.sortex_broken_sold, dec("1.0"));
    assert_eq!(totals.non_sortex_broken_sold, dec("1.5"));
    assert_eq!(totals.murgidana_sold, dec("0.5"));
    assert_eq!(totals.rejection_sold, dec("0.2"));
    assert_eq!(totals.current_wip_qtls, processed[1].work_in_progress_qtls);
}
