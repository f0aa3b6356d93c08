//! Derived summary tests for Mill Mitra
//!
//! Stock positions, DO-wise entitlement and the bag ledgers are plain
//! reductions; these pin their formulas down.

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{
    agency_split, bag_inventory, byproduct_totals, do_wise_summary, empty_bag_availability,
    frk_stock, godown_summary, plain_rice_stock, stock_summary, DailyStockLog, DeliveryAgency,
    FrkRecord, LiftingRecord, MillParams, ReleaseOrder, RiceDeliveryRecord,
};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn order(do_no: &str, godown: &str, quantity: &str) -> ReleaseOrder {
    ReleaseOrder {
        do_no: do_no.to_string(),
        do_date: String::new(),
        lot_no: String::new(),
        issue_center: String::new(),
        godown: godown.to_string(),
        quantity: quantity.to_string(),
        valid_upto: String::new(),
        uparjan_varsh: "2024-2025".to_string(),
    }
}

fn lift(do_no: &str, godown: &str, net: &str, new_bags: u32, used_bags: u32) -> LiftingRecord {
    LiftingRecord {
        id: format!("lift-{}-{}", do_no, new_bags),
        rst_no: "12800".to_string(),
        do_no: do_no.to_string(),
        godown: godown.to_string(),
        gross_lifted_quantity: dec(net),
        total_bag_weight: Decimal::ZERO,
        net_paddy_quantity: dec(net),
        truck_no: "MP19HA4165".to_string(),
        number_of_new_bags: new_bags,
        number_of_used_bags: used_bags,
        lifting_date: Utc.with_ymd_and_hms(2024, 12, 1, 9, 0, 0).unwrap(),
    }
}

fn day(id: &str, date: &str, bags_new: u32, bags_used: u32, rice: &str) -> DailyStockLog {
    DailyStockLog {
        id: id.to_string(),
        date: NaiveDate::from_str(date).unwrap(),
        paddy_bags_opened_new: bags_new,
        paddy_bags_opened_used: bags_used,
        paddy_consumed_qtls: Decimal::ZERO,
        rice_bags_new: 0,
        rice_quantity: dec(rice),
        bran_sold: Decimal::ZERO,
        husk_sold: Decimal::ZERO,
        sortex_broken_sold: Decimal::ZERO,
        non_sortex_broken_sold: Decimal::ZERO,
        murgidana_sold: Decimal::ZERO,
        rejection_sold: Decimal::ZERO,
        work_in_progress_qtls: Decimal::ZERO,
    }
}

fn delivery(do_no: &str, agency: DeliveryAgency, qtls: &str, bags: u32) -> RiceDeliveryRecord {
    RiceDeliveryRecord {
        id: format!("delivery-{}-{}", do_no, bags),
        do_no: do_no.to_string(),
        cmr_order_no: "CMR-1".to_string(),
        agency,
        date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
        vehicle_no: "MP19AB1234".to_string(),
        batch_no: "B1".to_string(),
        bags_delivered: bags,
        quantity_delivered_qtls: dec(qtls),
    }
}

fn frk(id: &str, qtls: &str) -> FrkRecord {
    FrkRecord {
        id: id.to_string(),
        date: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
        invoice_no: format!("INV-{}", id),
        supplier: "FRK Supplier".to_string(),
        quantity_qtls: dec(qtls),
    }
}

// ============================================================================
// Scenario: FRK consumption at the blend ratio
// ============================================================================
// 10.0000 Qtls purchased, 500.000 Qtls delivered -> 5.0000 consumed,
// 5.0000 remaining.

#[test]
fn test_frk_stock_scenario() {
    let purchases = vec![frk("frk-1", "4.0000"), frk("frk-2", "6.0000")];
    let deliveries = vec![
        delivery("DO-1", DeliveryAgency::Fci, "300.000", 600),
        delivery("DO-2", DeliveryAgency::Mpscsc, "200.000", 400),
    ];

    let stock = frk_stock(&purchases, &deliveries, &MillParams::default());
    assert_eq!(stock.purchased, dec("10.0000"));
    assert_eq!(stock.consumed, dec("5.0000"));
    assert_eq!(stock.available, dec("5.0000"));
}

// ============================================================================
// Plain rice stock
// ============================================================================

#[test]
fn test_plain_rice_stock_subtracts_only_plain_share() {
    let logs = vec![day("d1", "2024-12-01", 0, 0, "100.0")];
    let deliveries = vec![delivery("DO-1", DeliveryAgency::Fci, "50.0", 100)];

    // 100.0 produced - 50.0 * 0.99 = 50.5
    assert_eq!(
        plain_rice_stock(&logs, &deliveries, &MillParams::default()),
        dec("50.5")
    );
}

#[test]
fn test_plain_rice_stock_with_no_deliveries() {
    let logs = vec![day("d1", "2024-12-01", 0, 0, "80.0")];
    assert_eq!(
        plain_rice_stock(&logs, &[], &MillParams::default()),
        dec("80.0")
    );
}

// ============================================================================
// Godown and DO-wise registers
// ============================================================================

#[test]
fn test_godown_pending_is_allotted_minus_lifted() {
    let orders = vec![
        order("DO-1", "G1", "100.00"),
        order("DO-2", "G1", "50.00"),
        order("DO-3", "G2", "200.00"),
    ];
    let lifts = vec![lift("DO-1", "G1", "40.0", 100, 0), lift("DO-3", "G2", "10.0", 25, 0)];

    let summary = godown_summary(&orders, &lifts);
    assert_eq!(summary.len(), 2);
    assert_eq!(summary[0].godown, "G1");
    assert_eq!(summary[0].pending, dec("110.00"));
    assert_eq!(summary[1].godown, "G2");
    assert_eq!(summary[1].pending, dec("190.00"));
}

#[test]
fn test_do_wise_entitlement_tracks_lifted_paddy() {
    let orders = vec![order("DO-1", "G1", "150.00")];
    // Only 100 of the 150 allotted has been lifted so far.
    let lifts = vec![lift("DO-1", "G1", "100.0", 250, 0)];
    let deliveries = vec![delivery("DO-1", DeliveryAgency::Fci, "30.0", 60)];

    let rows = do_wise_summary(&orders, &lifts, &deliveries, &MillParams::default());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].paddy_pending, dec("50.00"));
    // Entitlement follows lifted paddy, not the allotment.
    assert_eq!(rows[0].rice_entitlement, dec("67.000"));
    // Pending subtracts only the plain-rice share of deliveries.
    assert_eq!(rows[0].rice_pending, dec("37.300"));
}

// ============================================================================
// Bag ledgers
// ============================================================================

#[test]
fn test_bag_inventory_by_type() {
    let lifts = vec![lift("DO-1", "G1", "100.0", 150, 50)];
    let logs = vec![
        day("d1", "2024-12-01", 100, 20, "30.0"),
        day("d2", "2024-12-02", 30, 10, "10.0"),
    ];

    let inventory = bag_inventory(&lifts, &logs);
    assert_eq!(inventory.lifted_new, 150);
    assert_eq!(inventory.lifted_used, 50);
    assert_eq!(inventory.opened_new, 130);
    assert_eq!(inventory.opened_used, 30);
    assert_eq!(inventory.stock_new, 20);
    assert_eq!(inventory.stock_used, 20);
}

#[test]
fn test_empty_bags_come_only_from_new_paddy_bags() {
    let logs = vec![day("d1", "2024-12-01", 400, 100, "0")];
    let deliveries = vec![delivery("DO-1", DeliveryAgency::Fci, "75.0", 150)];
    assert_eq!(empty_bag_availability(&logs, &deliveries), 250);
}

#[test]
fn test_empty_bags_can_go_negative() {
    // Over-delivery against opened bags shows up as a deficit, not a clamp.
    let logs = vec![day("d1", "2024-12-01", 100, 0, "0")];
    let deliveries = vec![delivery("DO-1", DeliveryAgency::Fci, "75.0", 150)];
    assert_eq!(empty_bag_availability(&logs, &deliveries), -50);
}

// ============================================================================
// Agency split and by-products
// ============================================================================

#[test]
fn test_agency_split() {
    let deliveries = vec![
        delivery("DO-1", DeliveryAgency::Fci, "60.0", 120),
        delivery("DO-2", DeliveryAgency::Fci, "15.0", 30),
        delivery("DO-3", DeliveryAgency::Mpscsc, "25.0", 50),
    ];

    let split = agency_split(&deliveries);
    assert_eq!(split.total_delivered_qtls, dec("100.0"));
    assert_eq!(split.fci_percent, dec("75"));
    assert_eq!(split.mpscsc_percent, dec("25"));
}

#[test]
fn test_byproduct_totals() {
    let mut a = day("d1", "2024-12-01", 0, 0, "0");
    a.bran_sold = dec("5.0");
    a.husk_sold = dec("25.0");
    a.murgidana_sold = dec("0.5");
    let mut b = day("d2", "2024-12-02", 0, 0, "0");
    b.bran_sold = dec("3.0");
    b.rejection_sold = dec("0.2");

    let totals = byproduct_totals(&[a, b]);
    assert_eq!(totals.bran, dec("8.0"));
    assert_eq!(totals.husk, dec("25.0"));
    assert_eq!(totals.murgidana, dec("0.5"));
    assert_eq!(totals.rejection, dec("0.2"));
    assert_eq!(totals.sortex_broken, Decimal::ZERO);
}

// ============================================================================
// Season stock summary
// ============================================================================

#[test]
fn test_stock_summary_combines_all_ledgers() {
    let lifts = vec![lift("DO-1", "G1", "120.0", 300, 0)];
    let logs = vec![day("d1", "2024-12-01", 100, 0, "26.0")];
    let deliveries = vec![delivery("DO-1", DeliveryAgency::Fci, "10.0", 20)];
    let purchases = vec![frk("frk-1", "2.0")];

    let summary = stock_summary(&lifts, &logs, &deliveries, &purchases, &MillParams::default());

    // Average bag weight 0.4; 100 bags opened -> 40.0 consumed.
    assert_eq!(summary.current_paddy_stock_qtls, dec("80.0"));
    assert_eq!(summary.current_paddy_stock_bags, 200);
    // 26.0 produced - 10.0 * 0.99 = 16.1 -> 32 bags of 0.5.
    assert_eq!(summary.current_rice_stock_qtls, dec("16.1"));
    assert_eq!(summary.current_rice_stock_bags, 32);
    // 2.0 purchased - 10.0 * 0.01 = 1.9.
    assert_eq!(summary.current_frk_stock_qtls, dec("1.9"));
}
