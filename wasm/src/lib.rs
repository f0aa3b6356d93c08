//! WebAssembly module for Mill Mitra
//!
//! Provides client-side computation for:
//! - Bag tare and net paddy weight
//! - Lift distribution planning
//! - The daily WIP chain (recompute and validate)
//! - Offline field validation

use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

use shared::{
    migrate_daily_logs, migrate_lifting_records, pending_orders, plan_distribution,
    recompute_chain, tare_weight_qtls, validate_chain, LiftingRecord, MillParams, ReleaseOrder,
};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn dec(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or(Decimal::ZERO)
}

fn to_f64(value: Decimal) -> f64 {
    value.to_string().parse().unwrap_or(0.0)
}

/// Net paddy quantity in quintals: gross minus the bag tare weight.
#[wasm_bindgen]
pub fn net_paddy_quantity(
    gross_qtls: f64,
    new_bags: u32,
    new_bag_weight_g: f64,
    used_bags: u32,
    used_bag_weight_g: f64,
) -> f64 {
    let tare = tare_weight_qtls(
        new_bags,
        dec(new_bag_weight_g),
        used_bags,
        dec(used_bag_weight_g),
    );
    to_f64(dec(gross_qtls) - tare)
}

/// Plan how a net quantity spreads across a godown's pending orders.
///
/// Takes the release orders and lifting records as JSON arrays (legacy
/// shapes accepted) and returns the slot list as JSON.
#[wasm_bindgen]
pub fn plan_lift_distribution(
    orders_json: &str,
    lifts_json: &str,
    godown: &str,
    net_quantity_qtls: f64,
) -> Result<String, JsValue> {
    let orders: Vec<ReleaseOrder> = serde_json::from_str(orders_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid orders JSON: {}", e)))?;
    let raw_lifts: Vec<serde_json::Value> = serde_json::from_str(lifts_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid lifting records JSON: {}", e)))?;
    let lifts: Vec<LiftingRecord> = migrate_lifting_records(raw_lifts);

    let candidates = pending_orders(&orders, &lifts, godown);
    let slots = plan_distribution(dec(net_quantity_qtls), &candidates);
    serde_json::to_string(&slots).map_err(|e| JsValue::from_str(&format!("Serialize failed: {}", e)))
}

/// Recompute the daily WIP chain and return the processed logs as JSON,
/// oldest first.
#[wasm_bindgen]
pub fn recompute_daily_chain(
    logs_json: &str,
    average_bag_weight_qtls: f64,
) -> Result<String, JsValue> {
    let raw: Vec<serde_json::Value> = serde_json::from_str(logs_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid logs JSON: {}", e)))?;
    let logs = migrate_daily_logs(raw);
    let processed = recompute_chain(&logs, dec(average_bag_weight_qtls));
    serde_json::to_string(&processed)
        .map_err(|e| JsValue::from_str(&format!("Serialize failed: {}", e)))
}

/// Validate the daily chain, reporting the first offending date.
#[wasm_bindgen]
pub fn validate_daily_chain(
    logs_json: &str,
    average_bag_weight_qtls: f64,
) -> Result<(), JsValue> {
    let raw: Vec<serde_json::Value> = serde_json::from_str(logs_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid logs JSON: {}", e)))?;
    let logs = migrate_daily_logs(raw);
    validate_chain(&logs, dec(average_bag_weight_qtls))
        .map_err(|violation| JsValue::from_str(&violation.to_string()))
}

/// Rice quantity in quintals for a packed bag count.
#[wasm_bindgen]
pub fn rice_quantity_for_bags(rice_bags: u32) -> f64 {
    to_f64(shared::rice_quantity_from_bags(
        rice_bags,
        &MillParams::default(),
    ))
}

/// Lifetime average paddy bag weight over the lifting records.
#[wasm_bindgen]
pub fn average_bag_weight(lifts_json: &str) -> Result<f64, JsValue> {
    let raw: Vec<serde_json::Value> = serde_json::from_str(lifts_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid lifting records JSON: {}", e)))?;
    let lifts = migrate_lifting_records(raw);
    Ok(to_f64(shared::average_bag_weight_qtls(
        &lifts,
        &MillParams::default(),
    )))
}

/// Validate a season tag like "2024-2025".
#[wasm_bindgen]
pub fn is_valid_season(season: &str) -> bool {
    shared::validate_season(season).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_net_paddy_quantity() {
        // 121.00 gross, 200 new bags of 580 g -> tare 1.16 -> net 119.84
        let net = net_paddy_quantity(121.0, 200, 580.0, 0, 500.0);
        assert!((net - 119.84).abs() < 0.0001);
    }

    #[test]
    fn test_rice_quantity_for_bags() {
        assert!((rice_quantity_for_bags(200) - 100.0).abs() < 0.0001);
    }

    #[test]
    fn test_plan_lift_distribution_round_trip() {
        let orders = r#"[
            {"doNo": "DO-1", "doDate": "", "lotNo": "", "issueCenter": "",
             "godown": "G1", "quantity": "100.00", "validUpto": "", "uparjanVarsh": "2024-2025"},
            {"doNo": "DO-2", "doDate": "", "lotNo": "", "issueCenter": "",
             "godown": "G1", "quantity": "50.00", "validUpto": "", "uparjanVarsh": "2024-2025"}
        ]"#;

        let plan = plan_lift_distribution(orders, "[]", "G1", 119.84).unwrap();
        let slots: serde_json::Value = serde_json::from_str(&plan).unwrap();
        assert_eq!(slots.as_array().unwrap().len(), 2);
        assert_eq!(slots[0]["doNo"], "DO-1");
        assert_eq!(slots[1]["doNo"], serde_json::Value::Null);
    }

    #[test]
    fn test_validate_daily_chain_accepts_balanced_logs() {
        let logs = r#"[
            {"id": "d1", "date": "2024-12-01", "paddyBagsOpenedNew": 100,
             "riceQuantity": 38.0}
        ]"#;
        assert!(validate_daily_chain(logs, 0.4).is_ok());
    }

    #[test]
    fn test_is_valid_season() {
        assert!(is_valid_season("2024-2025"));
        assert!(!is_valid_season("garbage"));
    }
}
