//! Versioned-input adapters for legacy storage shapes
//!
//! Early seasons stored lifting records with a single `bagType` +
//! `numberOfBags` pair and daily logs with a single `paddyBagsOpened` count.
//! Each adapter is a pure function from the raw JSON shape to the current
//! model. Entries that cannot be normalized are dropped rather than failing
//! the whole collection.

use serde_json::Value;

use crate::models::{DailyStockLog, LiftingRecord};

/// Normalize raw lifting-record JSON into the current two-bag-type shape.
pub fn migrate_lifting_records(raw: Vec<Value>) -> Vec<LiftingRecord> {
    raw.into_iter().filter_map(normalize_lifting_record).collect()
}

fn normalize_lifting_record(mut value: Value) -> Option<LiftingRecord> {
    let obj = value.as_object_mut()?;
    if obj.contains_key("bagType") {
        let bag_type = obj.remove("bagType");
        let count = obj
            .remove("numberOfBags")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        let is_new_bag = bag_type.as_ref().and_then(Value::as_str) == Some("New Bag");
        obj.insert(
            "numberOfNewBags".to_string(),
            Value::from(if is_new_bag { count } else { 0 }),
        );
        obj.insert(
            "numberOfUsedBags".to_string(),
            Value::from(if is_new_bag { 0 } else { count }),
        );
    }
    serde_json::from_value(value).ok()
}

/// Normalize raw daily-log JSON into the current shape.
pub fn migrate_daily_logs(raw: Vec<Value>) -> Vec<DailyStockLog> {
    raw.into_iter().filter_map(normalize_daily_log).collect()
}

fn normalize_daily_log(mut value: Value) -> Option<DailyStockLog> {
    let obj = value.as_object_mut()?;
    if obj.contains_key("paddyBagsOpened") {
        let opened = obj
            .remove("paddyBagsOpened")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        obj.insert("paddyBagsOpenedNew".to_string(), Value::from(opened));
        obj.insert("paddyBagsOpenedUsed".to_string(), Value::from(0));
    }
    // Some stored dates carry a time component; the log is keyed by day.
    if let Some(date) = obj.get("date").and_then(Value::as_str) {
        if let Some((day, _)) = date.split_once('T') {
            let day = day.to_string();
            obj.insert("date".to_string(), Value::from(day));
        }
    }
    serde_json::from_value(value).ok()
}
