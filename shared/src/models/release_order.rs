//! Release order (Dhan Delivery Order) models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// An allotment of paddy to lift from a named godown.
///
/// Created by importing the official PDF; edited manually; deleted by the
/// user (which cascades to the order's lifting records). The order number is
/// the foreign key for lifting records and must not change once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseOrder {
    pub do_no: String,
    pub do_date: String,
    pub lot_no: String,
    pub issue_center: String,
    pub godown: String,
    /// Allotted quantity in quintals, kept as the decimal string the
    /// extraction service returns.
    pub quantity: String,
    /// Final validity date for a pickup, as printed on the order.
    pub valid_upto: String,
    /// Procurement season tag ("uparjan varsh"), e.g. "2024-2025".
    pub uparjan_varsh: String,
}

impl ReleaseOrder {
    /// Allotted quantity as a decimal; zero when the string is unparseable.
    pub fn allotted_qtls(&self) -> Decimal {
        Decimal::from_str(self.quantity.trim()).unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(quantity: &str) -> ReleaseOrder {
        ReleaseOrder {
            do_no: "1224121212510046".to_string(),
            do_date: "12/Mar/2025".to_string(),
            lot_no: "Lot46.0000/2".to_string(),
            issue_center: "Satna Unit-II".to_string(),
            godown: "JAMUNA WAREHOUSE NO. 25".to_string(),
            quantity: quantity.to_string(),
            valid_upto: "22/Mar/2025".to_string(),
            uparjan_varsh: "2024-2025".to_string(),
        }
    }

    #[test]
    fn test_allotted_quantity_parses() {
        assert_eq!(order("433.00").allotted_qtls(), Decimal::new(43300, 2));
        assert_eq!(order(" 100.5 ").allotted_qtls(), Decimal::new(1005, 1));
    }

    #[test]
    fn test_unparseable_quantity_is_zero() {
        assert_eq!(order("").allotted_qtls(), Decimal::ZERO);
        assert_eq!(order("n/a").allotted_qtls(), Decimal::ZERO);
    }

    #[test]
    fn test_camel_case_serialization() {
        let json = serde_json::to_value(order("433.00")).unwrap();
        assert!(json.get("doNo").is_some());
        assert!(json.get("issueCenter").is_some());
        assert!(json.get("uparjanVarsh").is_some());
        assert!(json.get("validUpto").is_some());
    }
}
