//! Fortified Rice Kernel (FRK) purchase models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A purchase of fortifying additive, consumed proportionally as fortified
/// rice is delivered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FrkRecord {
    pub id: String,
    pub date: NaiveDate,
    pub invoice_no: String,
    pub supplier: String,
    pub quantity_qtls: Decimal,
}
