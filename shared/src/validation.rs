//! Validation utilities for Mill Mitra
//!
//! Field-level checks shared by the backend services and the WASM bindings.
//! Cross-record consistency (pending balances, the WIP chain) lives in
//! [`crate::allocation`] and [`crate::ledger`]; these helpers cover the
//! plain input-shape rules.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::models::ReleaseOrder;
use crate::types::is_season;

/// Validate a season tag like "2024-2025".
pub fn validate_season(season: &str) -> Result<(), &'static str> {
    if is_season(season) {
        Ok(())
    } else {
        Err("Season must be in the form 2024-2025")
    }
}

/// Validate a username: alphanumeric, 1-32 characters.
///
/// Usernames become storage-key segments, so the character set is strict.
pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if username.is_empty() {
        return Err("Username is required");
    }
    if username.len() > 32 {
        return Err("Username must be at most 32 characters");
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("Username must contain only letters and digits");
    }
    Ok(())
}

/// Validate password strength.
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

/// Validate a 12-word recovery phrase.
pub fn validate_recovery_phrase(phrase: &str) -> Result<(), &'static str> {
    let words = phrase.split_whitespace().count();
    if words != 12 {
        return Err("Recovery phrase must be exactly 12 words");
    }
    Ok(())
}

/// Validate the manually editable fields of a release order.
pub fn validate_release_order(order: &ReleaseOrder) -> Result<(), &'static str> {
    if order.do_no.trim().is_empty() {
        return Err("DO number cannot be empty");
    }
    if order.quantity.trim().is_empty() {
        return Err("Quantity cannot be empty");
    }
    if order.uparjan_varsh.trim().is_empty() {
        return Err("Uparjan varsh cannot be empty");
    }
    if Decimal::from_str(order.quantity.trim()).is_err() {
        return Err("Quantity must be a valid number");
    }
    Ok(())
}

/// Validate a positive quintal quantity.
pub fn validate_positive_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate a free-text identifier such as an RST, truck, vehicle, batch or
/// invoice number.
pub fn validate_identifier(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("Identifier cannot be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(do_no: &str, quantity: &str, varsh: &str) -> ReleaseOrder {
        ReleaseOrder {
            do_no: do_no.to_string(),
            do_date: "12/Mar/2025".to_string(),
            lot_no: "Lot46".to_string(),
            issue_center: "Satna Unit-II".to_string(),
            godown: "G1".to_string(),
            quantity: quantity.to_string(),
            valid_upto: "22/Mar/2025".to_string(),
            uparjan_varsh: varsh.to_string(),
        }
    }

    #[test]
    fn test_validate_season() {
        assert!(validate_season("2024-2025").is_ok());
        assert!(validate_season("2023-2024").is_ok());
        assert!(validate_season("24-25").is_err());
        assert!(validate_season("").is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("demo").is_ok());
        assert!(validate_username("mill42").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("under_score").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_validate_recovery_phrase() {
        let twelve = "alpha beta gamma delta epsilon zeta eta theta iota kappa lambda mu";
        assert!(validate_recovery_phrase(twelve).is_ok());
        assert!(validate_recovery_phrase("only three words").is_err());
        assert!(validate_recovery_phrase("").is_err());
    }

    #[test]
    fn test_validate_release_order() {
        assert!(validate_release_order(&order("DO-1", "433.00", "2024-2025")).is_ok());
        assert!(validate_release_order(&order("", "433.00", "2024-2025")).is_err());
        assert!(validate_release_order(&order("DO-1", "", "2024-2025")).is_err());
        assert!(validate_release_order(&order("DO-1", "abc", "2024-2025")).is_err());
        assert!(validate_release_order(&order("DO-1", "433.00", "")).is_err());
    }

    #[test]
    fn test_validate_positive_quantity() {
        assert!(validate_positive_quantity(Decimal::new(1, 3)).is_ok());
        assert!(validate_positive_quantity(Decimal::ZERO).is_err());
        assert!(validate_positive_quantity(Decimal::new(-5, 1)).is_err());
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("MP19HA4165").is_ok());
        assert!(validate_identifier("   ").is_err());
        assert!(validate_identifier("").is_err());
    }
}
