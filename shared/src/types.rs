//! Common types used across the platform

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Unit weights and blending ratios shared by every ledger computation.
///
/// Passed explicitly into the computations so they stay pure and testable in
/// isolation; the backend loads overrides from its `[mill]` config section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MillParams {
    /// Weight of a new gunny bag, in grams.
    pub new_bag_weight_g: Decimal,
    /// Weight of a once-used gunny bag, in grams.
    pub used_bag_weight_g: Decimal,
    /// Paddy-to-rice turnout ratio for CMR entitlement.
    pub cmr_turnout_ratio: Decimal,
    /// FRK share of every quintal of fortified rice delivered.
    pub frk_blend_ratio: Decimal,
    /// Weight of a packed rice bag, in quintals.
    pub rice_bag_weight_qtl: Decimal,
    /// Per-bag paddy weight used before any bags have been lifted.
    pub fallback_paddy_bag_weight_qtl: Decimal,
}

impl Default for MillParams {
    fn default() -> Self {
        Self {
            new_bag_weight_g: Decimal::new(580, 0),
            used_bag_weight_g: Decimal::new(500, 0),
            cmr_turnout_ratio: Decimal::new(67, 2),
            frk_blend_ratio: Decimal::new(1, 2),
            rice_bag_weight_qtl: Decimal::new(5, 1),
            fallback_paddy_bag_weight_qtl: Decimal::new(4, 1),
        }
    }
}

/// Comparison tolerance for quintal quantities (0.001 Qtls).
pub fn qty_tolerance() -> Decimal {
    Decimal::new(1, 3)
}

/// The record collections persisted per `(username, kind, season)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordKind {
    ReleaseOrders,
    LiftingRecords,
    DailyStockLogs,
    RiceDeliveryRecords,
    CmrDepositOrders,
    FrkRecords,
}

impl RecordKind {
    pub const ALL: [RecordKind; 6] = [
        RecordKind::ReleaseOrders,
        RecordKind::LiftingRecords,
        RecordKind::DailyStockLogs,
        RecordKind::RiceDeliveryRecords,
        RecordKind::CmrDepositOrders,
        RecordKind::FrkRecords,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::ReleaseOrders => "releaseOrders",
            RecordKind::LiftingRecords => "liftingRecords",
            RecordKind::DailyStockLogs => "dailyStockLogs",
            RecordKind::RiceDeliveryRecords => "riceDeliveryRecords",
            RecordKind::CmrDepositOrders => "cmrDepositOrders",
            RecordKind::FrkRecords => "frkRecords",
        }
    }

    pub fn parse(s: &str) -> Option<RecordKind> {
        RecordKind::ALL.iter().copied().find(|kind| kind.as_str() == s)
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Global storage slot holding the profile list; not scoped by season.
pub const PROFILES_KEY: &str = "userProfiles";

/// Storage key for a user's collection in a season.
pub fn storage_key(username: &str, kind: RecordKind, season: &str) -> String {
    format!("{}_{}_{}", username, kind.as_str(), season)
}

/// Storage key shape used before profiles existed; read-only legacy data.
pub fn legacy_storage_key(kind: RecordKind, season: &str) -> String {
    format!("{}_{}", kind.as_str(), season)
}

/// A season tag like "2024-2025".
pub fn is_season(s: &str) -> bool {
    let parts: Vec<&str> = s.split('-').collect();
    parts.len() == 2 && parts.iter().all(|year| {
        year.len() == 4 && year.starts_with("20") && year.chars().all(|c| c.is_ascii_digit())
    })
}

fn is_username_segment(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric())
}

/// A recognized data storage key, split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKey {
    /// `None` for legacy keys written before profiles existed.
    pub username: Option<String>,
    pub kind: RecordKind,
    pub season: String,
}

/// Parse a storage key of the form `{username}_{recordKind}_{season}` or the
/// legacy `{recordKind}_{season}`. Anything else is not application data.
pub fn parse_storage_key(key: &str) -> Option<ParsedKey> {
    let parts: Vec<&str> = key.split('_').collect();
    match parts.as_slice() {
        [username, kind, season] if is_username_segment(username) && is_season(season) => {
            RecordKind::parse(kind).map(|kind| ParsedKey {
                username: Some((*username).to_string()),
                kind,
                season: (*season).to_string(),
            })
        }
        [kind, season] if is_season(season) => RecordKind::parse(kind).map(|kind| ParsedKey {
            username: None,
            kind,
            season: (*season).to_string(),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_round_trip() {
        let key = storage_key("demo", RecordKind::LiftingRecords, "2024-2025");
        assert_eq!(key, "demo_liftingRecords_2024-2025");

        let parsed = parse_storage_key(&key).unwrap();
        assert_eq!(parsed.username.as_deref(), Some("demo"));
        assert_eq!(parsed.kind, RecordKind::LiftingRecords);
        assert_eq!(parsed.season, "2024-2025");
    }

    #[test]
    fn test_legacy_key_parses_without_username() {
        let parsed = parse_storage_key("releaseOrders_2023-2024").unwrap();
        assert_eq!(parsed.username, None);
        assert_eq!(parsed.kind, RecordKind::ReleaseOrders);
    }

    #[test]
    fn test_unrelated_keys_are_rejected() {
        assert!(parse_storage_key("userProfiles").is_none());
        assert!(parse_storage_key("demo_somethingElse_2024-2025").is_none());
        assert!(parse_storage_key("demo_liftingRecords_24-25").is_none());
        assert!(parse_storage_key("a_b_c_d").is_none());
    }

    #[test]
    fn test_season_format() {
        assert!(is_season("2024-2025"));
        assert!(is_season("2023-2024"));
        assert!(!is_season("2024"));
        assert!(!is_season("2024-25"));
        assert!(!is_season("1999-2000"));
    }

    #[test]
    fn test_default_params() {
        let params = MillParams::default();
        assert_eq!(params.new_bag_weight_g, Decimal::new(580, 0));
        assert_eq!(params.used_bag_weight_g, Decimal::new(500, 0));
        assert_eq!(params.cmr_turnout_ratio, Decimal::new(67, 2));
        assert_eq!(params.frk_blend_ratio, Decimal::new(1, 2));
    }
}
