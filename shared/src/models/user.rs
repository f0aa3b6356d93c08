//! User profile models

use serde::{Deserialize, Serialize};

/// A locally registered mill operator.
///
/// Profiles live in the global `userProfiles` slot and are not scoped by
/// season. The recovery phrase hash backs the forgot-password flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: String,
    pub password_hash: String,
    pub recovery_phrase_hash: String,
}
