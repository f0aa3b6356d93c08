//! Backup and restore service
//!
//! A backup is a flat JSON object mapping every application storage key to
//! its raw string value, so restoring reproduces slots byte-for-byte. There
//! is no schema versioning beyond shape-sniffing the key names to preview
//! which users and seasons a file touches.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{AppError, AppResult};
use crate::store::Store;
use shared::{parse_storage_key, UserProfile, PROFILES_KEY};

/// Backup service
#[derive(Clone)]
pub struct BackupService {
    store: Store,
}

/// How to apply a restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestoreStrategy {
    /// Write all keys from the file, keep existing unmatched slots.
    Merge,
    /// Clear every slot first, then load the file.
    Replace,
}

/// Preview of what a backup file contains, shown before committing.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackupPreview {
    pub profiles: Vec<String>,
    pub seasons_by_profile: BTreeMap<String, Vec<String>>,
}

impl BackupService {
    /// Create a new BackupService instance
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Export every application slot (all profiles, all seasons) as a flat
    /// key-to-raw-string map.
    pub async fn export(&self) -> AppResult<BTreeMap<String, String>> {
        let mut data = BTreeMap::new();
        for (key, value) in self.store.list_raw().await? {
            if key == PROFILES_KEY || parse_storage_key(&key).is_some() {
                data.insert(key, value);
            }
        }
        if data.is_empty() {
            return Err(AppError::NotFound("Application data to back up".to_string()));
        }
        Ok(data)
    }

    /// Shape-sniff a backup file and list the profiles and seasons it holds.
    pub fn preview(&self, data: &BTreeMap<String, String>) -> AppResult<BackupPreview> {
        let has_app_data = data
            .keys()
            .any(|key| key == PROFILES_KEY || parse_storage_key(key).is_some());
        if !has_app_data {
            return Err(AppError::InvalidBackup(
                "This does not appear to be a valid Mill Mitra backup file".to_string(),
            ));
        }

        let mut profiles: Vec<String> = Vec::new();
        if let Some(raw) = data.get(PROFILES_KEY) {
            // A corrupt profile list only degrades the preview.
            if let Ok(parsed) = serde_json::from_str::<Vec<UserProfile>>(raw) {
                profiles = parsed.into_iter().map(|p| p.username).collect();
            }
        }

        let mut seasons_by_profile: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for key in data.keys() {
            if let Some(parsed) = parse_storage_key(key) {
                let username = parsed.username.unwrap_or_else(|| "(legacy)".to_string());
                if !profiles.contains(&username) {
                    profiles.push(username.clone());
                }
                let seasons = seasons_by_profile.entry(username).or_default();
                if !seasons.contains(&parsed.season) {
                    seasons.push(parsed.season);
                }
            }
        }
        for seasons in seasons_by_profile.values_mut() {
            seasons.sort();
        }

        Ok(BackupPreview {
            profiles,
            seasons_by_profile,
        })
    }

    /// Apply a backup file. Returns the number of slots written.
    pub async fn restore(
        &self,
        data: BTreeMap<String, String>,
        strategy: RestoreStrategy,
    ) -> AppResult<usize> {
        // Reject obviously wrong files before touching storage.
        self.preview(&data)?;

        if strategy == RestoreStrategy::Replace {
            self.store.clear_all().await?;
        }
        let count = data.len();
        for (key, value) in data {
            self.store.put_raw(&key, &value).await?;
        }
        tracing::info!(slots = count, ?strategy, "restored backup");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_strategy_parses() {
        assert_eq!(
            serde_json::from_str::<RestoreStrategy>("\"merge\"").unwrap(),
            RestoreStrategy::Merge
        );
        assert_eq!(
            serde_json::from_str::<RestoreStrategy>("\"replace\"").unwrap(),
            RestoreStrategy::Replace
        );
    }
}
