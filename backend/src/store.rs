//! Storage slot layer
//!
//! Persistence is a flat `key -> JSON string` map: one slot per
//! `(username, record kind, season)` collection, plus the global profile
//! slot. A collection is read in full and written in full on every relevant
//! change; the last writer wins, and there is no conflict detection.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};

/// Handle to the slot table.
#[derive(Clone)]
pub struct Store {
    db: PgPool,
}

impl Store {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Read a slot's raw JSON string.
    pub async fn get_raw(&self, key: &str) -> AppResult<Option<String>> {
        let value = sqlx::query_scalar::<_, String>(
            "SELECT value FROM storage_slots WHERE slot_key = $1",
        )
        .bind(key)
        .fetch_optional(&self.db)
        .await?;
        Ok(value)
    }

    /// Write a slot, replacing any previous value.
    pub async fn put_raw(&self, key: &str, value: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO storage_slots (slot_key, value)
            VALUES ($1, $2)
            ON CONFLICT (slot_key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    /// Remove a slot. Removing a missing slot is not an error.
    pub async fn delete(&self, key: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM storage_slots WHERE slot_key = $1")
            .bind(key)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    /// Every slot, for backup export and season discovery.
    pub async fn list_raw(&self) -> AppResult<Vec<(String, String)>> {
        let rows = sqlx::query_as::<_, (String, String)>(
            "SELECT slot_key, value FROM storage_slots ORDER BY slot_key",
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    /// Drop every slot. Used by the "replace" restore strategy.
    pub async fn clear_all(&self) -> AppResult<()> {
        sqlx::query("DELETE FROM storage_slots").execute(&self.db).await?;
        Ok(())
    }

    /// Load a collection slot, falling back to its unprefixed legacy key.
    ///
    /// A slot holding unparseable JSON is logged and read as empty; the slot
    /// itself is left in place.
    pub async fn load_values(&self, key: &str, legacy_key: &str) -> AppResult<Vec<Value>> {
        let raw = match self.get_raw(key).await? {
            Some(raw) => Some(raw),
            None => self.get_raw(legacy_key).await?,
        };
        let Some(raw) = raw else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(values) => Ok(values),
            Err(err) => {
                tracing::warn!(key, %err, "unreadable collection slot, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    /// Load a collection slot straight into typed records.
    ///
    /// Entries that do not deserialize are dropped individually, so one bad
    /// record does not hide the rest of the collection.
    pub async fn load_collection<T: DeserializeOwned>(
        &self,
        key: &str,
        legacy_key: &str,
    ) -> AppResult<Vec<T>> {
        let values = self.load_values(key, legacy_key).await?;
        Ok(values
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect())
    }

    /// Serialize and write a whole collection.
    pub async fn save_collection<T: Serialize>(&self, key: &str, records: &[T]) -> AppResult<()> {
        let raw = serde_json::to_string(records)
            .map_err(|err| AppError::Internal(format!("Failed to serialize collection: {}", err)))?;
        self.put_raw(key, &raw).await
    }
}
