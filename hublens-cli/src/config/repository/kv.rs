//! Generic JSON get/set over the key-value table

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Store;

impl Store {
    /// Read and deserialize a value; `None` when the key is absent
    pub async fn get_value<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to read '{key}' from the store"))?;
        match row {
            Some((raw,)) => Ok(Some(
                serde_json::from_str(&raw)
                    .with_context(|| format!("Stored value for '{key}' is malformed"))?,
            )),
            None => Ok(None),
        }
    }

    /// Serialize and write a value, replacing any previous one
    pub async fn set_value<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)
            .with_context(|| format!("Failed to serialize value for '{key}'"))?;
        sqlx::query(
            "INSERT INTO kv_store (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(raw)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to write '{key}' to the store"))?;
        Ok(())
    }

    /// Delete a key; no error if it was absent
    pub async fn remove_value(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to remove '{key}' from the store"))?;
        Ok(())
    }
}
