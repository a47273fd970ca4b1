//! Key/value accessors
//!
//! Values are stored as text; typed callers encode JSON themselves or use
//! the `*_json` helpers.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;

/// Read a raw value
pub async fn get_value(db: &SqlitePool, key: &str) -> Result<Option<String>> {
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await
        .map_err(Error::Database)?;

    Ok(row.map(|(value,)| value))
}

/// Insert or overwrite a raw value (last write wins)
pub async fn set_value(db: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
    )
    .bind(key)
    .bind(value)
    .execute(db)
    .await
    .map_err(Error::Database)?;

    Ok(())
}

/// Delete one key, returns whether it existed
pub async fn delete_value(db: &SqlitePool, key: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM kv_store WHERE key = ?")
        .bind(key)
        .execute(db)
        .await
        .map_err(Error::Database)?;

    Ok(result.rows_affected() > 0)
}

/// Delete every key starting with `prefix`, returns the number removed
pub async fn delete_prefix(db: &SqlitePool, prefix: &str) -> Result<u64> {
    // substr comparison sidesteps LIKE wildcards inside the prefix
    let result = sqlx::query("DELETE FROM kv_store WHERE substr(key, 1, ?) = ?")
        .bind(prefix.chars().count() as i64)
        .bind(prefix)
        .execute(db)
        .await
        .map_err(Error::Database)?;

    Ok(result.rows_affected())
}

/// Read and decode a JSON value
pub async fn get_json<T: DeserializeOwned>(db: &SqlitePool, key: &str) -> Result<Option<T>> {
    match get_value(db, key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encode and write a JSON value
pub async fn set_json<T: Serialize>(db: &SqlitePool, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    set_value(db, key, &raw).await
}
