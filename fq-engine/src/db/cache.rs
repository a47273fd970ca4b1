//! Local item cache
//!
//! Last successfully resolved record per normalized identifier, stored under
//! `item_cache_<clean_id>`. Best-effort: read failures look like a miss,
//! write failures are logged and ignored.

use crate::models::ItemRecord;
use fq_common::db::{delete_prefix, get_json, set_json};
use sqlx::SqlitePool;
use tracing::{debug, warn};

pub const CACHE_KEY_PREFIX: &str = "item_cache_";

/// Storage key of one cached identifier
pub fn cache_key(clean_id: &str) -> String {
    format!("{}{}", CACHE_KEY_PREFIX, clean_id)
}

/// Key/value cache of resolved items
#[derive(Clone)]
pub struct ItemCache {
    db: SqlitePool,
}

impl ItemCache {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Cached record with quantity reset to 1
    pub async fn get(&self, clean_id: &str) -> Option<ItemRecord> {
        if clean_id.is_empty() {
            return None;
        }

        match get_json::<ItemRecord>(&self.db, &cache_key(clean_id)).await {
            Ok(Some(record)) => {
                debug!(clean_id, "Cache hit");
                Some(record.with_quantity(1))
            }
            Ok(None) => None,
            Err(e) => {
                warn!(clean_id, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    /// Store a record, returns whether the write succeeded
    pub async fn put(&self, clean_id: &str, record: &ItemRecord) -> bool {
        if clean_id.is_empty() {
            warn!("Refusing to cache record with empty identifier");
            return false;
        }

        match set_json(&self.db, &cache_key(clean_id), record).await {
            Ok(()) => true,
            Err(e) => {
                warn!(clean_id, error = %e, "Cache write failed");
                false
            }
        }
    }

    /// Drop every cached record
    pub async fn clear(&self) -> bool {
        match delete_prefix(&self.db, CACHE_KEY_PREFIX).await {
            Ok(removed) => {
                debug!(removed, "Item cache cleared");
                true
            }
            Err(e) => {
                warn!(error = %e, "Cache clear failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fq_common::db::{get_value, init_memory_pool, set_value};

    fn record(clean_id: &str, quantity: u32) -> ItemRecord {
        ItemRecord {
            raw_id: clean_id.to_string(),
            clean_id: clean_id.to_string(),
            name: "BILLY bookcase".to_string(),
            minutes_base: 45.0,
            price: 29.5,
            image_url: Some("https://img.example/billy.jpg".to_string()),
            found: true,
            quantity,
        }
    }

    #[tokio::test]
    async fn test_roundtrip_resets_quantity() {
        let cache = ItemCache::new(init_memory_pool().await.unwrap());

        let stored = record("10487840", 5);
        assert!(cache.put("10487840", &stored).await);

        let loaded = cache.get("10487840").await.unwrap();
        assert_eq!(loaded, stored.with_quantity(1));
    }

    #[tokio::test]
    async fn test_miss_returns_none() {
        let cache = ItemCache::new(init_memory_pool().await.unwrap());
        assert!(cache.get("00000000").await.is_none());
        assert!(cache.get("").await.is_none());
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let cache = ItemCache::new(init_memory_pool().await.unwrap());

        let mut first = record("1", 1);
        first.price = 1.0;
        let mut second = record("1", 1);
        second.price = 2.0;

        cache.put("1", &first).await;
        cache.put("1", &second).await;
        assert_eq!(cache.get("1").await.unwrap().price, 2.0);
    }

    #[tokio::test]
    async fn test_corrupt_payload_is_a_miss() {
        let pool = init_memory_pool().await.unwrap();
        set_value(&pool, &cache_key("1"), "{not json").await.unwrap();

        let cache = ItemCache::new(pool);
        assert!(cache.get("1").await.is_none());
    }

    #[tokio::test]
    async fn test_empty_key_not_written() {
        let pool = init_memory_pool().await.unwrap();
        let cache = ItemCache::new(pool.clone());

        assert!(!cache.put("", &record("", 1)).await);
        assert_eq!(get_value(&pool, CACHE_KEY_PREFIX).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear_keeps_other_keys() {
        let pool = init_memory_pool().await.unwrap();
        set_value(&pool, "app_history_v1", "[]").await.unwrap();

        let cache = ItemCache::new(pool.clone());
        cache.put("1", &record("1", 1)).await;
        cache.put("2", &record("2", 1)).await;

        assert!(cache.clear().await);
        assert!(cache.get("1").await.is_none());
        assert!(cache.get("2").await.is_none());
        assert_eq!(get_value(&pool, "app_history_v1").await.unwrap(), Some("[]".to_string()));
    }

    #[tokio::test]
    async fn test_storage_unavailable_is_swallowed() {
        let pool = init_memory_pool().await.unwrap();
        let cache = ItemCache::new(pool.clone());
        pool.close().await;

        assert!(cache.get("1").await.is_none());
        assert!(!cache.put("1", &record("1", 1)).await);
        assert!(!cache.clear().await);
    }
}
