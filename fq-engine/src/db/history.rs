//! Bounded session history
//!
//! One JSON array under `app_history_v1`, newest first, at most
//! [`HISTORY_LIMIT`] records. Records are never edited, only removed.

use crate::models::{HistoryRecord, HistorySummary};
use fq_common::db::{delete_value, get_json, set_json};
use fq_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::{error, info, warn};

pub const HISTORY_KEY: &str = "app_history_v1";
pub const HISTORY_LIMIT: usize = 50;

/// History log over the key/value store
#[derive(Clone)]
pub struct HistoryLog {
    db: SqlitePool,
}

impl HistoryLog {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// All records, newest first
    pub async fn list(&self) -> Vec<HistoryRecord> {
        match self.try_list().await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "History read failed, showing empty history");
                Vec::new()
            }
        }
    }

    /// All records, newest first, with read failures reported
    pub async fn try_list(&self) -> Result<Vec<HistoryRecord>> {
        Ok(get_json::<Vec<HistoryRecord>>(&self.db, HISTORY_KEY)
            .await?
            .unwrap_or_default())
    }

    /// Current records as the base for a rewrite
    ///
    /// An undecodable payload is replaced; a failed read returns `None` so
    /// stored records are not overwritten.
    async fn records_for_update(&self) -> Option<Vec<HistoryRecord>> {
        match self.try_list().await {
            Ok(records) => Some(records),
            Err(Error::Serialization(e)) => {
                warn!(error = %e, "Stored history unreadable, starting over");
                Some(Vec::new())
            }
            Err(e) => {
                error!(error = %e, "History read failed, leaving stored records untouched");
                None
            }
        }
    }

    /// Prepend a new record and trim to the limit
    ///
    /// The record is returned even when persisting it failed.
    pub async fn append(&self, summary: HistorySummary) -> HistoryRecord {
        let record = HistoryRecord::from_summary(summary);

        let Some(mut records) = self.records_for_update().await else {
            return record;
        };
        records.insert(0, record.clone());
        records.truncate(HISTORY_LIMIT);

        match set_json(&self.db, HISTORY_KEY, &records).await {
            Ok(()) => info!(
                id = %record.id,
                title = %record.title,
                total_price = record.total_price,
                "History record saved"
            ),
            Err(e) => error!(error = %e, "Failed to save history"),
        }

        record
    }

    /// Remove one record by id; unknown ids are a no-op
    pub async fn remove(&self, id: &str) -> Vec<HistoryRecord> {
        let Some(records) = self.records_for_update().await else {
            return Vec::new();
        };
        let records: Vec<HistoryRecord> = records.into_iter().filter(|r| r.id != id).collect();

        if let Err(e) = set_json(&self.db, HISTORY_KEY, &records).await {
            error!(id, error = %e, "Failed to delete history item");
        }

        records
    }

    /// Drop every record
    pub async fn clear(&self) {
        if let Err(e) = delete_value(&self.db, HISTORY_KEY).await {
            error!(error = %e, "Failed to clear history");
        }
    }
}
