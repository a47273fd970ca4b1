//! History log records

use crate::models::ItemRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which flow produced a history record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    /// Design-code lookup
    Code,
    /// Typed identifier list
    List,
}

/// Immutable summary of one finished session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub kind: HistoryKind,
    pub title: String,
    pub total_minutes: i64,
    pub total_price: f64,
    /// Snapshot of the session rows
    pub items: Vec<ItemRecord>,
}

/// Everything a history record holds except identity and timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySummary {
    pub kind: HistoryKind,
    pub title: String,
    pub total_minutes: i64,
    pub total_price: f64,
    pub items: Vec<ItemRecord>,
}

impl HistoryRecord {
    /// Stamp a summary with a fresh id and the current time
    pub fn from_summary(summary: HistorySummary) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            kind: summary.kind,
            title: summary.title,
            total_minutes: summary.total_minutes,
            total_price: summary.total_price,
            items: summary.items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&HistoryKind::Code).unwrap(), "\"code\"");
        assert_eq!(serde_json::to_string(&HistoryKind::List).unwrap(), "\"list\"");
    }

    #[test]
    fn test_from_summary_assigns_unique_ids() {
        let summary = HistorySummary {
            kind: HistoryKind::List,
            title: "List: 1 items".to_string(),
            total_minutes: 10,
            total_price: 5.0,
            items: vec![],
        };

        let a = HistoryRecord::from_summary(summary.clone());
        let b = HistoryRecord::from_summary(summary);
        assert_ne!(a.id, b.id);
        assert_eq!(a.title, "List: 1 items");
    }
}
