//! Developer-mode diagnostics
//!
//! Lookups and sessions emit structured events to an explicitly passed
//! sink. The sink is only consulted when developer mode is on and never
//! influences control flow. Regular `tracing` output is independent of it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// Severity shown next to a console line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Info,
    Warn,
    Error,
}

/// Structured trace event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiagnosticEvent {
    /// Offline-first fast path served the item
    CacheHit { clean_id: String },
    /// Product request about to be sent
    ItemRequested { url: String, clean_id: String },
    /// Catalog returned the item
    ItemResolved {
        clean_id: String,
        name: String,
        price: f64,
        elapsed_ms: u64,
    },
    /// Catalog confirmed the identifier does not exist
    ItemNotFound { clean_id: String, elapsed_ms: u64 },
    /// Lookup failed; `from_cache` tells whether a cached copy was used instead
    ItemFailed {
        clean_id: String,
        reason: String,
        from_cache: bool,
        elapsed_ms: u64,
    },
    /// Design-code request about to be sent
    DesignCodeRequested { url: String, code: String },
    DesignCodeResolved {
        code: String,
        lines: usize,
        elapsed_ms: u64,
    },
    DesignCodeFailed {
        code: String,
        reason: String,
        elapsed_ms: u64,
    },
    /// Session started processing a batch
    BatchStarted { total: usize },
    /// Session is fetching entry `position` of `total`
    BatchProgress {
        position: usize,
        total: usize,
        raw_id: String,
    },
    RowAdded { clean_id: String, quantity: u32 },
    QuantityIncreased { clean_id: String, quantity: u32 },
    /// Identifier produced no record
    ResolutionFailed { raw_id: String },
    /// Batch stopped because the session was torn down
    BatchAbandoned { processed: usize, total: usize },
}

impl DiagnosticEvent {
    pub fn level(&self) -> DiagnosticLevel {
        match self {
            DiagnosticEvent::ItemNotFound { .. } | DiagnosticEvent::BatchAbandoned { .. } => {
                DiagnosticLevel::Warn
            }
            DiagnosticEvent::ItemFailed { from_cache: true, .. } => DiagnosticLevel::Warn,
            DiagnosticEvent::ItemFailed { .. }
            | DiagnosticEvent::DesignCodeFailed { .. }
            | DiagnosticEvent::ResolutionFailed { .. } => DiagnosticLevel::Error,
            _ => DiagnosticLevel::Info,
        }
    }

    /// One console line
    pub fn message(&self) -> String {
        match self {
            DiagnosticEvent::CacheHit { clean_id } => format!("[API] Cache hit: {}", clean_id),
            DiagnosticEvent::ItemRequested { url, .. } => format!("[API] Fetching item: {}", url),
            DiagnosticEvent::ItemResolved {
                clean_id,
                name,
                price,
                elapsed_ms,
            } => format!("[API] {} {} ({:.2}) in {}ms", clean_id, name, price, elapsed_ms),
            DiagnosticEvent::ItemNotFound { clean_id, .. } => format!("[API] Item 404: {}", clean_id),
            DiagnosticEvent::ItemFailed {
                clean_id,
                reason,
                from_cache,
                ..
            } => {
                if *from_cache {
                    format!("[API] {} failed ({}), using cached copy", clean_id, reason)
                } else {
                    format!("[API] {} failed: {}", clean_id, reason)
                }
            }
            DiagnosticEvent::DesignCodeRequested { url, .. } => {
                format!("[API] Resolving code URL: {}", url)
            }
            DiagnosticEvent::DesignCodeResolved { code, lines, .. } => {
                format!("[API] Code {} has {} lines", code, lines)
            }
            DiagnosticEvent::DesignCodeFailed { code, reason, .. } => {
                format!("[API] Code {} error: {}", code, reason)
            }
            DiagnosticEvent::BatchStarted { total } => format!("[UI] Processing {} items...", total),
            DiagnosticEvent::BatchProgress {
                position,
                total,
                raw_id,
            } => format!("[UI] Fetching {}/{}: {}", position, total, raw_id),
            DiagnosticEvent::RowAdded { clean_id, .. } => format!("[UI] Added: {}", clean_id),
            DiagnosticEvent::QuantityIncreased { clean_id, quantity } => {
                format!("[UI] Increased qty: {} (x{})", clean_id, quantity)
            }
            DiagnosticEvent::ResolutionFailed { raw_id } => format!("[UI] Error: {}", raw_id),
            DiagnosticEvent::BatchAbandoned { processed, total } => {
                format!("[UI] Session closed after {}/{} items", processed, total)
            }
        }
    }
}

/// Timestamped event as delivered to a sink
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticRecord {
    pub at: DateTime<Utc>,
    pub level: DiagnosticLevel,
    pub event: DiagnosticEvent,
}

/// Receiver of diagnostic records
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, record: DiagnosticRecord);
}

/// Forward records to live subscribers (e.g. an on-screen console)
impl DiagnosticSink for broadcast::Sender<DiagnosticRecord> {
    fn record(&self, record: DiagnosticRecord) {
        // No subscribers is fine
        let _ = self.send(record);
    }
}

/// Sink that keeps every record in memory
#[derive(Clone, Default)]
pub struct CapturingSink {
    records: Arc<Mutex<Vec<DiagnosticRecord>>>,
}

impl CapturingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.records().into_iter().map(|r| r.event).collect()
    }

    pub fn clear(&self) {
        if let Ok(mut records) = self.records.lock() {
            records.clear();
        }
    }
}

impl DiagnosticSink for CapturingSink {
    fn record(&self, record: DiagnosticRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }
}

/// Sink gated by developer mode
#[derive(Clone, Copy)]
pub struct Diagnostics<'a> {
    sink: Option<&'a dyn DiagnosticSink>,
}

impl<'a> Diagnostics<'a> {
    pub fn new(dev_mode: bool, sink: Option<&'a dyn DiagnosticSink>) -> Self {
        Self {
            sink: if dev_mode { sink } else { None },
        }
    }

    pub fn is_active(&self) -> bool {
        self.sink.is_some()
    }

    pub fn emit(&self, event: DiagnosticEvent) {
        if let Some(sink) = self.sink {
            sink.record(DiagnosticRecord {
                at: Utc::now(),
                level: event.level(),
                event,
            });
        }
    }
}
