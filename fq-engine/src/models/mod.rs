//! Data models for fq-engine
//!
//! - Item records and design-code lines returned by the catalog
//! - Persisted user settings and valuation configuration
//! - History records
//! - Per-visit session state machine

pub mod history_record;
pub mod item;
pub mod session;
pub mod settings;

pub use history_record::{HistoryKind, HistoryRecord, HistorySummary};
pub use item::{normalize_item_id, DesignCodeLine, ItemRecord};
pub use session::{Session, SessionKind, SessionState, StateTransition};
pub use settings::{AppSettings, ValuationConfig};
