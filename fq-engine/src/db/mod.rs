//! Persistence for fq-engine
//!
//! Everything lives in the shared `kv_store` table (see `fq_common::db`).
//! Failures here are never fatal: they are logged and the caller proceeds.

pub mod cache;
pub mod history;
pub mod settings;

pub use cache::ItemCache;
pub use history::HistoryLog;
pub use settings::SettingsStore;
