//! fq-engine library interface
//!
//! Assembly quote pipeline: catalog lookups with a local cache, valuation,
//! a bounded history and per-visit sessions.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{EngineError, EngineResult};

use crate::config::{CatalogConfig, SessionPacing};
use crate::db::{HistoryLog, ItemCache, SettingsStore};
use crate::services::{CatalogClient, SessionOrchestrator};
use fq_common::config::{database_path, resolve_data_folder, TomlConfig};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application state shared by the screens
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    pub settings: SettingsStore,
    pub orchestrator: Arc<SessionOrchestrator>,
}

impl AppState {
    /// Wire every component over an existing pool
    pub fn new(
        db: SqlitePool,
        catalog: CatalogConfig,
        pacing: SessionPacing,
    ) -> EngineResult<Self> {
        let client = CatalogClient::new(catalog, ItemCache::new(db.clone()))?;
        let orchestrator = SessionOrchestrator::new(Arc::new(client), HistoryLog::new(db.clone()), pacing);

        Ok(Self {
            settings: SettingsStore::new(db.clone()),
            orchestrator: Arc::new(orchestrator),
            db,
        })
    }

    /// Open the on-disk database and resolve configuration
    pub async fn open(toml_config: &TomlConfig) -> EngineResult<Self> {
        let db_path = database_path(&resolve_data_folder(toml_config));
        let db = fq_common::db::init_database_pool(&db_path).await?;

        Self::new(
            db,
            CatalogConfig::resolve(toml_config),
            SessionPacing::resolve(toml_config),
        )
    }

    pub fn cache(&self) -> &ItemCache {
        self.orchestrator.client().cache()
    }

    pub fn history(&self) -> &HistoryLog {
        self.orchestrator.history()
    }
}
