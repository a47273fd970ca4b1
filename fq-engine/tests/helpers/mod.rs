//! Test Helper Utilities
//!
//! Shared utilities for testing fq-engine

#![allow(dead_code)]

pub mod mock_catalog;

pub use mock_catalog::{design_code_body, product_body, MockCatalog, MockResponse};

use fq_engine::config::{CatalogConfig, SessionPacing};
use fq_engine::db::{HistoryLog, ItemCache};
use fq_engine::models::AppSettings;
use fq_engine::services::{CatalogClient, SessionOrchestrator};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;

/// Fresh in-memory database with the key/value table
pub async fn test_pool() -> SqlitePool {
    fq_common::db::init_memory_pool().await.unwrap()
}

/// Catalog configuration pointing at the mock, without request pacing
pub fn test_catalog_config(mock: &MockCatalog) -> CatalogConfig {
    CatalogConfig {
        product_url: mock.product_url(),
        design_code_url: mock.design_code_url(),
        locale: "en-GB".to_string(),
        request_delay: Duration::ZERO,
        timeout: Duration::from_secs(5),
    }
}

pub fn create_test_client(mock: &MockCatalog, pool: &SqlitePool) -> CatalogClient {
    CatalogClient::new(test_catalog_config(mock), ItemCache::new(pool.clone())).unwrap()
}

pub fn create_test_orchestrator(
    mock: &MockCatalog,
    pool: &SqlitePool,
    pacing: SessionPacing,
) -> SessionOrchestrator {
    SessionOrchestrator::new(
        Arc::new(create_test_client(mock, pool)),
        HistoryLog::new(pool.clone()),
        pacing,
    )
}

pub fn settings(offline_first: bool, dev_mode: bool) -> AppSettings {
    AppSettings {
        offline_first,
        dev_mode,
        ..Default::default()
    }
}
