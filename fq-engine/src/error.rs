//! Error types for fq-engine
//!
//! Only start-up can fail hard. Once running, lookups degrade to cached or
//! absent values and persistence failures are logged.

use crate::services::CatalogError;
use thiserror::Error;

/// Start-up error
#[derive(Debug, Error)]
pub enum EngineError {
    /// Database, config or IO failure from the shared layer
    #[error(transparent)]
    Common(#[from] fq_common::Error),

    /// HTTP client could not be built
    #[error("Catalog client error: {0}")]
    Catalog(#[from] CatalogError),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
