//! Service modules for the pricing pipeline
//!
//! - Catalog client: remote lookups with cache fallback
//! - Valuation: pure totals computation
//! - Session orchestrator: sequential resolution and history writes
//! - Diagnostics: developer-mode trace sink

pub mod catalog_client;
pub mod diagnostics;
pub mod session_orchestrator;
pub mod valuation;

pub use catalog_client::{CatalogClient, CatalogError, ProductLookup};
pub use diagnostics::{
    CapturingSink, DiagnosticEvent, DiagnosticLevel, DiagnosticRecord, DiagnosticSink, Diagnostics,
};
pub use session_orchestrator::{BatchReport, SessionError, SessionOrchestrator};
pub use valuation::{compute_totals, parse_decimal, Totals};
