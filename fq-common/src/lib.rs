//! # Flatquote Common Library
//!
//! Shared code for the Flatquote crates:
//! - Error types
//! - TOML configuration and data folder resolution
//! - SQLite key/value persistence
//! - Logging bootstrap
//! - Human-readable duration formatting

pub mod config;
pub mod db;
pub mod error;
pub mod human_time;
pub mod logging;

pub use error::{Error, Result};
