//! Tracing subscriber bootstrap
//!
//! `RUST_LOG` wins over the configured level. With `logging.file` set, output
//! is appended to that file instead of stderr.

use crate::config::LoggingConfig;
use crate::{Error, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Build the filter for a configured level
pub fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Install the global tracing subscriber
///
/// Returns `Ok(false)` when a global subscriber was already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<bool> {
    let filter = build_env_filter(config);

    let installed = match &config.file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .is_ok()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .is_ok(),
    };

    if installed {
        tracing::info!(level = %config.level, "Tracing initialized");
    }

    Ok(installed)
}

/// Validate a level string without installing anything
pub fn validate_level(level: &str) -> Result<()> {
    level
        .parse::<tracing::Level>()
        .map(|_| ())
        .map_err(|_| Error::Config(format!("Unknown log level: {}", level)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_level() {
        assert!(validate_level("debug").is_ok());
        assert!(validate_level("WARN").is_ok());
        assert!(matches!(validate_level("loud"), Err(Error::Config(_))));
    }
}
