//! Engine configuration resolution
//!
//! **Priority:** ENV → TOML → compiled default, per value.

use fq_common::config::TomlConfig;
use std::time::Duration;
use tracing::{info, warn};

pub const API_URL_ENV: &str = "FLATQUOTE_API_URL";
pub const DESIGN_API_URL_ENV: &str = "FLATQUOTE_DESIGN_API_URL";
pub const LOCALE_ENV: &str = "FLATQUOTE_LOCALE";
pub const API_DELAY_ENV: &str = "FLATQUOTE_API_DELAY_MS";

pub const DEFAULT_API_URL: &str = "https://www.taskrabbit.co.uk";
pub const DEFAULT_DESIGN_API_URL: &str = "https://www.taskrabbit.co.uk";
pub const DEFAULT_LOCALE: &str = "en-GB";
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LIST_PACING_MS: u64 = 500;
pub const DEFAULT_CODE_PACING_MS: u64 = 300;

const PRODUCT_ENDPOINT_FILE: &str = "product.json";
const PRODUCT_ENDPOINT_PATH: &str = "assembly_services/product.json";
const DESIGN_ENDPOINT_FILE: &str = "item_list.json";
const DESIGN_ENDPOINT_PATH: &str = "ikea/design_code_service/item_list.json";

/// Remote catalog settings
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    /// Full product lookup URL
    pub product_url: String,
    /// Full design-code lookup URL
    pub design_code_url: String,
    pub locale: String,
    /// Fixed wait before each product request
    pub request_delay: Duration,
    pub timeout: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            product_url: product_endpoint(DEFAULT_API_URL),
            design_code_url: design_code_endpoint(DEFAULT_DESIGN_API_URL),
            locale: DEFAULT_LOCALE.to_string(),
            request_delay: Duration::from_millis(DEFAULT_REQUEST_DELAY_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl CatalogConfig {
    /// Resolve from environment, then TOML, then defaults
    pub fn resolve(toml_config: &TomlConfig) -> Self {
        let section = &toml_config.catalog;

        let api_url = env_value(API_URL_ENV)
            .or_else(|| section.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let design_api_url = env_value(DESIGN_API_URL_ENV)
            .or_else(|| section.design_api_url.clone())
            .unwrap_or_else(|| DEFAULT_DESIGN_API_URL.to_string());
        let locale = env_value(LOCALE_ENV)
            .or_else(|| section.locale.clone())
            .unwrap_or_else(|| DEFAULT_LOCALE.to_string());

        let delay_ms = match env_value(API_DELAY_ENV) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(ms) => Some(ms),
                Err(_) => {
                    warn!(value = %raw, "Invalid {}, ignoring", API_DELAY_ENV);
                    None
                }
            },
            None => None,
        }
        .or(section.request_delay_ms)
        .unwrap_or(DEFAULT_REQUEST_DELAY_MS);

        let config = Self {
            product_url: product_endpoint(&api_url),
            design_code_url: design_code_endpoint(&design_api_url),
            locale,
            request_delay: Duration::from_millis(delay_ms),
            timeout: Duration::from_secs(section.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        };

        info!(
            product_url = %config.product_url,
            design_code_url = %config.design_code_url,
            locale = %config.locale,
            delay_ms,
            "Catalog configuration resolved"
        );

        config
    }
}

/// Pauses between consecutive identifiers within one batch
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPacing {
    pub list: Duration,
    pub code: Duration,
}

impl Default for SessionPacing {
    fn default() -> Self {
        Self {
            list: Duration::from_millis(DEFAULT_LIST_PACING_MS),
            code: Duration::from_millis(DEFAULT_CODE_PACING_MS),
        }
    }
}

impl SessionPacing {
    pub fn resolve(toml_config: &TomlConfig) -> Self {
        let section = &toml_config.session;
        Self {
            list: Duration::from_millis(section.list_pacing_ms.unwrap_or(DEFAULT_LIST_PACING_MS)),
            code: Duration::from_millis(section.code_pacing_ms.unwrap_or(DEFAULT_CODE_PACING_MS)),
        }
    }

    /// No pauses at all (tests, batch tooling)
    pub fn none() -> Self {
        Self {
            list: Duration::ZERO,
            code: Duration::ZERO,
        }
    }
}

/// Product lookup URL for a configured base
///
/// A base that already names the endpoint file is used verbatim.
pub fn product_endpoint(base: &str) -> String {
    endpoint(base, PRODUCT_ENDPOINT_FILE, PRODUCT_ENDPOINT_PATH)
}

/// Design-code lookup URL for a configured base
pub fn design_code_endpoint(base: &str) -> String {
    endpoint(base, DESIGN_ENDPOINT_FILE, DESIGN_ENDPOINT_PATH)
}

fn endpoint(base: &str, file: &str, path: &str) -> String {
    let base = base.trim();
    if base.contains(file) {
        base.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), path)
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
