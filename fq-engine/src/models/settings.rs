//! Persisted user settings
//!
//! Stored as one JSON document. Every field has a default so payloads
//! written by older versions load with defaults for newer fields.

use serde::{Deserialize, Serialize};

pub const DEFAULT_TIME_FACTOR: f64 = 1.3;
pub const DEFAULT_MINIMUM_ORDER: f64 = 33.0;

/// Time multiplier and price floor applied to item totals
///
/// Numeric values are kept as the text the user typed; invalid text falls
/// back to the defaults when totals are computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationConfig {
    pub use_time_factor: bool,
    pub time_factor: String,
    pub use_minimum_order: bool,
    pub minimum_order: String,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            use_time_factor: true,
            time_factor: "1.3".to_string(),
            use_minimum_order: false,
            minimum_order: "33".to_string(),
        }
    }
}

/// User settings: valuation policy plus operational flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Prefer a cached record over a network call
    pub offline_first: bool,
    /// Enable the diagnostic sink
    pub dev_mode: bool,
    #[serde(flatten)]
    pub valuation: ValuationConfig,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            offline_first: false,
            dev_mode: false,
            valuation: ValuationConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_old_payload_merges_over_defaults() {
        let settings: AppSettings = serde_json::from_str(r#"{"offline_first": true}"#).unwrap();

        assert!(settings.offline_first);
        assert!(!settings.dev_mode);
        assert_eq!(settings.valuation, ValuationConfig::default());
    }

    #[test]
    fn test_flattened_layout() {
        let json = serde_json::to_value(AppSettings::default()).unwrap();
        assert_eq!(json["time_factor"], "1.3");
        assert_eq!(json["minimum_order"], "33");
        assert_eq!(json["use_time_factor"], true);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let settings: AppSettings =
            serde_json::from_str(r#"{"time_factor": "2", "theme": "dark"}"#).unwrap();
        assert_eq!(settings.valuation.time_factor, "2");
    }
}
