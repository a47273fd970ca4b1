//! Valuation policy
//!
//! Pure computation of labor time and price totals from an item collection
//! and the user's valuation settings.

use crate::models::settings::{DEFAULT_MINIMUM_ORDER, DEFAULT_TIME_FACTOR};
use crate::models::{ItemRecord, ValuationConfig};
use fq_common::human_time::{format_minutes, split_minutes};
use serde::Serialize;

/// Totals for display and history
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Totals {
    /// Labor minutes after the time factor, rounded
    pub minutes: i64,
    /// Item price sum, raised to the minimum order when enabled
    pub price: f64,
}

impl Totals {
    pub fn hours_and_minutes(&self) -> (i64, i64) {
        split_minutes(self.minutes)
    }

    /// `2h 5m`
    pub fn time_label(&self) -> String {
        format_minutes(self.minutes)
    }
}

/// Parse user-entered decimal text
///
/// Returns `fallback` exactly when the trimmed text is not a finite number.
pub fn parse_decimal(text: &str, fallback: f64) -> f64 {
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => fallback,
    }
}

impl ValuationConfig {
    /// Multiplier actually applied to vendor minutes
    pub fn effective_time_factor(&self) -> f64 {
        if self.use_time_factor {
            parse_decimal(&self.time_factor, DEFAULT_TIME_FACTOR)
        } else {
            1.0
        }
    }

    /// Price floor actually applied
    pub fn effective_minimum_order(&self) -> f64 {
        if self.use_minimum_order {
            parse_decimal(&self.minimum_order, DEFAULT_MINIMUM_ORDER)
        } else {
            0.0
        }
    }
}

/// Compute totals for a collection of rows
pub fn compute_totals(items: &[ItemRecord], config: &ValuationConfig) -> Totals {
    let raw_minutes: f64 = items.iter().map(ItemRecord::line_minutes).sum();
    let raw_price: f64 = items.iter().map(ItemRecord::line_price).sum();

    Totals {
        minutes: round_half_up(raw_minutes * config.effective_time_factor()),
        price: raw_price.max(config.effective_minimum_order()),
    }
}

fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(clean_id: &str, minutes: f64, price: f64, quantity: u32) -> ItemRecord {
        ItemRecord {
            raw_id: clean_id.to_string(),
            clean_id: clean_id.to_string(),
            name: clean_id.to_string(),
            minutes_base: minutes,
            price,
            image_url: None,
            found: true,
            quantity,
        }
    }

    fn config(use_time_factor: bool, time_factor: &str, use_min: bool, min: &str) -> ValuationConfig {
        ValuationConfig {
            use_time_factor,
            time_factor: time_factor.to_string(),
            use_minimum_order: use_min,
            minimum_order: min.to_string(),
        }
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("1.5", 1.3), 1.5);
        assert_eq!(parse_decimal(" 2 ", 1.3), 2.0);
        assert_eq!(parse_decimal("0", 1.3), 0.0);
        assert_eq!(parse_decimal("-4.25", 1.3), -4.25);
        assert_eq!(parse_decimal("", 1.3), 1.3);
        assert_eq!(parse_decimal("abc", 1.3), 1.3);
        assert_eq!(parse_decimal("1,5", 1.3), 1.3);
        assert_eq!(parse_decimal("NaN", 33.0), 33.0);
        assert_eq!(parse_decimal("inf", 33.0), 33.0);
        assert_eq!(parse_decimal("1e400", 33.0), 33.0);
    }

    #[test]
    fn test_time_factor_applied_and_rounded() {
        let items = vec![item("a", 10.0, 5.0, 2), item("b", 15.0, 5.0, 1)];
        // 35 * 1.3 = 45.5 → 46
        let totals = compute_totals(&items, &config(true, "1.3", false, "33"));
        assert_eq!(totals.minutes, 46);
        assert_eq!(totals.price, 15.0);
    }

    #[test]
    fn test_time_factor_disabled_ignores_stored_value() {
        let items = vec![item("a", 10.5, 0.0, 1)];
        let totals = compute_totals(&items, &config(false, "9", false, "33"));
        assert_eq!(totals.minutes, 11);
    }

    #[test]
    fn test_invalid_factor_falls_back() {
        let items = vec![item("a", 100.0, 0.0, 1)];
        let totals = compute_totals(&items, &config(true, "fast", false, "33"));
        assert_eq!(totals.minutes, 130);
    }

    #[test]
    fn test_minimum_order_floor() {
        let cheap = vec![item("a", 0.0, 20.0, 1)];
        let pricey = vec![item("a", 0.0, 25.0, 2)];
        let cfg = config(false, "1.3", true, "33");

        assert_eq!(compute_totals(&cheap, &cfg).price, 33.0);
        assert_eq!(compute_totals(&pricey, &cfg).price, 50.0);
    }

    #[test]
    fn test_minimum_order_invalid_text_falls_back() {
        let cfg = config(false, "1.3", true, "lots");
        assert_eq!(compute_totals(&[], &cfg).price, 33.0);
    }

    #[test]
    fn test_not_found_items_contribute_nothing() {
        let items = vec![ItemRecord::not_found("x", "x"), item("a", 10.0, 4.0, 1)];
        let totals = compute_totals(&items, &config(false, "1.3", false, "33"));
        assert_eq!(totals.minutes, 10);
        assert_eq!(totals.price, 4.0);
    }

    #[test]
    fn test_pure_and_order_independent() {
        let items = vec![
            item("a", 12.0, 3.5, 2),
            item("b", 7.0, 10.0, 1),
            item("c", 33.0, 0.25, 4),
        ];
        let mut reversed = items.clone();
        reversed.reverse();
        let cfg = config(true, "1.3", true, "33");

        let first = compute_totals(&items, &cfg);
        assert_eq!(first, compute_totals(&items, &cfg));
        assert_eq!(first.minutes, compute_totals(&reversed, &cfg).minutes);
        assert!((first.price - compute_totals(&reversed, &cfg).price).abs() < 1e-9);
    }

    #[test]
    fn test_empty_collection() {
        let totals = compute_totals(&[], &ValuationConfig::default());
        assert_eq!(totals, Totals { minutes: 0, price: 0.0 });
    }

    #[test]
    fn test_time_label() {
        let totals = Totals { minutes: 125, price: 0.0 };
        assert_eq!(totals.hours_and_minutes(), (2, 5));
        assert_eq!(totals.time_label(), "2h 5m");
    }

    #[test]
    fn test_effective_values() {
        assert_eq!(ValuationConfig::default().effective_time_factor(), 1.3);
        assert_eq!(ValuationConfig::default().effective_minimum_order(), 0.0);
    }
}
