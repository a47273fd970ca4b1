//! Catalog item records

use serde::{Deserialize, Serialize};

/// Display name of a synthetic record for an identifier the catalog does not know
pub const NOT_FOUND_NAME: &str = "Item not found";

/// Strip the vendor's grouping dots and surrounding whitespace
///
/// `"104.878.40"` becomes `"10487840"`. An empty result means malformed input.
pub fn normalize_item_id(raw_id: &str) -> String {
    raw_id.replace('.', "").trim().to_string()
}

/// One resolved catalog item (or a confirmed "not found")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Identifier as entered, may contain separators
    pub raw_id: String,
    /// Normalized identifier, never empty for persisted records
    pub clean_id: String,
    /// Vendor display name
    pub name: String,
    /// Vendor-supplied labor minutes for one unit
    pub minutes_base: f64,
    /// Assembly price for one unit, vendor currency
    pub price: f64,
    /// Product image
    #[serde(default)]
    pub image_url: Option<String>,
    /// False for a confirmed "not found" result
    pub found: bool,
    /// Units on this row, at least 1
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl ItemRecord {
    /// Synthetic record for an identifier the catalog answered 404 for
    pub fn not_found(raw_id: &str, clean_id: &str) -> Self {
        Self {
            raw_id: raw_id.to_string(),
            clean_id: clean_id.to_string(),
            name: NOT_FOUND_NAME.to_string(),
            minutes_base: 0.0,
            price: 0.0,
            image_url: None,
            found: false,
            quantity: 1,
        }
    }

    /// Copy with a different quantity (clamped to at least 1)
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity.max(1);
        self
    }

    /// Price of the whole row
    pub fn line_price(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }

    /// Vendor labor minutes of the whole row
    pub fn line_minutes(&self) -> f64 {
        self.minutes_base * f64::from(self.quantity)
    }
}

/// One `(article, quantity)` line of a design code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignCodeLine {
    pub article_id: String,
    pub quantity: u32,
}

impl DesignCodeLine {
    pub fn new(article_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            article_id: article_id.into(),
            quantity: quantity.max(1),
        }
    }
}
