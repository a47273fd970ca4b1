//! Remote catalog client
//!
//! Two lookups against the vendor catalog:
//! - product by normalized identifier (paced, cache-aware)
//! - design code → list of `(article, quantity)` lines
//!
//! Outcome classification for products:
//! - 404 is a valid "not found" answer, not an error
//! - transport failures and other non-2xx statuses fall back to the cache
//! - unparseable payloads and vendor error objects yield no value

use crate::config::CatalogConfig;
use crate::db::ItemCache;
use crate::models::{normalize_item_id, AppSettings, DesignCodeLine, ItemRecord};
use crate::services::diagnostics::{DiagnosticEvent, DiagnosticSink, Diagnostics};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, ORIGIN, REFERER};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const ACCEPT_VALUE: &str = "application/json, text/plain, */*";
const ACCEPT_LANGUAGE_VALUE: &str = "en-GB,en;q=0.9";
const REFERER_VALUE: &str = "https://www.taskrabbit.co.uk/";
const ORIGIN_VALUE: &str = "https://www.taskrabbit.co.uk";

/// Catalog client errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Vendor error: {0}")]
    VendorError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CatalogError {
    /// Failures the cache may stand in for
    pub fn is_transport(&self) -> bool {
        matches!(self, CatalogError::NetworkError(_) | CatalogError::ApiError(_, _))
    }
}

/// Product payload
#[derive(Debug, Clone, Default, Deserialize)]
struct ProductResponse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    pro_pat_minutes: Option<Value>,
    #[serde(default)]
    assembly_price: Option<Value>,
    #[serde(default)]
    image_link: Option<String>,
    #[serde(default)]
    error: Option<Value>,
}

/// Design-code payload
#[derive(Debug, Clone, Default, Deserialize)]
struct DesignCodeResponse {
    #[serde(default)]
    item_list: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct DesignCodeEntry {
    article_number: Value,
    #[serde(default)]
    quantity: Option<Value>,
}

/// Product fields extracted from a successful lookup
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetails {
    pub name: String,
    pub minutes: f64,
    pub price: f64,
    pub image_url: Option<String>,
}

/// Answer of the product endpoint
#[derive(Debug, Clone, PartialEq)]
pub enum ProductLookup {
    Found(ProductDetails),
    NotFound,
}

/// Fixed delay in front of every product request
///
/// Throttles bursts of sequential lookups to stay under vendor rate limits.
struct RequestPacer {
    delay: Duration,
}

impl RequestPacer {
    fn new(delay: Duration) -> Self {
        Self { delay }
    }

    async fn wait(&self) {
        if self.delay.is_zero() {
            return;
        }
        tracing::debug!("Request pacing: waiting {:?}", self.delay);
        tokio::time::sleep(self.delay).await;
    }
}

/// Vendor catalog client with local cache
pub struct CatalogClient {
    http_client: reqwest::Client,
    config: CatalogConfig,
    cache: ItemCache,
    pacer: RequestPacer,
}

impl CatalogClient {
    pub fn new(config: CatalogConfig, cache: ItemCache) -> Result<Self, CatalogError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));
        headers.insert(REFERER, HeaderValue::from_static(REFERER_VALUE));
        headers.insert(ORIGIN, HeaderValue::from_static(ORIGIN_VALUE));

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| CatalogError::NetworkError(e.to_string()))?;

        let pacer = RequestPacer::new(config.request_delay);

        Ok(Self {
            http_client,
            config,
            cache,
            pacer,
        })
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn cache(&self) -> &ItemCache {
        &self.cache
    }

    /// Resolve one identifier to a record
    ///
    /// `None` means malformed input or a failed lookup with nothing cached;
    /// a confirmed unknown identifier comes back as a record with
    /// `found = false`.
    pub async fn resolve_item(
        &self,
        raw_id: &str,
        settings: &AppSettings,
        sink: Option<&dyn DiagnosticSink>,
    ) -> Option<ItemRecord> {
        let diagnostics = Diagnostics::new(settings.dev_mode, sink);

        let clean_id = normalize_item_id(raw_id);
        if clean_id.is_empty() {
            tracing::debug!(raw_id, "Identifier empty after normalization");
            return None;
        }

        let cached = self.cache.get(&clean_id).await;

        if settings.offline_first && cached.is_some() {
            diagnostics.emit(DiagnosticEvent::CacheHit {
                clean_id: clean_id.clone(),
            });
            tracing::debug!(clean_id = %clean_id, "Offline-first cache hit");
            return cached;
        }

        self.pacer.wait().await;

        diagnostics.emit(DiagnosticEvent::ItemRequested {
            url: format!(
                "{}?item_no={}&locale={}",
                self.config.product_url, clean_id, self.config.locale
            ),
            clean_id: clean_id.clone(),
        });
        let started = Instant::now();

        let outcome = self.lookup_product(&clean_id).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(ProductLookup::NotFound) => {
                diagnostics.emit(DiagnosticEvent::ItemNotFound {
                    clean_id: clean_id.clone(),
                    elapsed_ms,
                });
                Some(ItemRecord::not_found(raw_id, &clean_id))
            }
            Ok(ProductLookup::Found(details)) => {
                let record = ItemRecord {
                    raw_id: raw_id.to_string(),
                    clean_id: clean_id.clone(),
                    name: details.name,
                    minutes_base: details.minutes,
                    price: details.price,
                    image_url: details.image_url,
                    found: true,
                    quantity: 1,
                };

                self.cache.put(&clean_id, &record).await;

                diagnostics.emit(DiagnosticEvent::ItemResolved {
                    clean_id: clean_id.clone(),
                    name: record.name.clone(),
                    price: record.price,
                    elapsed_ms,
                });
                Some(record)
            }
            Err(e) if e.is_transport() => {
                tracing::warn!(
                    clean_id = %clean_id,
                    error = %e,
                    cached = cached.is_some(),
                    "Catalog unreachable, falling back to cache"
                );
                diagnostics.emit(DiagnosticEvent::ItemFailed {
                    clean_id,
                    reason: e.to_string(),
                    from_cache: cached.is_some(),
                    elapsed_ms,
                });
                cached
            }
            Err(e) => {
                tracing::warn!(clean_id = %clean_id, error = %e, "Catalog payload rejected");
                diagnostics.emit(DiagnosticEvent::ItemFailed {
                    clean_id,
                    reason: e.to_string(),
                    from_cache: false,
                    elapsed_ms,
                });
                None
            }
        }
    }

    /// Query the product endpoint for a normalized identifier
    ///
    /// No pacing and no cache involvement.
    pub async fn lookup_product(&self, clean_id: &str) -> Result<ProductLookup, CatalogError> {
        tracing::debug!(clean_id = %clean_id, url = %self.config.product_url, "Querying catalog");

        let response = self
            .http_client
            .get(&self.config.product_url)
            .query(&[("item_no", clean_id), ("locale", self.config.locale.as_str())])
            .send()
            .await
            .map_err(|e| CatalogError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            tracing::info!(clean_id = %clean_id, "Item not in catalog");
            return Ok(ProductLookup::NotFound);
        }

        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            return Err(CatalogError::ApiError(status.as_u16(), body));
        }

        let payload: ProductResponse =
            serde_json::from_str(&body).map_err(|e| CatalogError::ParseError(e.to_string()))?;

        if let Some(error) = payload.error.as_ref().filter(|e| is_vendor_error(e)) {
            return Err(CatalogError::VendorError(error.to_string()));
        }

        let details = ProductDetails {
            name: payload.display_name.unwrap_or_default(),
            minutes: payload.pro_pat_minutes.as_ref().map(number_from_value).unwrap_or(0.0),
            price: payload.assembly_price.as_ref().map(parse_price_value).unwrap_or(0.0),
            image_url: payload.image_link.filter(|url| !url.trim().is_empty()),
        };

        tracing::info!(
            clean_id = %clean_id,
            name = %details.name,
            price = details.price,
            minutes = details.minutes,
            "Retrieved item from catalog"
        );

        Ok(ProductLookup::Found(details))
    }

    /// Resolve a design code, collapsing every failure to an empty list
    pub async fn resolve_design_code(
        &self,
        code: &str,
        settings: &AppSettings,
        sink: Option<&dyn DiagnosticSink>,
    ) -> Vec<DesignCodeLine> {
        self.try_resolve_design_code(code, settings, sink)
            .await
            .unwrap_or_default()
    }

    /// Resolve a design code, keeping transport and payload failures apart
    /// from a genuinely empty code
    pub async fn try_resolve_design_code(
        &self,
        code: &str,
        settings: &AppSettings,
        sink: Option<&dyn DiagnosticSink>,
    ) -> Result<Vec<DesignCodeLine>, CatalogError> {
        let diagnostics = Diagnostics::new(settings.dev_mode, sink);
        let code = code.trim();

        if code.is_empty() {
            return Err(CatalogError::InvalidInput("empty design code".to_string()));
        }

        diagnostics.emit(DiagnosticEvent::DesignCodeRequested {
            url: format!(
                "{}?design_code={}&locale={}",
                self.config.design_code_url, code, self.config.locale
            ),
            code: code.to_string(),
        });
        let started = Instant::now();

        let outcome = self.lookup_design_code(code).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &outcome {
            Ok(lines) => diagnostics.emit(DiagnosticEvent::DesignCodeResolved {
                code: code.to_string(),
                lines: lines.len(),
                elapsed_ms,
            }),
            Err(e) => {
                tracing::warn!(code, error = %e, "Design code lookup failed");
                diagnostics.emit(DiagnosticEvent::DesignCodeFailed {
                    code: code.to_string(),
                    reason: e.to_string(),
                    elapsed_ms,
                });
            }
        }

        outcome
    }

    async fn lookup_design_code(&self, code: &str) -> Result<Vec<DesignCodeLine>, CatalogError> {
        tracing::debug!(code, url = %self.config.design_code_url, "Querying design code");

        let response = self
            .http_client
            .get(&self.config.design_code_url)
            .query(&[("design_code", code), ("locale", self.config.locale.as_str())])
            .send()
            .await
            .map_err(|e| CatalogError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            return Err(CatalogError::ApiError(status.as_u16(), body));
        }

        let payload: DesignCodeResponse =
            serde_json::from_str(&body).map_err(|e| CatalogError::ParseError(e.to_string()))?;

        let lines = match payload.item_list {
            Some(list @ Value::Array(_)) => parse_design_lines(list)?,
            _ => Vec::new(),
        };

        tracing::info!(code, lines = lines.len(), "Design code resolved");

        Ok(lines)
    }
}

fn parse_design_lines(list: Value) -> Result<Vec<DesignCodeLine>, CatalogError> {
    let entries: Vec<DesignCodeEntry> =
        serde_json::from_value(list).map_err(|e| CatalogError::ParseError(e.to_string()))?;

    entries
        .into_iter()
        .map(|entry| {
            let article_id = match &entry.article_number {
                Value::String(s) => s.trim().to_string(),
                Value::Number(n) => n.to_string(),
                _ => String::new(),
            };
            if article_id.is_empty() {
                return Err(CatalogError::ParseError(
                    "design code line without article number".to_string(),
                ));
            }

            let quantity = entry
                .quantity
                .as_ref()
                .map(number_from_value)
                .filter(|q| *q >= 1.0)
                .map(|q| q.min(f64::from(u32::MAX)) as u32)
                .unwrap_or(1);

            Ok(DesignCodeLine::new(article_id, quantity))
        })
        .collect()
}

/// Vendor `error` field that signals a failed lookup
fn is_vendor_error(error: &Value) -> bool {
    match error {
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::String(s) => !s.is_empty(),
        _ => false,
    }
}

fn number_from_value(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Vendor price text such as `"£12.50"`: keep digits and dots, parse
///
/// Only the leading `digits[.digits]` run counts, so a stray second dot
/// (`"£45.00 incl. VAT"` → `"45.00."`) ends the number instead of voiding it.
pub fn parse_price(text: &str) -> f64 {
    let cleaned: String = text.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();

    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in cleaned.char_indices() {
        if c == '.' {
            if seen_dot {
                break;
            }
            seen_dot = true;
        }
        end = i + c.len_utf8();
    }

    cleaned[..end]
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn parse_price_value(value: &Value) -> f64 {
    match value {
        Value::String(s) => parse_price(s),
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("£12.50"), 12.5);
        assert_eq!(parse_price("GBP 1,234.00"), 1234.0);
        assert_eq!(parse_price("free"), 0.0);
        assert_eq!(parse_price("1.2.3"), 1.2);
        assert_eq!(parse_price(""), 0.0);
        assert_eq!(parse_price("."), 0.0);
    }

    #[test]
    fn test_parse_price_stops_at_second_dot() {
        assert_eq!(parse_price("£45.00 incl. VAT"), 45.0);
        assert_eq!(parse_price("£12.50."), 12.5);
        assert_eq!(parse_price("£7."), 7.0);
    }

    #[test]
    fn test_price_value_number() {
        assert_eq!(parse_price_value(&json!(7.25)), 7.25);
        assert_eq!(parse_price_value(&json!(null)), 0.0);
    }

    #[test]
    fn test_vendor_error_detection() {
        assert!(is_vendor_error(&json!({"code": "invalid"})));
        assert!(is_vendor_error(&json!("boom")));
        assert!(!is_vendor_error(&json!({})));
        assert!(!is_vendor_error(&json!(null)));
        assert!(!is_vendor_error(&json!(false)));
    }

    #[test]
    fn test_design_lines_parsing() {
        let lines = parse_design_lines(json!([
            {"article_number": "104.878.40", "quantity": 2},
            {"article_number": 30275861, "quantity": 1},
            {"article_number": "00263850"}
        ]))
        .unwrap();

        assert_eq!(
            lines,
            vec![
                DesignCodeLine::new("104.878.40", 2),
                DesignCodeLine::new("30275861", 1),
                DesignCodeLine::new("00263850", 1),
            ]
        );
    }

    #[test]
    fn test_design_lines_malformed() {
        assert!(parse_design_lines(json!([{"quantity": 2}])).is_err());
        assert!(parse_design_lines(json!([{"article_number": "", "quantity": 2}])).is_err());
        assert!(parse_design_lines(json!(["loose string"])).is_err());
    }

    #[test]
    fn test_transport_classification() {
        assert!(CatalogError::NetworkError("x".into()).is_transport());
        assert!(CatalogError::ApiError(500, "x".into()).is_transport());
        assert!(!CatalogError::ParseError("x".into()).is_transport());
        assert!(!CatalogError::VendorError("x".into()).is_transport());
    }

    #[tokio::test]
    async fn test_client_creation() {
        let pool = sqlx::SqlitePool::connect_lazy("sqlite::memory:").unwrap();
        let client = CatalogClient::new(CatalogConfig::default(), ItemCache::new(pool));
        assert!(client.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacer_waits_fixed_delay() {
        let pacer = RequestPacer::new(Duration::from_millis(1000));

        let start = Instant::now();
        pacer.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(1000));

        pacer.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacer_zero_delay_returns_immediately() {
        let pacer = RequestPacer::new(Duration::ZERO);
        let start = Instant::now();
        pacer.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
