//! Mock vendor catalog
//!
//! Serves `product.json` and `item_list.json` from an axum router bound to
//! an ephemeral local port. Unknown identifiers and codes answer 404.

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

/// Canned response
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
}

impl MockResponse {
    pub fn json(value: Value) -> Self {
        Self {
            status: 200,
            body: value.to_string(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: "{}".to_string(),
        }
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

/// Request seen by the mock
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub endpoint: &'static str,
    pub params: HashMap<String, String>,
}

#[derive(Clone, Default)]
struct MockState {
    products: Arc<Mutex<HashMap<String, MockResponse>>>,
    design_codes: Arc<Mutex<HashMap<String, MockResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Running mock catalog, stopped on drop
pub struct MockCatalog {
    pub base_url: String,
    state: MockState,
    server: JoinHandle<()>,
}

impl MockCatalog {
    pub async fn start() -> Self {
        let state = MockState::default();

        let app = Router::new()
            .route("/product.json", get(product))
            .route("/item_list.json", get(item_list))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
            server,
        }
    }

    pub fn product_url(&self) -> String {
        format!("{}/product.json", self.base_url)
    }

    pub fn design_code_url(&self) -> String {
        format!("{}/item_list.json", self.base_url)
    }

    pub fn set_product(&self, item_no: &str, response: MockResponse) {
        self.state.products.lock().unwrap().insert(item_no.to_string(), response);
    }

    pub fn set_design_code(&self, code: &str, response: MockResponse) {
        self.state.design_codes.lock().unwrap().insert(code.to_string(), response);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn product_requests(&self) -> usize {
        self.requests().iter().filter(|r| r.endpoint == "product").count()
    }

    pub fn design_code_requests(&self) -> usize {
        self.requests().iter().filter(|r| r.endpoint == "item_list").count()
    }
}

impl Drop for MockCatalog {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Product payload in the vendor's shape
pub fn product_body(name: &str, minutes: f64, price: &str) -> MockResponse {
    MockResponse::json(json!({
        "display_name": name,
        "pro_pat_minutes": minutes,
        "assembly_price": price,
        "image_link": format!("https://img.example/{}.jpg", name.to_lowercase()),
    }))
}

/// Design-code payload from `(article_number, quantity)` pairs
pub fn design_code_body(lines: &[(&str, u32)]) -> MockResponse {
    let item_list: Vec<Value> = lines
        .iter()
        .map(|(article, quantity)| json!({ "article_number": article, "quantity": quantity }))
        .collect();
    MockResponse::json(json!({ "item_list": item_list }))
}

async fn product(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let item_no = params.get("item_no").cloned().unwrap_or_default();
    let response = state.products.lock().unwrap().get(&item_no).cloned();
    record(&state, "product", params);
    respond(response)
}

async fn item_list(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let code = params.get("design_code").cloned().unwrap_or_default();
    let response = state.design_codes.lock().unwrap().get(&code).cloned();
    record(&state, "item_list", params);
    respond(response)
}

fn record(state: &MockState, endpoint: &'static str, params: HashMap<String, String>) {
    state
        .requests
        .lock()
        .unwrap()
        .push(RecordedRequest { endpoint, params });
}

fn respond(response: Option<MockResponse>) -> impl IntoResponse {
    let response = response.unwrap_or_else(|| MockResponse::status(404));
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], response.body)
}
