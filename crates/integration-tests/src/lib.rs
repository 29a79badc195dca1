//! Integration test support for the `RocketShoes` cart.
//!
//! [`MockCatalog`] serves the catalog API (`/products`, `/products/{id}` and
//! `/stock/{id}`) from an in-process axum server on an ephemeral port, and
//! records what it was asked so tests can assert on caching and auth.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rocketshoes_cart::CatalogConfig;
use rocketshoes_core::{Product, ProductId};
use rust_decimal::Decimal;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// The six sneakers the storefront ships with.
#[must_use]
pub fn sample_products() -> Vec<Product> {
    [
        (1, "Tênis de Caminhada Leve Confortável", 17990),
        (2, "Tênis VR Caminhada Confortável Detalhes Couro Masculino", 13990),
        (3, "Tênis Adidas Duramo Lite 2.0", 21990),
        (4, "Tênis VR Caminhada Confortável Detalhes Couro Masculino", 13990),
        (5, "Tênis VR Caminhada Confortável Detalhes Couro Masculino", 13990),
        (6, "Tênis Adidas Duramo Lite 2.0", 21990),
    ]
    .into_iter()
    .map(|(id, title, cents)| Product {
        id: ProductId::new(id),
        title: title.to_string(),
        price: Decimal::new(cents, 2),
        image: format!("https://rocketseat-cdn.s3-sa-east-1.amazonaws.com/modulo-redux/tenis{id}.jpg"),
    })
    .collect()
}

/// Stock levels matching [`sample_products`].
pub const SAMPLE_STOCK: [(i32, i64); 6] = [(1, 3), (2, 5), (3, 2), (4, 1), (5, 5), (6, 10)];

#[derive(Default)]
struct MockState {
    products: Mutex<HashMap<ProductId, Product>>,
    stock: Mutex<HashMap<ProductId, i64>>,
    malformed: Mutex<HashSet<ProductId>>,
    failing: Mutex<bool>,
    authorization: Mutex<Vec<Option<String>>>,
    product_hits: AtomicUsize,
    listing_hits: AtomicUsize,
    stock_hits: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl MockState {
    fn record(&self, headers: &HeaderMap) {
        let value = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        lock(&self.authorization).push(value);
    }

    fn failing(&self) -> Option<Response> {
        (*lock(&self.failing))
            .then(|| (StatusCode::INTERNAL_SERVER_ERROR, "catalog unavailable").into_response())
    }
}

async fn list_products(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.record(&headers);
    state.listing_hits.fetch_add(1, Ordering::SeqCst);
    if let Some(response) = state.failing() {
        return response;
    }

    let mut products: Vec<Product> = lock(&state.products).values().cloned().collect();
    products.sort_by_key(|p| p.id);
    Json(products).into_response()
}

async fn get_product(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Response {
    state.record(&headers);
    state.product_hits.fetch_add(1, Ordering::SeqCst);
    if let Some(response) = state.failing() {
        return response;
    }

    let id = ProductId::new(id);
    if lock(&state.malformed).contains(&id) {
        return (StatusCode::OK, "{\"id\":").into_response();
    }
    match lock(&state.products).get(&id) {
        Some(product) => Json(product.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}

async fn get_stock(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Response {
    state.record(&headers);
    state.stock_hits.fetch_add(1, Ordering::SeqCst);
    if let Some(response) = state.failing() {
        return response;
    }

    let id = ProductId::new(id);
    if lock(&state.malformed).contains(&id) {
        return Json(json!({ "id": id, "amount": "plenty" })).into_response();
    }
    match lock(&state.stock).get(&id) {
        Some(amount) => Json(json!({ "id": id, "amount": amount })).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}

/// In-process catalog API.
///
/// The server task is aborted when this value is dropped.
pub struct MockCatalog {
    base_url: String,
    state: Arc<MockState>,
    server: JoinHandle<()>,
}

impl MockCatalog {
    /// Serve [`sample_products`] with [`SAMPLE_STOCK`].
    pub async fn start() -> Self {
        Self::with_catalog(sample_products(), &SAMPLE_STOCK).await
    }

    /// Serve the given products and stock levels.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn with_catalog(products: Vec<Product>, stock: &[(i32, i64)]) -> Self {
        let state = Arc::new(MockState::default());
        lock(&state.products).extend(products.into_iter().map(|p| (p.id, p)));
        lock(&state.stock).extend(stock.iter().map(|&(id, amount)| (ProductId::new(id), amount)));

        let app = Router::new()
            .route("/products", get(list_products))
            .route("/products/{id}", get(get_product))
            .route("/stock/{id}", get(get_stock))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock catalog");
        let addr = listener.local_addr().expect("mock catalog has no address");
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            server,
        }
    }

    /// Base URL of the server, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Client configuration pointing at this server.
    ///
    /// # Panics
    ///
    /// Panics if the base URL does not parse, which cannot happen for a bound
    /// socket address.
    #[must_use]
    pub fn config(&self) -> CatalogConfig {
        CatalogConfig::new(&self.base_url).expect("mock catalog URL is valid")
    }

    /// Change the stock level of a product.
    pub fn set_stock(&self, id: i32, amount: i64) {
        lock(&self.state.stock).insert(ProductId::new(id), amount);
    }

    /// Serve malformed bodies for this product's stock and product routes.
    pub fn break_product(&self, id: i32) {
        lock(&self.state.malformed).insert(ProductId::new(id));
    }

    /// Answer every request with a 500 while `failing` is set.
    pub fn set_failing(&self, failing: bool) {
        *lock(&self.state.failing) = failing;
    }

    /// Number of `GET /products/{id}` requests served.
    #[must_use]
    pub fn product_hits(&self) -> usize {
        self.state.product_hits.load(Ordering::SeqCst)
    }

    /// Number of `GET /products` requests served.
    #[must_use]
    pub fn listing_hits(&self) -> usize {
        self.state.listing_hits.load(Ordering::SeqCst)
    }

    /// Number of `GET /stock/{id}` requests served.
    #[must_use]
    pub fn stock_hits(&self) -> usize {
        self.state.stock_hits.load(Ordering::SeqCst)
    }

    /// `Authorization` header of every request, in arrival order.
    #[must_use]
    pub fn authorization_headers(&self) -> Vec<Option<String>> {
        lock(&self.state.authorization).clone()
    }
}

impl Drop for MockCatalog {
    fn drop(&mut self) {
        self.server.abort();
    }
}
