//! Common test utilities for in-process API testing.
//!
//! This module provides a test fixture that builds the router around a
//! `MockItemStore`, so handlers can be driven with controllable storage
//! failures and latency.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use itemflow_core::{
    testing::MockItemStore, Config, Item, ItemProcessor, ItemStore, ProcessorConfig,
};
use itemflow_server::state::AppState;

/// Re-export fixtures for test convenience
pub use itemflow_core::testing::fixtures;

/// Test fixture for API testing with a mock store.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_item_creation() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post("/api/items", json!({
///         "name": "name1",
///         "email": "email1@test.com"
///     })).await;
///
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock store - seed items, inject failures
    pub store: Arc<MockItemStore>,
    /// The processor behind `/api/items/process`
    pub processor: Arc<ItemProcessor>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a fixture with an empty store.
    pub async fn new() -> Self {
        Self::with_items(Vec::new()).await
    }

    /// Create a fixture seeded with the given items.
    pub async fn with_items(items: Vec<Item>) -> Self {
        Self::with_config(items, ProcessorConfig::default()).await
    }

    /// Create a fixture with custom processor configuration.
    pub async fn with_config(items: Vec<Item>, processor_config: ProcessorConfig) -> Self {
        let store = Arc::new(MockItemStore::with_items(items).await);
        let dyn_store = Arc::clone(&store) as Arc<dyn ItemStore>;

        let config = Config {
            processor: processor_config.clone(),
            ..Default::default()
        };

        let processor = Arc::new(ItemProcessor::new(processor_config, Arc::clone(&dyn_store)));
        let state = Arc::new(AppState::new(config, dyn_store, Arc::clone(&processor)));
        let router = itemflow_server::api::create_router(state);

        Self {
            router,
            store,
            processor,
        }
    }

    /// Slow every store call down.
    pub async fn set_store_delay(&self, delay: Duration) {
        self.store.set_delay(delay).await;
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        self.send(request).await
    }

    /// Fetch `/metrics` as text.
    pub async fn metrics_text(&self) -> String {
        let request = Request::builder()
            .uri("/metrics")
            .body(Body::empty())
            .unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        String::from_utf8(bytes.to_vec()).expect("Metrics are not UTF-8")
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}

/// Helper to assert a JSON path equals expected value.
#[macro_export]
macro_rules! assert_json_path {
    ($json:expr, $path:expr, $expected:expr) => {
        let actual = &$json[$path];
        assert_eq!(
            actual, &$expected,
            "Path '{}' expected {:?}, got {:?}",
            $path, $expected, actual
        );
    };
}
