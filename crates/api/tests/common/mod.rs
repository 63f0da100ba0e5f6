//! Common test utilities for integration tests.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`; every
//! test gets its own entry store and export directory.

// Allow dead code in this module - not every integration test uses every helper.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use domain::models::ForecastPoint;
use persistence::repositories::{EntryStore, InMemoryEntryStore, SqliteEntryStore};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use weather_dashboard_api::{
    app::create_app,
    config::Config,
    extractors::OWNER_HEADER,
    services::{ForecastError, ForecastProvider, ForecastQuery},
};

/// Canned forecast responses for route tests.
#[derive(Debug, Clone)]
pub enum StubResponse {
    Points(Vec<ForecastPoint>),
    Unauthorized,
}

/// Forecast provider that never touches the network.
#[derive(Debug)]
pub struct StubForecastProvider {
    response: StubResponse,
    calls: Mutex<Vec<ForecastQuery>>,
}

impl StubForecastProvider {
    pub fn new(response: StubResponse) -> Self {
        Self {
            response,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queries received so far.
    pub fn calls(&self) -> Vec<ForecastQuery> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ForecastProvider for StubForecastProvider {
    async fn fetch_forecast(
        &self,
        query: &ForecastQuery,
    ) -> Result<Vec<ForecastPoint>, ForecastError> {
        self.calls.lock().unwrap().push(query.clone());
        match &self.response {
            StubResponse::Points(points) => Ok(points.clone()),
            StubResponse::Unauthorized => Err(ForecastError::Api {
                status_code: 401,
                message: "Invalid API key. Please see https://openweathermap.org/faq#error401 for more info.".to_string(),
            }),
        }
    }
}

/// Generate `count` forecast points three hours apart.
pub fn forecast_points(count: usize) -> Vec<ForecastPoint> {
    let start = base_time();
    (0..count)
        .map(|i| ForecastPoint {
            timestamp: start + Duration::hours(3 * i as i64),
            temperature: 20.0 + i as f64,
            humidity: 50.0 + i as f64,
            wind_speed: 2.5,
            description: "scattered clouds".to_string(),
        })
        .collect()
}

pub fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Test configuration with the export directory redirected.
pub fn test_config(export_dir: &std::path::Path, overrides: &[(&str, &str)]) -> Config {
    let export_dir = export_dir.to_string_lossy().to_string();
    let mut all = vec![("dashboard.export_dir", export_dir.as_str())];
    all.extend_from_slice(overrides);
    Config::load_for_test(&all).expect("Failed to build test config")
}

/// A router plus the handles tests inspect directly.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<dyn EntryStore>,
    pub forecast: Arc<StubForecastProvider>,
    pub export_dir: TempDir,
}

impl TestApp {
    pub fn export_path(&self, filename: &str) -> PathBuf {
        self.export_dir.path().join(filename)
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, body_json(response.into_body()).await)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(request(Method::GET, uri, None, None)).await
    }

    pub async fn get_as(&self, uri: &str, owner: &str) -> (StatusCode, Value) {
        self.send(request(Method::GET, uri, Some(owner), None)).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(request(Method::POST, uri, None, Some(body))).await
    }

    pub async fn post_as(&self, uri: &str, owner: &str, body: Value) -> (StatusCode, Value) {
        self.send(request(Method::POST, uri, Some(owner), Some(body)))
            .await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(request(Method::DELETE, uri, None, None)).await
    }

    pub async fn delete_as(&self, uri: &str, owner: &str) -> (StatusCode, Value) {
        self.send(request(Method::DELETE, uri, Some(owner), None))
            .await
    }
}

/// Create a test application backed by the in-memory store.
pub fn create_test_app(response: StubResponse, overrides: &[(&str, &str)]) -> TestApp {
    build(Arc::new(InMemoryEntryStore::new()), response, overrides)
}

/// Create a test application backed by an in-memory SQLite database.
pub async fn create_sqlite_test_app(response: StubResponse) -> TestApp {
    let config = persistence::db::DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        connect_timeout_secs: 5,
    };
    let pool = persistence::db::create_pool(&config)
        .await
        .expect("Failed to open test database");
    persistence::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    build(Arc::new(SqliteEntryStore::new(pool)), response, &[])
}

fn build(store: Arc<dyn EntryStore>, response: StubResponse, overrides: &[(&str, &str)]) -> TestApp {
    let export_dir = TempDir::new().expect("Failed to create export dir");
    let config = test_config(export_dir.path(), overrides);
    let forecast = Arc::new(StubForecastProvider::new(response));

    let router = create_app(config, store.clone(), forecast.clone());

    TestApp {
        router,
        store,
        forecast,
        export_dir,
    }
}

/// Build a request with an optional owner header and JSON body.
pub fn request(
    method: Method,
    uri: &str,
    owner: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(owner) = owner {
        builder = builder.header(OWNER_HEADER, owner);
    }

    match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Parse a response body as JSON.
pub async fn body_json(body: Body) -> Value {
    let bytes = to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}
