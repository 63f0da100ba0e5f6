use axum::{
    error_handling::HandleErrorLayer,
    middleware,
    routing::{delete, get, post},
    BoxError, Router,
};
use persistence::repositories::EntryStore;
use std::sync::Arc;
use std::time::Duration;
use tower::{timeout::error::Elapsed, timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::error::ApiError;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{alerts, cities, dashboard, entries, forecast, health, settings};
use crate::services::{DashboardRenderer, ForecastProvider};

/// Shared handles every handler works through.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntryStore>,
    pub forecast: Arc<dyn ForecastProvider>,
    pub renderer: Arc<DashboardRenderer>,
    pub config: Arc<Config>,
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed("Method not allowed".to_string())
}

/// Maps errors raised by the service stack (only the timeout today) to the envelope.
async fn handle_layer_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        ApiError::Timeout
    } else {
        ApiError::Internal(format!("Unhandled middleware error: {}", err))
    }
}

pub fn create_app(
    config: Config,
    store: Arc<dyn EntryStore>,
    forecast: Arc<dyn ForecastProvider>,
) -> Router {
    let config = Arc::new(config);
    let state = AppState {
        store,
        forecast,
        renderer: Arc::new(DashboardRenderer::new(&config.dashboard)),
        config: config.clone(),
    };

    let dashboard_routes = Router::new()
        .route("/add_entry", post(entries::add_entry))
        .route("/get_entries", get(entries::get_entries))
        .route("/delete_entry/:id", delete(entries::delete_entry))
        .route("/clear_data", post(entries::clear_data))
        .route("/fetch_api_data", post(forecast::fetch_api_data))
        .route("/generate_dashboard", get(dashboard::generate_dashboard))
        .route("/get_cities", get(cities::get_cities))
        .route("/set_alerts", post(alerts::set_alerts))
        .route("/get_alerts", get(alerts::get_alerts))
        .route("/get_config", get(settings::get_config));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(dashboard_routes)
        .merge(public_routes)
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_layer_error))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.server.request_timeout_secs,
                ))),
        )
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(&config.server.cors_origins))
        .with_state(state)
}
