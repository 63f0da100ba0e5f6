//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode};
use serde::Serialize;

use crate::app::AppState;
use crate::envelope::{Envelope, Status};

/// Health check payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub health: &'static str,
    pub version: String,
    pub store: StoreHealth,
}

/// Entry store reachability.
#[derive(Debug, Serialize)]
pub struct StoreHealth {
    pub backend: &'static str,
    pub connected: bool,
    pub latency_ms: Option<u64>,
}

/// Simple status payload for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct ProbeResponse {
    pub probe: &'static str,
}

fn unavailable<T>(data: T) -> (StatusCode, Envelope<T>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Envelope {
            status: Status::Error,
            message: Some("Entry store unavailable".to_string()),
            data,
        },
    )
}

/// Full health check endpoint.
///
/// GET /api/health
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Envelope<HealthResponse>, (StatusCode, Envelope<HealthResponse>)> {
    let start = std::time::Instant::now();
    let connected = state.store.ping().await.is_ok();
    let latency_ms = start.elapsed().as_millis() as u64;

    let response = HealthResponse {
        health: if connected { "healthy" } else { "unhealthy" },
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: StoreHealth {
            backend: state.store.backend_name(),
            connected,
            latency_ms: connected.then_some(latency_ms),
        },
    };

    if connected {
        Ok(Envelope::success(response))
    } else {
        Err(unavailable(response))
    }
}

/// Liveness probe endpoint.
///
/// GET /api/health/live
pub async fn live() -> Envelope<ProbeResponse> {
    Envelope::success(ProbeResponse { probe: "alive" })
}

/// Readiness probe endpoint.
///
/// GET /api/health/ready
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Envelope<ProbeResponse>, (StatusCode, Envelope<ProbeResponse>)> {
    if state.store.ping().await.is_ok() {
        Ok(Envelope::success(ProbeResponse { probe: "ready" }))
    } else {
        Err(unavailable(ProbeResponse { probe: "not_ready" }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            health: "healthy",
            version: "0.3.0".to_string(),
            store: StoreHealth {
                backend: "memory",
                connected: true,
                latency_ms: Some(0),
            },
        };
        let json = serde_json::to_value(Envelope::success(response)).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["health"], "healthy");
        assert_eq!(json["store"]["backend"], "memory");
        assert_eq!(json["store"]["connected"], true);
    }

    #[test]
    fn test_unavailable_envelope() {
        let (status, envelope) = unavailable(ProbeResponse { probe: "not_ready" });
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let json = serde_json::to_value(envelope).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "Entry store unavailable");
        assert_eq!(json["probe"], "not_ready");
    }
}
