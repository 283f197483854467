use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::state::AppState;

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    /// `"ok"` while visits can be stored, `"degraded"` otherwise.
    pub status: &'static str,
    pub store: &'static str,
    /// Whether a GeoIP database is loaded. Tracking works without one, so
    /// this never degrades the status.
    pub geoip: bool,
    pub version: &'static str,
}

/// `GET /health`: 200 when the visit store answers a ping, 503 otherwise.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthReport>) {
    let store_ok = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "Health check: visit store unreachable");
            false
        }
    };

    let report = HealthReport {
        status: if store_ok { "ok" } else { "degraded" },
        store: if store_ok { "ok" } else { "unreachable" },
        geoip: state.geo.is_enabled(),
        version: env!("CARGO_PKG_VERSION"),
    };
    let code = if store_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(report))
}
