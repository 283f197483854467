use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{routes, state::AppState};

/// Construct the Axum [`Router`] with all routes and middleware attached.
///
/// Middleware is applied in outer-to-inner order (outermost runs first on
/// request, last on response):
///
/// 1. `TraceLayer`: structured request/response logging via `tracing`.
/// 2. `CorsLayer`: permissive CORS so the tracking snippet can call `/track`
///    from pages served on other origins.
pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::pages::index))
        .route("/admin", get(routes::pages::admin))
        .route("/health", get(routes::health::health))
        .route("/track", get(routes::track::track))
        .route("/logs", get(routes::logs::logs))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
