use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use visitlog_core::{user_agent, visit::NewVisit};

use crate::{
    error::AppError,
    routes::client::{extract_client_ip, raw_user_agent, MaybeConnectInfo},
    state::AppState,
};

/// `GET /track`: record one visit for the calling client.
///
/// ## Enrichment
/// - `ip`: first `X-Forwarded-For` entry, else the TCP peer address.
/// - `location`: MaxMind lookup; `{}` when the address cannot be located.
/// - `browser`, `os`, `device`: parsed from `User-Agent`.
///
/// Geo and user-agent lookups cannot fail the request; only a store failure
/// produces a 500.
///
/// ## Response
/// `200 OK` with `{ "message": "Tracking data saved successfully." }`.
#[tracing::instrument(skip_all)]
pub async fn track(
    State(state): State<Arc<AppState>>,
    MaybeConnectInfo(peer): MaybeConnectInfo,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let ip = extract_client_ip(&headers, peer);
    let raw_ua = raw_user_agent(&headers);

    let location = state.geo.lookup(&ip);
    let ua = user_agent::classify(&raw_ua);

    if state.config.debug_requests {
        tracing::debug!(
            %ip,
            user_agent = %raw_ua,
            location = ?location,
            device = %ua.device,
            "Tracking request"
        );
    }

    let visit = state
        .store
        .save(NewVisit {
            ip,
            location: location.unwrap_or_default(),
            browser: ua.browser,
            os: ua.os,
            device: ua.device,
            timestamp: None,
        })
        .await?;

    tracing::info!(visit_id = %visit.id, device = %visit.device, "Visit recorded");

    Ok(Json(json!({ "message": "Tracking data saved successfully." })))
}
