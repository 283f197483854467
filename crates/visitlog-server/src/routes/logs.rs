use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, response::IntoResponse, Json};

use visitlog_core::admin::{is_authorized, ADMIN_KEY_HEADER};

use crate::{error::AppError, routes::client::header_str, state::AppState};

/// `GET /logs`: every recorded visit, newest first.
///
/// ## Auth
/// Header `x-admin-key` must equal the configured admin key exactly. A
/// missing header, a wrong key, or no configured key all yield 401.
#[tracing::instrument(skip_all)]
pub async fn logs(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    if state.config.debug_requests {
        tracing::debug!(headers = ?headers, "Log retrieval request");
    }

    let supplied = header_str(&headers, ADMIN_KEY_HEADER);
    if !is_authorized(supplied, state.config.admin_key.as_deref()) {
        if state.config.debug_requests {
            tracing::warn!(supplied_key = ?supplied, "Unauthorized log retrieval attempt");
        } else {
            tracing::warn!(key_present = supplied.is_some(), "Unauthorized log retrieval attempt");
        }
        return Err(AppError::Unauthorized);
    }

    let visits = state.store.list_all().await?;
    Ok(Json(visits))
}
