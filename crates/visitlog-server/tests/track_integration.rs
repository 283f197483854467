use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderValue, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use visitlog_core::config::Config;
use visitlog_core::error::StoreError;
use visitlog_core::store::VisitStore;
use visitlog_core::visit::{NewVisit, Visit};
use visitlog_duckdb::DuckDbBackend;
use visitlog_server::app::build_app;
use visitlog_server::geo::GeoLocator;
use visitlog_server::state::AppState;

const CHROME_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                              (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Build a test Config with sensible defaults for integration tests.
fn test_config() -> Config {
    Config {
        port: 0,
        db_path: ":memory:".to_string(),
        duckdb_memory_limit: "256MB".to_string(),
        admin_key: Some("test-admin-key".to_string()),
        geoip_path: "/nonexistent/GeoLite2-City.mmdb".to_string(),
        debug_requests: false,
    }
}

/// Create a fresh in-memory backend + state + app for each test.
fn setup() -> (Arc<AppState>, axum::Router) {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    let geo = GeoLocator::open(&test_config().geoip_path);
    let state = Arc::new(AppState::new(db, geo, test_config()));
    let app = build_app(Arc::clone(&state));
    (state, app)
}

/// A store whose every call fails, for the 500 paths.
struct FailingStore;

#[async_trait]
impl VisitStore for FailingStore {
    async fn save(&self, _visit: NewVisit) -> Result<Visit, StoreError> {
        Err(StoreError::Connection(
            "duckdb:///secret/path/visitlog.db: connection refused".to_string(),
        ))
    }

    async fn list_all(&self) -> Result<Vec<Visit>, StoreError> {
        Err(StoreError::Connection("connection refused".to_string()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::Connection("connection refused".to_string()))
    }

    async fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

fn track_request(forwarded_for: Option<&str>, user_agent: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri("/track");
    if let Some(ip) = forwarded_for {
        builder = builder.header("x-forwarded-for", ip);
    }
    if let Some(ua) = user_agent {
        builder = builder.header("user-agent", ua);
    }
    builder.body(Body::empty()).expect("build request")
}

/// Helper: extract JSON body from response.
async fn json_body(response: axum::http::Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse JSON")
}

// ============================================================
// BDD: A tracking request is stored and acknowledged
// ============================================================
#[tokio::test]
async fn test_track_returns_200_and_stores_visit() {
    let (state, app) = setup();

    let response = app
        .oneshot(track_request(Some("203.0.113.9"), Some(CHROME_WINDOWS)))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "message": "Tracking data saved successfully." })
    );

    let visits = state.store.list_all().await.expect("list");
    assert_eq!(visits.len(), 1);
    let visit = &visits[0];
    assert_eq!(visit.ip, "203.0.113.9");
    assert_eq!(visit.browser, "Chrome");
    assert!(visit.os.starts_with("Windows"), "os: {}", visit.os);
    assert_eq!(visit.device, "Desktop");
}

// ============================================================
// BDD: Geo miss still returns 200 and stores an empty location
// ============================================================
#[tokio::test]
async fn test_track_without_geo_stores_empty_location() {
    let (state, app) = setup();

    let response = app
        .oneshot(track_request(Some("10.1.2.3"), Some(CHROME_WINDOWS)))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let visits = state.store.list_all().await.expect("list");
    assert!(visits[0].location.is_empty());
    let as_json = serde_json::to_value(&visits[0]).expect("serialise");
    assert_eq!(as_json["location"], json!({}));
}

// ============================================================
// BDD: Only the first X-Forwarded-For entry is recorded
// ============================================================
#[tokio::test]
async fn test_track_uses_first_forwarded_entry() {
    let (state, app) = setup();

    app.oneshot(track_request(
        Some("198.51.100.4, 10.0.0.1, 10.0.0.2"),
        Some(CHROME_WINDOWS),
    ))
    .await
    .expect("request");

    let visits = state.store.list_all().await.expect("list");
    assert_eq!(visits[0].ip, "198.51.100.4");
}

// ============================================================
// BDD: Missing headers still produce a complete record
// ============================================================
#[tokio::test]
async fn test_track_without_headers_uses_placeholders() {
    let (state, app) = setup();

    let response = app
        .oneshot(track_request(None, None))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let visits = state.store.list_all().await.expect("list");
    let visit = &visits[0];
    assert_eq!(visit.ip, "unknown");
    assert_eq!(visit.browser, "Other");
    assert_eq!(visit.os, "Other");
    assert_eq!(visit.device, "Unknown Device");
}

// ============================================================
// BDD: Device classification flows through to the record
// ============================================================
#[tokio::test]
async fn test_track_records_mobile_device_model() {
    let (state, app) = setup();

    app.oneshot(track_request(
        Some("1.2.3.4"),
        Some("Dalvik/2.1.0 (U; Android 13; SM-S918B)"),
    ))
    .await
    .expect("request");

    let visits = state.store.list_all().await.expect("list");
    assert_eq!(visits[0].device, "SM-S918B");
}

// ============================================================
// BDD: A UTF-8 model name in the User-Agent is classified, not dropped
// ============================================================
#[tokio::test]
async fn test_track_records_utf8_device_model() {
    let (state, app) = setup();

    let request = Request::builder()
        .method("GET")
        .uri("/track")
        .header("x-forwarded-for", "1.2.3.4")
        .header(
            "user-agent",
            HeaderValue::from_bytes(
                "Dalvik/2.1.0 (U; Android 12; 小米 11 Build/SKQ1)".as_bytes(),
            )
            .expect("header value"),
        )
        .body(Body::empty())
        .expect("build request");

    let response = app.oneshot(request).await.expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let visits = state.store.list_all().await.expect("list");
    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0].device, "小米 11 Build/SKQ1");
}

// ============================================================
// BDD: Each call creates a new record, never an update
// ============================================================
#[tokio::test]
async fn test_repeated_track_creates_independent_records() {
    let (state, app) = setup();

    let first = app
        .clone()
        .oneshot(track_request(Some("1.1.1.1"), Some(CHROME_WINDOWS)))
        .await
        .expect("request");
    assert_eq!(first.status(), StatusCode::OK);
    let second = app
        .oneshot(track_request(Some("1.1.1.1"), Some("curl/8.4.0")))
        .await
        .expect("request");
    assert_eq!(second.status(), StatusCode::OK);

    let visits = state.store.list_all().await.expect("list");
    assert_eq!(visits.len(), 2);
    assert_ne!(visits[0].id, visits[1].id);
    let mut devices: Vec<&str> = visits.iter().map(|v| v.device.as_str()).collect();
    devices.sort_unstable();
    assert_eq!(devices, vec!["Desktop", "Unknown Device"]);
}

// ============================================================
// BDD: Store failure yields a generic 500
// ============================================================
#[tokio::test]
async fn test_track_store_failure_returns_generic_500() {
    let state = Arc::new(AppState::new(
        FailingStore,
        GeoLocator::disabled(),
        test_config(),
    ));
    let app = build_app(state);

    let response = app
        .oneshot(track_request(Some("1.2.3.4"), Some(CHROME_WINDOWS)))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = json_body(response).await;
    assert_eq!(body, json!({ "error": "Internal Server Error" }));
    assert!(!body.to_string().contains("secret"));
}
