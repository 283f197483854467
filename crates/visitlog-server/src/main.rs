use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use visitlog_core::config::Config;
use visitlog_duckdb::DuckDbBackend;
use visitlog_server::{geo::GeoLocator, state::AppState};

/// `visitlog health`: liveness probe for Docker HEALTHCHECK.
///
/// Calls `GET http://localhost:$VISITLOG_PORT/health`.
/// Exits 0 if the server responds with HTTP 200, exits 1 otherwise.
fn run_health_check() -> ! {
    let port = Config::from_env().map(|c| c.port).unwrap_or(5000);
    let url = format!("http://localhost:{}/health", port);
    match ureq::get(&url).call() {
        Ok(resp) if resp.status() == 200 => std::process::exit(0),
        _ => std::process::exit(1),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(|s| s.as_str()) == Some("health") {
        run_health_check();
    }

    // Structured JSON logging. Level controlled via RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("visitlog=info".parse()?),
        )
        .json()
        .init();

    let cfg = Config::from_env()?;

    if cfg.db_path != ":memory:" {
        if let Some(parent) = std::path::Path::new(&cfg.db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }
    let db = DuckDbBackend::open(&cfg.db_path, &cfg.duckdb_memory_limit)?;

    let geo = GeoLocator::open(&cfg.geoip_path);

    if cfg.admin_key.is_none() {
        tracing::warn!("VISITLOG_ADMIN_KEY not set; GET /logs will reject every request");
    }
    if cfg.debug_requests {
        info!("Request debug logging enabled; raw IPs and headers are logged at debug level");
    }

    let state = Arc::new(AppState::new(db, geo, cfg.clone()));

    let addr = format!("0.0.0.0:{}", cfg.port);
    let app = visitlog_server::app::build_app(Arc::clone(&state));

    info!(port = cfg.port, "visitlog listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        tokio::signal::ctrl_c().await.ok();
    })
    .await?;

    match tokio::time::timeout(std::time::Duration::from_secs(5), state.store.close()).await {
        Ok(Ok(())) => info!("Visit store closed"),
        Ok(Err(e)) => tracing::error!(error = %e, "Visit store close failed"),
        Err(_) => tracing::error!("Visit store close timed out"),
    }

    Ok(())
}
