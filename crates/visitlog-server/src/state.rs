use std::sync::Arc;

use visitlog_core::{config::Config, store::VisitStore};

use crate::geo::GeoLocator;

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
///
/// Nothing in here is mutated after startup. The store is the only resource
/// shared between requests and it does its own locking.
pub struct AppState {
    /// The visit store, opened once in `main` and closed on shutdown.
    pub store: Arc<dyn VisitStore>,

    /// MaxMind reader, loaded once at startup. Disabled when no database is present.
    pub geo: Arc<GeoLocator>,

    /// Parsed configuration, loaded once at startup from environment variables.
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new<S: VisitStore>(store: S, geo: GeoLocator, config: Config) -> Self {
        Self {
            store: Arc::new(store),
            geo: Arc::new(geo),
            config: Arc::new(config),
        }
    }
}
