use thiserror::Error;

/// Failures surfaced by a [`crate::store::VisitStore`] backend.
///
/// The message carries backend detail (driver errors, file paths). It is meant
/// for server-side logs only and must never be echoed to HTTP clients.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection failed: {0}")]
    Connection(String),

    #[error("store query failed: {0}")]
    Query(String),

    #[error("stored record could not be decoded: {0}")]
    Decode(String),
}
