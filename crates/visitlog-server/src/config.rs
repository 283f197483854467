/// Re-export `Config` from `visitlog-core` for use within this crate.
///
/// Environment parsing lives in `visitlog-core` so integration tests can build
/// a `Config` without going through the server binary.
pub use visitlog_core::config::Config;
