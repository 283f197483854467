/// DuckDB initialization SQL.
///
/// Executed once at database open time via `Connection::execute_batch`.
/// Statements use `IF NOT EXISTS` so they are safe to re-run on every startup.
///
/// `memory_limit` comes from `Config.duckdb_memory_limit`
/// (env `VISITLOG_DUCKDB_MEMORY`). Always set an explicit limit: the DuckDB
/// default of 80% of system RAM is not acceptable for a server process.
pub fn init_sql(memory_limit: &str) -> String {
    format!(
        r#"SET memory_limit = '{memory_limit}';
SET threads = 2;

-- ===========================================
-- VISITS (append-only; never updated or deleted)
-- ===========================================
CREATE TABLE IF NOT EXISTS visits (
    id              VARCHAR PRIMARY KEY,           -- uuid v4
    ip              VARCHAR NOT NULL,
    location        VARCHAR NOT NULL,              -- JSON object text, '{{}}' when unknown
    browser         VARCHAR NOT NULL,
    os              VARCHAR NOT NULL,
    device          VARCHAR NOT NULL,
    timestamp       TIMESTAMP NOT NULL             -- UTC, microsecond precision
);
CREATE INDEX IF NOT EXISTS idx_visits_timestamp ON visits(timestamp);
"#
    )
}
