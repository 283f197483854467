use std::sync::Arc;

use duckdb::Connection;
use tokio::sync::Mutex;
use tracing::info;

use visitlog_core::error::StoreError;

use crate::schema::init_sql;

pub(crate) fn query_err(e: duckdb::Error) -> StoreError {
    StoreError::Query(e.to_string())
}

/// A DuckDB backend for the visit log.
///
/// DuckDB is single-writer, so the connection sits behind
/// `Arc<tokio::sync::Mutex<_>>`: handlers share one backend and writes are
/// serialised through the lock.
pub struct DuckDbBackend {
    pub(crate) conn: Arc<Mutex<Connection>>,
    in_memory: bool,
}

impl DuckDbBackend {
    /// Open (or create) a DuckDB database file at `path`.
    ///
    /// `memory_limit` is a DuckDB size string such as `"256MB"` or `"1GB"`.
    /// `":memory:"` opens a throwaway in-memory database.
    pub fn open(path: &str, memory_limit: &str) -> Result<Self, StoreError> {
        let in_memory = path == ":memory:";
        let conn = if in_memory {
            Connection::open_in_memory()
        } else {
            Connection::open(path)
        }
        .map_err(|e| StoreError::Connection(format!("{path}: {e}")))?;
        conn.execute_batch(&init_sql(memory_limit))
            .map_err(query_err)?;
        info!(path, memory_limit, "DuckDB opened");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            in_memory,
        })
    }

    /// Open an **in-memory** DuckDB database.
    ///
    /// Intended for tests; data is discarded when the struct is dropped.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::open(":memory:", "256MB")
    }

    /// Execute `SELECT 1` as a lightweight liveness check.
    pub async fn ping(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute_batch("SELECT 1")
            .map_err(|e| StoreError::Connection(e.to_string()))
    }

    /// Write the WAL into the database file. No-op for in-memory databases.
    pub async fn checkpoint(&self) -> Result<(), StoreError> {
        if self.in_memory {
            return Ok(());
        }
        let conn = self.conn.lock().await;
        conn.execute_batch("CHECKPOINT").map_err(query_err)?;
        info!("DuckDB checkpointed");
        Ok(())
    }

    /// Acquire the DuckDB connection lock for direct queries.
    ///
    /// Intended for integration tests that need to verify stored data.
    /// Production code should use the typed methods.
    pub async fn conn_for_test(&self) -> tokio::sync::MutexGuard<'_, Connection> {
        self.conn.lock().await
    }
}
