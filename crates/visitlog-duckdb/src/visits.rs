use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};

use visitlog_core::{
    error::StoreError,
    store::VisitStore,
    visit::{Location, NewVisit, Visit},
};

use crate::backend::query_err;
use crate::DuckDbBackend;

/// Row shape as it comes out of DuckDB, before the location JSON and the
/// epoch timestamp are decoded.
struct VisitRow {
    id: String,
    ip: String,
    location: String,
    browser: String,
    os: String,
    device: String,
    timestamp_us: i64,
}

impl VisitRow {
    fn decode(self) -> Result<Visit, StoreError> {
        let location: Location = serde_json::from_str(&self.location)
            .map_err(|e| StoreError::Decode(format!("visit {}: location: {e}", self.id)))?;
        let timestamp = DateTime::from_timestamp_micros(self.timestamp_us).ok_or_else(|| {
            StoreError::Decode(format!(
                "visit {}: timestamp out of range: {}",
                self.id, self.timestamp_us
            ))
        })?;
        Ok(Visit {
            id: self.id,
            ip: self.ip,
            location,
            browser: self.browser,
            os: self.os,
            device: self.device,
            timestamp,
        })
    }
}

impl DuckDbBackend {
    /// Insert one visit. Always a fresh row keyed by a new UUID.
    pub async fn insert_visit(&self, visit: NewVisit) -> Result<Visit, StoreError> {
        // TIMESTAMP holds microseconds; truncate so the returned record equals the stored one.
        let timestamp = visit.timestamp.unwrap_or_else(Utc::now).trunc_subsecs(6);
        let location = serde_json::to_string(&visit.location)
            .map_err(|e| StoreError::Query(format!("location not serialisable: {e}")))?;
        let id = uuid::Uuid::new_v4().to_string();

        let conn = self.conn.lock().await;
        conn.execute(
            r#"INSERT INTO visits (id, ip, location, browser, os, device, timestamp)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, CAST(?7 AS TIMESTAMP))"#,
            duckdb::params![
                id,
                visit.ip,
                location,
                visit.browser,
                visit.os,
                visit.device,
                timestamp.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
            ],
        )
        .map_err(query_err)?;
        drop(conn);

        tracing::debug!(visit_id = %id, "Visit inserted into DuckDB");
        Ok(Visit {
            id,
            ip: visit.ip,
            location: visit.location,
            browser: visit.browser,
            os: visit.os,
            device: visit.device,
            timestamp,
        })
    }

    /// All visits ordered by `timestamp` descending.
    pub async fn list_visits(&self) -> Result<Vec<Visit>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(
                "SELECT id, ip, location, browser, os, device, epoch_us(timestamp) \
                 FROM visits ORDER BY timestamp DESC",
            )
            .map_err(query_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(VisitRow {
                    id: row.get(0)?,
                    ip: row.get(1)?,
                    location: row.get(2)?,
                    browser: row.get(3)?,
                    os: row.get(4)?,
                    device: row.get(5)?,
                    timestamp_us: row.get(6)?,
                })
            })
            .map_err(query_err)?;

        let mut visits = Vec::new();
        for row in rows {
            visits.push(row.map_err(query_err)?.decode()?);
        }
        Ok(visits)
    }
}

#[async_trait]
impl VisitStore for DuckDbBackend {
    async fn save(&self, visit: NewVisit) -> Result<Visit, StoreError> {
        self.insert_visit(visit).await
    }

    async fn list_all(&self) -> Result<Vec<Visit>, StoreError> {
        self.list_visits().await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        DuckDbBackend::ping(self).await
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.checkpoint().await
    }
}
