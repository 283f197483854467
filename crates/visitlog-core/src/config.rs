use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid port {value:?}: {reason}")]
    InvalidPort { value: String, reason: String },
}

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    /// DuckDB database file, or `:memory:`.
    pub db_path: String,
    pub duckdb_memory_limit: String,
    /// Shared secret for `/logs`. `None` when unset or empty, which locks the route.
    pub admin_key: Option<String>,
    pub geoip_path: String,
    /// Log raw client IPs, user agents and request headers at debug level.
    pub debug_requests: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("db_path", &self.db_path)
            .field("duckdb_memory_limit", &self.duckdb_memory_limit)
            .field("admin_key", &self.admin_key.as_ref().map(|_| "<redacted>"))
            .field("geoip_path", &self.geoip_path)
            .field("debug_requests", &self.debug_requests)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. `from_env` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let port = match set("VISITLOG_PORT").or_else(|| set("PORT")) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidPort {
                    value: raw.clone(),
                    reason: e.to_string(),
                })?,
            None => 5000,
        };

        Ok(Self {
            port,
            db_path: lookup("VISITLOG_DB_PATH")
                .unwrap_or_else(|| "./data/visitlog.db".to_string()),
            duckdb_memory_limit: lookup("VISITLOG_DUCKDB_MEMORY")
                .unwrap_or_else(|| "256MB".to_string()),
            admin_key: lookup("VISITLOG_ADMIN_KEY")
                .or_else(|| lookup("ADMIN_KEY"))
                .filter(|k| !k.is_empty()),
            geoip_path: lookup("VISITLOG_GEOIP_PATH")
                .unwrap_or_else(|| "./GeoLite2-City.mmdb".to_string()),
            debug_requests: lookup("VISITLOG_DEBUG_REQUESTS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config_from(&[]).expect("config");
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.db_path, "./data/visitlog.db");
        assert_eq!(cfg.admin_key, None);
        assert!(!cfg.debug_requests);
    }

    #[test]
    fn prefixed_vars_take_precedence_over_plain() {
        let cfg = config_from(&[
            ("VISITLOG_PORT", "8080"),
            ("PORT", "9090"),
            ("VISITLOG_ADMIN_KEY", "primary"),
            ("ADMIN_KEY", "fallback"),
        ])
        .expect("config");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.admin_key.as_deref(), Some("primary"));
    }

    #[test]
    fn plain_vars_are_honoured() {
        let cfg = config_from(&[("PORT", "7000"), ("ADMIN_KEY", "k")]).expect("config");
        assert_eq!(cfg.port, 7000);
        assert_eq!(cfg.admin_key.as_deref(), Some("k"));
    }

    #[test]
    fn empty_admin_key_counts_as_unset() {
        let cfg = config_from(&[("VISITLOG_ADMIN_KEY", "")]).expect("config");
        assert_eq!(cfg.admin_key, None);
    }

    #[test]
    fn empty_port_counts_as_unset() {
        let cfg = config_from(&[("PORT", "")]).expect("config");
        assert_eq!(cfg.port, 5000);
        let cfg = config_from(&[("VISITLOG_PORT", "  ")]).expect("config");
        assert_eq!(cfg.port, 5000);
        let cfg = config_from(&[("VISITLOG_PORT", ""), ("PORT", "7000")]).expect("config");
        assert_eq!(cfg.port, 7000);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = config_from(&[("VISITLOG_PORT", "eighty")]).expect_err("must fail");
        assert!(matches!(err, ConfigError::InvalidPort { .. }));
    }

    #[test]
    fn debug_output_redacts_admin_key() {
        let cfg = config_from(&[("VISITLOG_ADMIN_KEY", "hunter2")]).expect("config");
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
