// Queue Configuration

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const ENV_BACKEND: &str = "EVQ_BACKEND";
pub const ENV_HOST: &str = "EVQ_HOST";
pub const ENV_PORT: &str = "EVQ_PORT";
pub const ENV_PATH: &str = "EVQ_PATH";
pub const ENV_EVENTS: &str = "EVQ_EVENTS";

/// Storage backend a queue is configured for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// No persistence, entries live only in process memory
    #[default]
    #[serde(alias = "in-memory")]
    Memory,
    Sqlite,
}

impl BackendKind {
    pub fn is_persistent(&self) -> bool {
        !matches!(self, BackendKind::Memory)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Memory => write!(f, "memory"),
            BackendKind::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "in-memory" => Ok(BackendKind::Memory),
            "sqlite" => Ok(BackendKind::Sqlite),
            other => Err(AppError::Config(format!("Unknown backend kind: {}", other))),
        }
    }
}

/// Connection parameters for a persistent backend (all present once validated)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    pub path: String,
}

/// Queue configuration, immutable once handed to the builder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueConfig {
    pub backend: BackendKind,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub path: Option<String>,
    /// Event names this queue instance is scoped to (informational)
    pub events: Vec<String>,
}

impl QueueConfig {
    pub fn new(backend: BackendKind) -> Self {
        Self {
            backend,
            ..Default::default()
        }
    }

    pub fn in_memory() -> Self {
        Self::new(BackendKind::Memory)
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.events = events.into_iter().map(Into::into).collect();
        self
    }

    /// Check that a persistent backend has host, port and path (in that order)
    pub fn validate(&self) -> Result<()> {
        if !self.backend.is_persistent() {
            return Ok(());
        }

        if is_blank(&self.host) {
            return Err(AppError::MissingConfiguration { field: "host" });
        }
        if self.port.is_none() {
            return Err(AppError::MissingConfiguration { field: "port" });
        }
        if is_blank(&self.path) {
            return Err(AppError::MissingConfiguration { field: "path" });
        }

        Ok(())
    }

    /// Connection triple, `None` unless every part is present
    pub fn connection(&self) -> Option<ConnectionParams> {
        match (&self.host, self.port, &self.path) {
            (Some(host), Some(port), Some(path)) if !host.is_empty() && !path.is_empty() => {
                Some(ConnectionParams {
                    host: host.clone(),
                    port,
                    path: path.clone(),
                })
            }
            _ => None,
        }
    }

    /// Load configuration from `EVQ_*` environment variables
    ///
    /// # Environment Variables
    ///
    /// - `EVQ_BACKEND`: `memory` (default) or `sqlite`
    /// - `EVQ_HOST`, `EVQ_PORT`, `EVQ_PATH`: connection parameters
    /// - `EVQ_EVENTS`: comma separated event names
    pub fn from_env() -> Result<Self> {
        Self::default().merge_env()
    }

    /// Overlay whichever `EVQ_*` variables are set onto this configuration
    pub fn merge_env(self) -> Result<Self> {
        self.merge_lookup(|key: &str| std::env::var(key).ok())
    }

    fn merge_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(raw) = lookup(ENV_BACKEND) {
            self.backend = raw.parse()?;
        }

        if let Some(raw) = lookup(ENV_PORT) {
            let port = raw
                .trim()
                .parse::<u16>()
                .map_err(|e| AppError::Config(format!("Invalid {}: {} ({})", ENV_PORT, raw, e)))?;
            self.port = Some(port);
        }

        if let Some(raw) = lookup(ENV_EVENTS) {
            self.events = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }

        if let Some(host) = lookup(ENV_HOST) {
            self.host = Some(host);
        }
        if let Some(path) = lookup(ENV_PATH) {
            self.path = Some(path);
        }

        Ok(self)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |s| s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_in_memory_needs_no_connection() {
        assert!(QueueConfig::in_memory().validate().is_ok());
    }

    #[test]
    fn test_missing_host_is_reported_first() {
        let config = QueueConfig::new(BackendKind::Sqlite).with_port(5432);

        match config.validate() {
            Err(AppError::MissingConfiguration { field }) => assert_eq!(field, "host"),
            other => panic!("Expected MissingConfiguration, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_port_then_path() {
        let config = QueueConfig::new(BackendKind::Sqlite).with_host("localhost");
        assert!(matches!(
            config.validate(),
            Err(AppError::MissingConfiguration { field: "port" })
        ));

        let config = config.with_port(1);
        assert!(matches!(
            config.validate(),
            Err(AppError::MissingConfiguration { field: "path" })
        ));

        let config = config.with_path("/tmp/q.db");
        assert!(config.validate().is_ok());
        assert_eq!(
            config.connection(),
            Some(ConnectionParams {
                host: "localhost".to_string(),
                port: 1,
                path: "/tmp/q.db".to_string(),
            })
        );
    }

    #[test]
    fn test_blank_host_counts_as_missing() {
        let config = QueueConfig::new(BackendKind::Sqlite)
            .with_host("  ")
            .with_port(1)
            .with_path("q.db");
        assert!(matches!(
            config.validate(),
            Err(AppError::MissingConfiguration { field: "host" })
        ));
    }

    #[test]
    fn test_backend_kind_parsing() {
        assert_eq!("memory".parse::<BackendKind>().unwrap(), BackendKind::Memory);
        assert_eq!("In-Memory".parse::<BackendKind>().unwrap(), BackendKind::Memory);
        assert_eq!("SQLITE".parse::<BackendKind>().unwrap(), BackendKind::Sqlite);
        assert!("redis".parse::<BackendKind>().is_err());
        assert_eq!(BackendKind::Sqlite.to_string(), "sqlite");
    }

    #[test]
    fn test_merge_reads_all_fields() {
        let config = QueueConfig::default()
            .merge_lookup(lookup_from(&[
                (ENV_BACKEND, "sqlite"),
                (ENV_HOST, "localhost"),
                (ENV_PORT, "9000"),
                (ENV_PATH, "/var/lib/evq.db"),
                (ENV_EVENTS, "orders, payments,,"),
            ]))
            .unwrap();

        assert_eq!(config.backend, BackendKind::Sqlite);
        assert_eq!(config.host.as_deref(), Some("localhost"));
        assert_eq!(config.port, Some(9000));
        assert_eq!(config.path.as_deref(), Some("/var/lib/evq.db"));
        assert_eq!(config.events, vec!["orders", "payments"]);
    }

    #[test]
    fn test_merge_with_nothing_set_defaults_to_memory() {
        let config = QueueConfig::default().merge_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, QueueConfig::in_memory());
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let base = QueueConfig::new(BackendKind::Sqlite)
            .with_host("localhost")
            .with_port(0)
            .with_path("/tmp/base.db");

        let config = base
            .merge_lookup(lookup_from(&[(ENV_PATH, "/tmp/override.db")]))
            .unwrap();

        assert_eq!(config.backend, BackendKind::Sqlite);
        assert_eq!(config.host.as_deref(), Some("localhost"));
        assert_eq!(config.port, Some(0));
        assert_eq!(config.path.as_deref(), Some("/tmp/override.db"));
    }

    #[test]
    fn test_merge_rejects_bad_port_and_backend() {
        let result = QueueConfig::default().merge_lookup(lookup_from(&[(ENV_PORT, "not-a-port")]));
        assert!(matches!(result, Err(AppError::Config(_))));

        let result = QueueConfig::default().merge_lookup(lookup_from(&[(ENV_BACKEND, "redis")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
