use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Env var naming a JSON config file.
pub const CONFIG_PATH_ENV: &str = "ACTOR_REGISTRY_CONFIG";
/// Env var overriding the runtime name.
pub const RUNTIME_NAME_ENV: &str = "ACTOR_REGISTRY_NAME";

// ============================================================================
// Runtime Configuration
// ============================================================================

/// Top-level configuration of the actor runtime and its registry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default)]
    pub executor: ExecutorMode,

    /// Initial capacity hint for the name map.
    #[serde(default)]
    pub registry_capacity: Option<usize>,

    /// Fallback tracing filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Free-form settings, logged at startup.
    #[serde(default)]
    pub settings: HashMap<String, String>,
}

/// Where hosted actors run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorMode {
    /// The arbiter of the thread that bootstraps the runtime
    #[default]
    Current,

    /// A dedicated arbiter thread owned by the runtime
    Dedicated,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_metrics_port(),
        }
    }
}

fn default_name() -> String {
    "default".to_string()
}

fn default_log_filter() -> String {
    "info,actor_registry=debug".to_string()
}

fn default_metrics_port() -> u16 {
    9090
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            executor: ExecutorMode::default(),
            registry_capacity: None,
            log_filter: default_log_filter(),
            metrics: MetricsConfig::default(),
            settings: HashMap::new(),
        }
    }
}

impl RuntimeConfig {
    /// Load from the file named by `ACTOR_REGISTRY_CONFIG`, or defaults when
    /// unset. `ACTOR_REGISTRY_NAME` overrides the runtime name.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        if let Ok(name) = std::env::var(RUNTIME_NAME_ENV) {
            config.name = name;
        }
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = RuntimeConfig::from_json_str("{}").unwrap();
        assert_eq!(config.name, "default");
        assert_eq!(config.executor, ExecutorMode::Current);
        assert_eq!(config.registry_capacity, None);
        assert_eq!(config.log_filter, "info,actor_registry=debug");
        assert!(!config.metrics.enabled);
        assert_eq!(config.metrics.port, 9090);
        assert!(config.settings.is_empty());
    }

    #[test]
    fn test_parse_full_document() {
        let json = r#"{
            "name": "orders",
            "executor": "dedicated",
            "registry_capacity": 128,
            "metrics": { "enabled": true },
            "settings": { "region": "eu-west-1" }
        }"#;
        let config = RuntimeConfig::from_json_str(json).unwrap();
        assert_eq!(config.name, "orders");
        assert_eq!(config.executor, ExecutorMode::Dedicated);
        assert_eq!(config.registry_capacity, Some(128));
        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.port, 9090);
        assert_eq!(config.settings.get("region").map(String::as_str), Some("eu-west-1"));
    }

    #[test]
    fn test_unknown_executor_is_rejected() {
        let err = RuntimeConfig::from_json_str(r#"{ "executor": "pooled" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = RuntimeConfig::from_file("/nonexistent/actor-registry.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
