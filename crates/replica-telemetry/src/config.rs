//! Telemetry configuration from environment variables.

use serde::{Deserialize, Serialize};
use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Service name attached to log lines
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full directive
    pub log_level: String,

    /// Whether to write logs to stdout
    pub console_output: bool,

    /// Whether to format logs as JSON
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "replica".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `RP_SERVICE_NAME`: Service name (default: replica)
    /// - `RP_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `RP_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `RP_JSON_LOGS`: Enable JSON logs (default: false, true in containers)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Used by `from_env` and tests.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let is_container =
            lookup("KUBERNETES_SERVICE_HOST").is_some() || lookup("DOCKER_CONTAINER").is_some();

        Self {
            service_name: lookup("RP_SERVICE_NAME").unwrap_or(defaults.service_name),

            log_level: lookup("RP_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            console_output: lookup("RP_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.console_output),

            json_logs: lookup("RP_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),
        }
    }
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
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.log_level, "info");
        assert!(config.console_output);
        assert!(!config.json_logs);
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let config = TelemetryConfig::from_lookup(|_| None);
        assert_eq!(config, TelemetryConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = TelemetryConfig::from_lookup(lookup_from(&[
            ("RP_SERVICE_NAME", "replica-3"),
            ("RP_LOG_LEVEL", "pbft_execution=debug"),
            ("RP_CONSOLE_OUTPUT", "0"),
            ("RP_JSON_LOGS", "TRUE"),
        ]));

        assert_eq!(config.service_name, "replica-3");
        assert_eq!(config.log_level, "pbft_execution=debug");
        assert!(!config.console_output);
        assert!(config.json_logs);
    }

    #[test]
    fn test_rust_log_fallback_and_container_json() {
        let config = TelemetryConfig::from_lookup(lookup_from(&[
            ("RUST_LOG", "warn"),
            ("DOCKER_CONTAINER", "1"),
        ]));

        assert_eq!(config.log_level, "warn");
        assert!(config.json_logs);
    }

    #[test]
    fn test_partial_deserialize() {
        let config: TelemetryConfig = serde_json::from_str(r#"{"json_logs":true}"#).unwrap();
        assert!(config.json_logs);
        assert_eq!(config.service_name, "replica");
    }
}
