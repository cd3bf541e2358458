//! Configuration for the execution pipeline.

use serde::{Deserialize, Serialize};
use shared_types::messages::{DEFAULT_PROTOCOL_ID, DEFAULT_RESULT_CHANNEL};
use std::env;
use std::time::Duration;

/// Default request timeout before a view change is requested.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Replica pipeline configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicaConfig {
    /// How long pending requests may make no progress before the liveness
    /// timer requests a view change
    pub request_timeout: Duration,
    /// Upper bound on a single executor invocation, when no deadline is
    /// supplied by the caller
    pub execution_deadline: Option<Duration>,
    /// Cluster channel the primary publishes results on
    pub result_channel: String,
    /// Protocol tag for point-to-point result delivery
    pub protocol_id: String,
}

impl Default for ReplicaConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            execution_deadline: None,
            result_channel: DEFAULT_RESULT_CHANNEL.to_string(),
            protocol_id: DEFAULT_PROTOCOL_ID.to_string(),
        }
    }
}

impl ReplicaConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `RP_REQUEST_TIMEOUT_MS`: Request timeout (default: 60000)
    /// - `RP_EXECUTION_DEADLINE_MS`: Executor deadline (default: none)
    /// - `RP_RESULT_CHANNEL`: Result channel (default: cluster-primary)
    /// - `RP_PROTOCOL_ID`: Result protocol (default: /b7s/work/1.0.0)
    ///
    /// Unparseable numbers fall back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let millis = |key: &str| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_millis)
        };

        Self {
            request_timeout: millis("RP_REQUEST_TIMEOUT_MS")
                .filter(|d| !d.is_zero())
                .unwrap_or(defaults.request_timeout),
            execution_deadline: millis("RP_EXECUTION_DEADLINE_MS").filter(|d| !d.is_zero()),
            result_channel: lookup("RP_RESULT_CHANNEL")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.result_channel),
            protocol_id: lookup("RP_PROTOCOL_ID")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.protocol_id),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_execution_deadline(mut self, deadline: Duration) -> Self {
        self.execution_deadline = Some(deadline);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReplicaConfig::default();
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.execution_deadline, None);
        assert_eq!(config.result_channel, "cluster-primary");
        assert_eq!(config.protocol_id, "/b7s/work/1.0.0");
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = ReplicaConfig::from_lookup(|key| match key {
            "RP_REQUEST_TIMEOUT_MS" => Some("1500".into()),
            "RP_EXECUTION_DEADLINE_MS" => Some("250".into()),
            "RP_RESULT_CHANNEL" => Some("results".into()),
            _ => None,
        });

        assert_eq!(config.request_timeout, Duration::from_millis(1500));
        assert_eq!(config.execution_deadline, Some(Duration::from_millis(250)));
        assert_eq!(config.result_channel, "results");
        assert_eq!(config.protocol_id, DEFAULT_PROTOCOL_ID);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = ReplicaConfig::from_lookup(|key| match key {
            "RP_REQUEST_TIMEOUT_MS" => Some("soon".into()),
            "RP_EXECUTION_DEADLINE_MS" => Some("0".into()),
            _ => None,
        });

        assert_eq!(config, ReplicaConfig::default());
    }
}
