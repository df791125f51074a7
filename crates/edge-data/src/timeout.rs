//! Timeout configuration for fetch operations.

use std::time::Duration;

use edge_core::NetworkConfig;

/// Timeout configuration for a fetch operation.
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Total operation timeout. A fetch still pending after this counts as offline.
    pub total: Duration,
}

impl TimeoutConfig {
    /// Create from a single total timeout.
    pub fn from_total(total: Duration) -> Self {
        Self { total }
    }

    /// Create from the worker's network settings.
    pub fn from_config(config: &NetworkConfig) -> Self {
        Self::from_total(Duration::from_millis(config.timeout_ms))
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self::from_config(&NetworkConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let config = NetworkConfig { timeout_ms: 2_500 };
        assert_eq!(
            TimeoutConfig::from_config(&config).total,
            Duration::from_millis(2_500)
        );
    }

    #[test]
    fn test_default_matches_network_default() {
        assert_eq!(TimeoutConfig::default().total, Duration::from_secs(10));
    }
}
