//! Configuration for the stubboard data plane.
//!
//! Every knob has a serde default so a partial (or absent) YAML file yields a
//! runnable configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub limits: LimitsConfig,
    pub caches: CacheConfig,
    pub rate_limits: RateLimitConfig,
    pub events: EventConfig,
    pub cleanup: CleanupConfig,
    pub execution: ExecutionConfig,
}

/// Entity bounds and input-size ceilings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// A board holds at most this many mock rules.
    pub max_mock_rules: usize,
    /// A board holds at most this many live capture records; beyond that the
    /// oldest record is recycled in place.
    pub max_webhooks: usize,
    /// Wildcard segments allowed per path pattern.
    pub max_wildcards: usize,
    pub max_path_length: usize,
    pub max_body_length: usize,
    pub max_headers: usize,
    pub max_header_key_length: usize,
    pub max_header_value_length: usize,
    pub max_delay_ms: u64,
    pub board_id_length: usize,
    pub owner_token_length: usize,
    /// `None` disables the active-board admission check.
    pub max_active_boards: Option<u64>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_mock_rules: 12,
            max_webhooks: 50,
            max_wildcards: 3,
            max_path_length: 512,
            max_body_length: 10_000,
            max_headers: 20,
            max_header_key_length: 100,
            max_header_value_length: 500,
            max_delay_ms: 10_000,
            board_id_length: 16,
            owner_token_length: 32,
            max_active_boards: None,
        }
    }
}

/// Sizing for the bounded, access-expiring entity caches. One set of bounds
/// covers the board, rule-list, webhook-list and router caches; they key on
/// board id and share a working-set profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_entries: u64,
    pub idle_expiry_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            idle_expiry_secs: 3_600,
        }
    }
}

impl CacheConfig {
    pub fn idle_expiry(&self) -> Duration {
        Duration::from_secs(self.idle_expiry_secs)
    }
}

/// Fixed-window limits per request category. The window length doubles as
/// the write-expiry of the backing counter cache.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub board_creation: RateWindow,
    pub mock_execution: RateWindow,
    pub general: RateWindow,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            board_creation: RateWindow {
                limit: 10,
                window_secs: 3_600,
            },
            mock_execution: RateWindow {
                limit: 120,
                window_secs: 60,
            },
            general: RateWindow {
                limit: 300,
                window_secs: 60,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateWindow {
    pub limit: u32,
    pub window_secs: u64,
}

impl RateWindow {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// Per-entity-kind drain cadence and batch sizing for the write-behind
/// persistence pipeline.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EventConfig {
    pub boards: DrainSchedule,
    pub mock_rules: DrainSchedule,
    pub webhooks: DrainSchedule,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            boards: DrainSchedule {
                interval_secs: 10,
                batch_size: 50,
            },
            mock_rules: DrainSchedule {
                interval_secs: 10,
                batch_size: 100,
            },
            webhooks: DrainSchedule {
                interval_secs: 5,
                batch_size: 200,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DrainSchedule {
    pub interval_secs: u64,
    pub batch_size: usize,
}

impl DrainSchedule {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Cadence of the hard-delete sweeps over soft-deleted rows.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CleanupConfig {
    pub boards_interval_secs: u64,
    pub mock_rules_interval_secs: u64,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            boards_interval_secs: 3_600,
            mock_rules_interval_secs: 600,
        }
    }
}

/// Behavior of the mock execution path itself.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Served with status 200 when no rule matches.
    pub default_response_body: String,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            default_response_body: r#"{"message": "no matching stub"}"#.to_string(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.limits.max_mock_rules == 0 {
            anyhow::bail!("limits.max_mock_rules must be at least 1");
        }
        if self.limits.max_webhooks == 0 {
            anyhow::bail!("limits.max_webhooks must be at least 1");
        }
        if self.limits.max_wildcards == 0 {
            anyhow::bail!("limits.max_wildcards must be at least 1");
        }
        if self.limits.max_path_length == 0 {
            anyhow::bail!("limits.max_path_length must be at least 1");
        }
        if self.caches.max_entries == 0 {
            anyhow::bail!("caches.max_entries must be at least 1");
        }
        for (name, schedule) in [
            ("boards", &self.events.boards),
            ("mock_rules", &self.events.mock_rules),
            ("webhooks", &self.events.webhooks),
        ] {
            if schedule.batch_size == 0 {
                anyhow::bail!("events.{name}.batch_size must be at least 1");
            }
            if schedule.interval_secs == 0 {
                anyhow::bail!("events.{name}.interval_secs must be at least 1");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "limits:\n  max_webhooks: 5\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.limits.max_webhooks, 5);
        assert_eq!(config.limits.max_mock_rules, 12);
        assert!(config.rate_limits.enabled);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let yaml = "events:\n  webhooks:\n    interval_secs: 5\n    batch_size: 0\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }
}
