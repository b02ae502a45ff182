//! Simulation configuration.
//!
//! Configuration can be loaded from:
//! - Environment variables (RIPPLE_*)
//! - TOML configuration file (RIPPLE_CONFIG or the default search paths)

use anyhow::{ensure, Context, Result};
use ripple_core::GroupConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Total number of members joining the group.
    #[serde(default = "default_members")]
    pub members: usize,

    /// Members that never read their outbound handle.
    #[serde(default = "default_stalled_members")]
    pub stalled_members: usize,

    /// Members that publish (they also drain).
    #[serde(default = "default_publishers")]
    pub publishers: usize,

    /// Messages sent by each publisher.
    #[serde(default = "default_messages")]
    pub messages: usize,

    /// Per-member timeout budget in milliseconds (0 = unbounded).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Group configuration.
    #[serde(default)]
    pub group: GroupConfig,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Print Prometheus metrics after the run.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// Default value functions
fn default_members() -> usize {
    env_or("RIPPLE_MEMBERS", 16)
}

fn default_stalled_members() -> usize {
    env_or("RIPPLE_STALLED_MEMBERS", 1)
}

fn default_publishers() -> usize {
    env_or("RIPPLE_PUBLISHERS", 1)
}

fn default_messages() -> usize {
    env_or("RIPPLE_MESSAGES", 100)
}

fn default_timeout_ms() -> u64 {
    env_or("RIPPLE_TIMEOUT_MS", 100)
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            members: default_members(),
            stalled_members: default_stalled_members(),
            publishers: default_publishers(),
            messages: default_messages(),
            timeout_ms: default_timeout_ms(),
            group: GroupConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Config {
    /// Load configuration from file or defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var("RIPPLE_CONFIG") {
            return Self::from_file(shellexpand::tilde(&path).as_ref());
        }

        let config_paths = [
            "ripple.toml",
            "/etc/ripple/ripple.toml",
            "~/.config/ripple/ripple.toml",
        ];

        for path in &config_paths {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                return Self::from_file(expanded.as_ref());
            }
        }

        // Fall back to defaults with environment overrides
        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Check that the member roles add up.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first inconsistency found.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.publishers > 0, "At least one publisher is required");
        ensure!(
            self.publishers + self.stalled_members <= self.members,
            "{} publishers and {} stalled members do not fit in {} members",
            self.publishers,
            self.stalled_members,
            self.members
        );
        ensure!(
            self.timeout_ms > 0 || self.stalled_members == 0,
            "Stalled members would block an unbounded timeout forever"
        );
        self.group.validate().context("Invalid group configuration")?;
        Ok(())
    }

    /// Get the per-member timeout budget.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.metrics.enabled);
        assert_eq!(config.group.outbound_capacity, 1);
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            members = 8
            stalled_members = 2
            publishers = 3
            messages = 10
            timeout_ms = 250

            [group]
            outbound_capacity = 4

            [metrics]
            enabled = false
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.members, 8);
        assert_eq!(config.stalled_members, 2);
        assert_eq!(config.publishers, 3);
        assert_eq!(config.timeout(), Duration::from_millis(250));
        assert_eq!(config.group.outbound_capacity, 4);
        assert!(!config.metrics.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let config: Config = toml::from_str("members = 2\npublishers = 2\nstalled_members = 1")
            .unwrap();
        assert!(config.validate().is_err());

        let config: Config = toml::from_str("members = 2\npublishers = 0").unwrap();
        assert!(config.validate().is_err());

        let config: Config =
            toml::from_str("members = 2\nstalled_members = 0\n[group]\noutbound_capacity = 0")
                .unwrap();
        assert!(config.validate().is_err());

        let config: Config =
            toml::from_str("members = 3\nstalled_members = 1\ntimeout_ms = 0").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_config_file() {
        assert!(Config::from_file("/nonexistent/ripple.toml").is_err());
    }
}
