//! Group configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Default number of messages an outbound handle can hold.
///
/// One slot keeps a stalled receiver from absorbing more than a single
/// message before the publisher starts spending its timeout budget.
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 1;

/// Group configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupConfig {
    /// Number of messages buffered per outbound handle.
    pub outbound_capacity: usize,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
        }
    }
}

impl GroupConfig {
    /// Set the outbound capacity.
    #[must_use]
    pub fn outbound_capacity(mut self, capacity: usize) -> Self {
        self.outbound_capacity = capacity;
        self
    }

    /// Check the configuration for values the group cannot honor.
    ///
    /// # Errors
    ///
    /// Returns an error if the outbound capacity is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.outbound_capacity == 0 {
            return Err(ConfigError::ZeroOutboundCapacity);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GroupConfig::default();
        assert_eq!(config.outbound_capacity, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = GroupConfig::default().outbound_capacity(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroOutboundCapacity));
    }

    #[test]
    fn test_config_from_toml() {
        let config: GroupConfig = toml::from_str("outbound_capacity = 16").unwrap();
        assert_eq!(config.outbound_capacity, 16);

        let config: GroupConfig = toml::from_str("").unwrap();
        assert_eq!(config, GroupConfig::default());
    }
}
