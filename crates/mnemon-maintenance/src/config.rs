//! Configuration for maintenance operations
//!
//! Defines the retention limits (maximum age, maximum item count) and the
//! scheduler cadence.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::MaintenanceError;

/// Configuration for the maintenance engine and scheduler
///
/// Controls how old items may get, how many are kept, and how often the
/// full cycle runs.
///
/// # Examples
///
/// ```
/// use mnemon_maintenance::MaintenanceConfig;
///
/// // Default configuration (balanced)
/// let config = MaintenanceConfig::default();
/// assert_eq!(config.max_age_days, 90);
///
/// // Aggressive cleanup
/// let config = MaintenanceConfig::aggressive();
/// assert_eq!(config.max_age_days, 30);
///
/// // Lenient cleanup
/// let config = MaintenanceConfig::lenient();
/// assert_eq!(config.max_age_days, 180);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceConfig {
    /// Items older than this many days are pruned
    /// Default: 90 days
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u64,

    /// Ceiling on item count; the oldest items past it are evicted
    /// Default: 10,000 items
    #[serde(default = "default_max_items")]
    pub max_items: usize,

    /// How often the scheduler runs a full cycle (in hours)
    /// Default: every 24 hours
    #[serde(default = "default_interval_hours")]
    pub interval_hours: u64,
}

fn default_max_age_days() -> u64 {
    90
}

fn default_max_items() -> usize {
    10_000
}

fn default_interval_hours() -> u64 {
    24
}

impl Default for MaintenanceConfig {
    /// Create default configuration with balanced retention
    ///
    /// - Maximum age: 90 days
    /// - Maximum items: 10,000
    /// - Cycle interval: 24 hours
    fn default() -> Self {
        Self {
            max_age_days: default_max_age_days(),
            max_items: default_max_items(),
            interval_hours: default_interval_hours(),
        }
    }
}

impl MaintenanceConfig {
    /// Aggressive retention (short age, small capacity, frequent cycles)
    ///
    /// Suitable for resource-constrained deployments.
    ///
    /// - Maximum age: 30 days
    /// - Maximum items: 5,000
    /// - Cycle interval: 6 hours
    pub fn aggressive() -> Self {
        Self {
            max_age_days: 30,
            max_items: 5_000,
            interval_hours: 6,
        }
    }

    /// Lenient retention (long age, large capacity, infrequent cycles)
    ///
    /// Suitable for development or long-memory deployments.
    ///
    /// - Maximum age: 180 days
    /// - Maximum items: 50,000
    /// - Cycle interval: 48 hours
    pub fn lenient() -> Self {
        Self {
            max_age_days: 180,
            max_items: 50_000,
            interval_hours: 48,
        }
    }

    /// Get the maximum item age as a chrono Duration
    pub fn max_age(&self) -> chrono::Duration {
        chrono::Duration::days(self.max_age_days as i64)
    }

    /// Get the maximum item age in hours
    pub fn max_age_hours(&self) -> f64 {
        self.max_age_days as f64 * 24.0
    }

    /// Get the cycle interval as Duration
    pub fn cycle_interval(&self) -> Duration {
        Duration::from_secs(self.interval_hours * 3600)
    }

    /// Reject zero retention limits and a zero interval
    pub fn validate(&self) -> Result<(), MaintenanceError> {
        if self.max_age_days == 0 {
            return Err(MaintenanceError::Config(
                "max_age_days must be at least 1".to_string(),
            ));
        }
        if self.max_items == 0 {
            return Err(MaintenanceError::Config(
                "max_items must be at least 1".to_string(),
            ));
        }
        if self.interval_hours == 0 {
            return Err(MaintenanceError::Config(
                "interval_hours must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MaintenanceConfig::default();
        assert_eq!(config.max_age_days, 90);
        assert_eq!(config.max_items, 10_000);
        assert_eq!(config.interval_hours, 24);
    }

    #[test]
    fn test_aggressive_config() {
        let config = MaintenanceConfig::aggressive();
        assert_eq!(config.max_age_days, 30);
        assert_eq!(config.max_items, 5_000);
        assert_eq!(config.interval_hours, 6);
        assert!(config.max_age_days < MaintenanceConfig::default().max_age_days);
    }

    #[test]
    fn test_lenient_config() {
        let config = MaintenanceConfig::lenient();
        assert_eq!(config.max_age_days, 180);
        assert_eq!(config.max_items, 50_000);
        assert_eq!(config.interval_hours, 48);
        assert!(config.max_age_days > MaintenanceConfig::default().max_age_days);
    }

    #[test]
    fn test_duration_conversions() {
        let config = MaintenanceConfig::default();

        assert_eq!(config.max_age(), chrono::Duration::days(90));
        assert_eq!(config.max_age_hours(), 90.0 * 24.0);
        assert_eq!(config.cycle_interval(), Duration::from_secs(24 * 3600));
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = MaintenanceConfig::aggressive();
        let serialized = serde_json::to_string(&config).unwrap();
        let deserialized: MaintenanceConfig = serde_json::from_str(&serialized).unwrap();

        assert_eq!(config.max_age_days, deserialized.max_age_days);
        assert_eq!(config.max_items, deserialized.max_items);
        assert_eq!(config.interval_hours, deserialized.interval_hours);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: MaintenanceConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.max_age_days, 90);
        assert_eq!(config.max_items, 10_000);
        assert_eq!(config.interval_hours, 24);
    }

    #[test]
    fn test_validate_rejects_zeros() {
        let mut config = MaintenanceConfig::default();
        assert!(config.validate().is_ok());

        config.max_age_days = 0;
        assert!(config.validate().is_err());

        config = MaintenanceConfig {
            max_items: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config = MaintenanceConfig {
            interval_hours: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
