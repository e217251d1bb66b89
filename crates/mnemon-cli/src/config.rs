//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use mnemon_maintenance::MaintenanceConfig;
use mnemon_monitor::{AlertConfig, MonitorConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration, read from `~/.mnemon/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MnemonConfig {
    /// Store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Maintenance policy limits
    #[serde(default)]
    pub maintenance: MaintenanceConfig,

    /// Health monitor schedule
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Alert thresholds
    #[serde(default)]
    pub alerts: AlertConfig,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database file path. Defaults to `~/.mnemon/mnemon.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl MnemonConfig {
    /// Get the configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".mnemon").join("config.toml"))
    }

    /// Load configuration from the default location or fall back to defaults.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;

        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: MnemonConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(&path, contents)?;
        Ok(())
    }

    /// Check every section for contradictory settings.
    pub fn validate(&self) -> Result<()> {
        self.maintenance
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))?;
        self.monitor
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))?;
        self.alerts
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))?;
        Ok(())
    }

    /// Resolve the database path: command-line flag first, then the
    /// configured path, then the default under the home directory.
    pub fn resolve_db_path(&self, flag: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = flag {
            return Ok(path.to_path_buf());
        }
        if let Some(path) = &self.store.path {
            return Ok(path.clone());
        }
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".mnemon").join("mnemon.db"))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = MnemonConfig::default();

        assert!(config.store.path.is_none());
        assert_eq!(config.maintenance.max_items, 10_000);
        assert_eq!(config.monitor.check_interval_secs, 300);
        assert!(config.settings.color);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_takes_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[store]
path = "/tmp/test.db"

[maintenance]
max_age_days = 30

[settings]
color = false
"#
        )
        .unwrap();

        let config = MnemonConfig::load_from(file.path()).unwrap();

        assert_eq!(config.store.path.as_deref(), Some(Path::new("/tmp/test.db")));
        assert_eq!(config.maintenance.max_age_days, 30);
        assert_eq!(config.maintenance.max_items, 10_000, "unset fields keep defaults");
        assert_eq!(config.alerts.capacity_critical_percent, 90.0);
        assert!(!config.settings.color);
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let result = MnemonConfig::load_from(Path::new("/nonexistent/mnemon.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_toml_fails() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not valid toml [[[").unwrap();

        let result = MnemonConfig::load_from(file.path());
        assert!(matches!(result, Err(CliError::Toml(_))));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = MnemonConfig::default();
        config.maintenance.max_items = 500;
        config.alerts.disk_critical_mb = 250.0;

        let toml_text = toml::to_string_pretty(&config).unwrap();
        let back: MnemonConfig = toml::from_str(&toml_text).unwrap();

        assert_eq!(back.maintenance.max_items, 500);
        assert_eq!(back.alerts.disk_critical_mb, 250.0);
    }

    #[test]
    fn test_resolve_db_path_precedence() {
        let mut config = MnemonConfig::default();
        config.store.path = Some(PathBuf::from("/data/configured.db"));

        let flagged = config
            .resolve_db_path(Some(Path::new("/data/flag.db")))
            .unwrap();
        assert_eq!(flagged, PathBuf::from("/data/flag.db"));

        let configured = config.resolve_db_path(None).unwrap();
        assert_eq!(configured, PathBuf::from("/data/configured.db"));
    }

    #[test]
    fn test_validate_rejects_bad_thresholds() {
        let mut config = MnemonConfig::default();
        config.alerts.capacity_warning_percent = 95.0;

        assert!(config.validate().is_err());
    }
}
