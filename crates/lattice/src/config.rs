//! Configuration parsing
//!
//! Reads `~/.lattice/config.toml` (or `$LATTICE_HOME/config.toml`). Every
//! key is optional; a missing file means all defaults.

use lattice_governance::ApprovalOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Error type for config operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Config not found at: {0}")]
    NotFound(String),
}

/// Result type for config operations
pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LatticeConfig {
    #[serde(default)]
    pub bus: BusConfig,

    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub governance: GovernanceConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BusConfig {
    /// Events buffered per topic before slow subscribers start skipping
    #[serde(default = "default_bus_capacity")]
    pub capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            capacity: default_bus_capacity(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    /// Pending commands per registry before callers wait
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            command_buffer: default_command_buffer(),
        }
    }
}

/// Checklist texts of the approval question
#[derive(Debug, Clone, Deserialize)]
pub struct GovernanceConfig {
    #[serde(default = "default_approve_option")]
    pub approve_option: String,

    #[serde(default = "default_reject_option")]
    pub reject_option: String,
}

impl GovernanceConfig {
    pub fn approval_options(&self) -> ApprovalOptions {
        ApprovalOptions::new(self.approve_option.clone(), self.reject_option.clone())
    }
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            approve_option: default_approve_option(),
            reject_option: default_reject_option(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub verbose: bool,

    /// Defaults to `$LATTICE_HOME/logs`
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_bus_capacity() -> usize { lattice_events::DEFAULT_CAPACITY }
fn default_command_buffer() -> usize { lattice_registry::DEFAULT_COMMAND_BUFFER }
fn default_approve_option() -> String { ApprovalOptions::default().approve }
fn default_reject_option() -> String { ApprovalOptions::default().reject }

/// Load configuration from a file
pub fn load_config(config_path: &Path) -> Result<LatticeConfig> {
    if !config_path.exists() {
        return Ok(LatticeConfig::default());
    }

    let content = std::fs::read_to_string(config_path)?;
    Ok(toml::from_str(&content)?)
}

/// Load configuration from the default location
pub fn load_default_config() -> Result<LatticeConfig> {
    let home = lattice_logging::lattice_home()
        .map_err(|err| ConfigError::NotFound(err.to_string()))?;
    load_config(&home.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = LatticeConfig::default();
        assert_eq!(config.bus.capacity, 256);
        assert_eq!(config.registry.command_buffer, 64);
        assert_eq!(config.governance.approval_options(), ApprovalOptions::default());
        assert!(!config.logging.verbose);
        assert!(config.logging.dir.is_none());
    }

    #[test]
    fn test_load_empty_file() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        std::fs::write(&config_path, "").unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.bus.capacity, 256);
    }

    #[test]
    fn test_load_partial_config() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
            [bus]
            capacity = 32

            [governance]
            approve_option = "Yes, merge it"
            "#,
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.bus.capacity, 32);
        assert_eq!(config.registry.command_buffer, 64);
        let options = config.governance.approval_options();
        assert_eq!(options.approve, "Yes, merge it");
        assert_eq!(options.reject, ApprovalOptions::default().reject);
    }

    #[test]
    fn test_load_full_config() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
            [bus]
            capacity = 1024

            [registry]
            command_buffer = 8

            [governance]
            approve_option = "Go"
            reject_option = "Stop"

            [logging]
            verbose = true
            dir = "/var/log/lattice"
            "#,
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.bus.capacity, 1024);
        assert_eq!(config.registry.command_buffer, 8);
        assert_eq!(config.governance.approval_options().items(), ["Go", "Stop"]);
        assert!(config.logging.verbose);
        assert_eq!(config.logging.dir, Some(PathBuf::from("/var/log/lattice")));
    }

    #[test]
    fn test_unknown_section_is_rejected() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        std::fs::write(&config_path, "[buss]\ncapacity = 1\n").unwrap();

        assert!(matches!(
            load_config(&config_path),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_nonexistent_file() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("nonexistent.toml");

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.registry.command_buffer, 64);
    }
}
