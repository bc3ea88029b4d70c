//! Configuration management for LCXL GW
//!
//! Loads the optional YAML configuration file. Every field has a default, so
//! a missing or partial file yields a working setup.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: Backend,
    pub client_name: String,
    pub ports: JackPortsConfig,
    pub midir: MidirConfig,
    pub monitor: MonitorConfig,
    /// Control loop tick in milliseconds
    pub report_interval_ms: u64,
}

/// MIDI backend
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// JACK client with a per-block process callback
    Jack,
    /// Native MIDI ports (ALSA, CoreMIDI, WinMM) via midir
    Midir,
}

/// JACK port names
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct JackPortsConfig {
    pub input: String,
    pub output: String,
    pub mmc_input: String,
    pub control_input: String,
    pub control_output: String,
    /// Register the MMC and MIDI-control ports as well
    pub register_auxiliary: bool,
}

/// Native port patterns (case-insensitive substring match)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MidirConfig {
    pub input_port: String,
    pub output_port: String,
}

/// Event monitor configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub enabled: bool,
    pub capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            client_name: "Launch Control XL proxy".to_string(),
            ports: JackPortsConfig::default(),
            midir: MidirConfig::default(),
            monitor: MonitorConfig::default(),
            report_interval_ms: 250,
        }
    }
}

impl Default for JackPortsConfig {
    fn default() -> Self {
        Self {
            input: "L C XL in".to_string(),
            output: "L C XL out".to_string(),
            mmc_input: "MMC in".to_string(),
            control_input: "Midi Control in".to_string(),
            control_output: "Midi Control out".to_string(),
            register_auxiliary: true,
        }
    }
}

impl Default for MidirConfig {
    fn default() -> Self {
        Self {
            input_port: "Launch Control XL".to_string(),
            output_port: "lcxl-gw".to_string(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            capacity: 1024,
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_yaml(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path.display()))
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(contents: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to an empty mapping
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: AppConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise
    pub async fn load_or_default(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path).await,
            None => Ok(Self::default()),
        }
    }

    /// Save configuration to file
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .await
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.client_name.trim().is_empty() {
            anyhow::bail!("client_name must not be empty");
        }
        if self.ports.input == self.ports.output {
            anyhow::bail!(
                "input and output ports must have different names (both '{}')",
                self.ports.input
            );
        }
        if self.report_interval_ms == 0 {
            anyhow::bail!("report_interval_ms must be greater than zero");
        }
        Ok(())
    }
}

// Default value functions
fn default_backend() -> Backend {
    if cfg!(feature = "jack") {
        Backend::Jack
    } else {
        Backend::Midir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_legacy_port_layout() {
        let config = AppConfig::default();
        assert_eq!(config.client_name, "Launch Control XL proxy");
        assert_eq!(config.ports.input, "L C XL in");
        assert_eq!(config.ports.output, "L C XL out");
        assert!(config.ports.register_auxiliary);
        assert!(!config.monitor.enabled);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AppConfig::from_yaml(
            r#"
backend: midir
midir:
  input_port: "LCXL"
monitor:
  enabled: true
"#,
        )
        .unwrap();

        assert_eq!(config.backend, Backend::Midir);
        assert_eq!(config.midir.input_port, "LCXL");
        assert_eq!(config.midir.output_port, "lcxl-gw");
        assert!(config.monitor.enabled);
        assert_eq!(config.monitor.capacity, 1024);
        assert_eq!(config.ports, JackPortsConfig::default());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(AppConfig::from_yaml("   \n").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_rejects_identical_ports() {
        let err = AppConfig::from_yaml(
            r#"
ports:
  input: "same"
  output: "same"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("different names"));
    }

    #[test]
    fn test_rejects_unknown_backend() {
        assert!(AppConfig::from_yaml("backend: alsa").is_err());
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("lcxl.yaml");

        let mut config = AppConfig::default();
        config.client_name = "studio proxy".to_string();
        config.report_interval_ms = 500;
        config.save(&path).await?;

        let loaded = AppConfig::load(&path).await?;
        assert_eq!(loaded, config);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_file_reports_path() {
        let err = AppConfig::load("/nonexistent/lcxl.yaml").await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/lcxl.yaml"));
    }

    #[tokio::test]
    async fn test_load_or_default_without_path() {
        let config = AppConfig::load_or_default(None).await.unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
