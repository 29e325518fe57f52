//! CLI configuration

use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::output::OutputFormat;

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "GITONTO_CONFIG";

const KEYS: &[&str] = &["snapshot", "format"];

/// Path of the config file
pub fn config_file_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gitonto")
        .join("config.toml")
}

/// Configuration for the CLI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Snapshot used when `--snapshot` is not given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<String>,
    /// Output format used when `--format` is not given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Config {
    /// Load the config file, falling back to defaults
    pub fn load() -> Self {
        let path = config_file_path();
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => return Self::default(),
        };
        match toml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring invalid config file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_file_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    pub fn keys() -> &'static [&'static str] {
        KEYS
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "snapshot" => self.snapshot.clone(),
            "format" => self.format.clone(),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "snapshot" => self.snapshot = Some(value.to_string()),
            "format" => {
                let format = OutputFormat::parse(value)
                    .with_context(|| format!("Invalid format '{}': expected table, json or csv", value))?;
                self.format = Some(format.as_str().to_string());
            }
            _ => anyhow::bail!(
                "Unknown config key: {}. Available keys: {}",
                key,
                KEYS.join(", ")
            ),
        }
        Ok(())
    }

    pub fn unset(&mut self, key: &str) -> anyhow::Result<()> {
        match key {
            "snapshot" => self.snapshot = None,
            "format" => self.format = None,
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
        Ok(())
    }
}
