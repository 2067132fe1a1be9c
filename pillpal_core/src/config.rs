//! Configuration file support for PillPal.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/pillpal/config.toml`.
//! `PILLPAL_API_URL` and `PILLPAL_API_TOKEN` override the file.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const API_URL_ENV: &str = "PILLPAL_API_URL";
pub const API_TOKEN_ENV: &str = "PILLPAL_API_TOKEN";

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub adherence: AdherenceConfig,
}

/// Persistence API connection settings
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    /// Base URL, e.g. `http://localhost:8000/api`
    #[serde(default)]
    pub base_url: Option<String>,

    /// Sent as `Authorization: Token <token>` when present
    #[serde(default)]
    pub token: Option<String>,
}

/// How the per-medicine "taken" flag is derived
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TakenPolicy {
    /// A `taken` intake record exists for the medicine today
    #[default]
    IntakeHistory,
    /// Always false, regardless of intake records
    Placeholder,
}

/// Adherence derivation settings
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct AdherenceConfig {
    #[serde(default)]
    pub taken_policy: TakenPolicy,
}

impl ApiConfig {
    /// The configured base URL, or `NotConfigured`
    pub fn require_base_url(&self) -> Result<&str> {
        match self.base_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(Error::NotConfigured(format!(
                "API base URL missing; set api.base_url or {}",
                API_URL_ENV
            ))),
        }
    }
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Override API settings from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Override API settings from an arbitrary variable lookup
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.is_empty()) {
            tracing::debug!("API base URL overridden by {}", API_URL_ENV);
            self.api.base_url = Some(url);
        }
        if let Some(token) = lookup(API_TOKEN_ENV).filter(|v| !v.is_empty()) {
            self.api.token = Some(token);
        }
        self
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|_| PathBuf::from("."))
        });
        base.join("pillpal").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
