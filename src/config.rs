//! Configuration handling for forms

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Form behaviour settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct FormConfig {
    /// Validate a field on every input event (default: true)
    pub validate_on_input: Option<bool>,
    /// Validate a field when it loses focus (default: true)
    pub validate_on_blur: Option<bool>,
    /// Validate a field on change events (default: true)
    pub validate_on_change: Option<bool>,
    /// Debounce input validation by this many milliseconds
    pub input_debounce_ms: Option<u64>,
}

impl FormConfig {
    pub fn validate_on_input(&self) -> bool {
        self.validate_on_input.unwrap_or(true)
    }

    pub fn validate_on_blur(&self) -> bool {
        self.validate_on_blur.unwrap_or(true)
    }

    pub fn validate_on_change(&self) -> bool {
        self.validate_on_change.unwrap_or(true)
    }

    pub fn input_debounce(&self) -> Option<Duration> {
        self.input_debounce_ms.map(Duration::from_millis)
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("io", "form-state", "form-state")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from file
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from `path`, defaulting when it does not exist
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: FormConfig = serde_json::from_str(&content)?;
        tracing::debug!("Loaded form config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_string_pretty(self)?;
            fs::write(&path, content)?;
        }
        Ok(())
    }
}
