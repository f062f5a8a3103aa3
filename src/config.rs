use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use sysdeck_core::DEFAULT_MAX_LOG_ENTRIES;

const APP_NAME: &str = "sysdeck";
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_LOG_FILTER: &str = "sysdeck=info,sysdeck_core=info,tower_http=debug";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Port for the HTTP API
    pub port: u16,
    /// Entries kept by the in-memory application log before the oldest are evicted
    pub log_max_size: usize,
    /// tracing filter used when RUST_LOG is not set
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            log_max_size: DEFAULT_MAX_LOG_ENTRIES,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the user's config directory, then apply
    /// environment overrides.
    /// Falls back to defaults if the file can't be located, read or parsed;
    /// the reason is returned so it can be reported once logging is set up.
    pub fn load() -> (Self, Option<anyhow::Error>) {
        let (config, error) = match get_config_path() {
            Ok(path) => Self::load_or_default(&path),
            Err(e) => (Self::default(), Some(e)),
        };
        (config.with_env_overrides(), error)
    }

    /// Load configuration from an explicit path without environment overrides.
    pub fn load_from(path: &Path) -> Self {
        let (config, error) = Self::load_or_default(path);
        if let Some(e) = error {
            tracing::warn!("Failed to load config, using defaults: {:#}", e);
        }
        config
    }

    /// Like [`load_from`](Self::load_from), but hands back the load error
    /// instead of logging it. A missing file is not an error.
    pub fn load_or_default(path: &Path) -> (Self, Option<anyhow::Error>) {
        match Self::try_load(path) {
            Ok(config) => (config.normalized(), None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    fn try_load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;

        let config = serde_json::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Apply SYSDECK_PORT, SYSDECK_LOG_MAX_SIZE and SYSDECK_LOG_FILTER.
    /// Values that don't parse are ignored.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(port) = lookup("SYSDECK_PORT").and_then(|s| s.trim().parse().ok()) {
            self.port = port;
        }
        if let Some(size) = lookup("SYSDECK_LOG_MAX_SIZE").and_then(|s| s.trim().parse().ok()) {
            self.log_max_size = size;
        }
        if let Some(filter) = lookup("SYSDECK_LOG_FILTER").filter(|s| !s.trim().is_empty()) {
            self.log_filter = filter;
        }
        self.normalized()
    }

    fn normalized(mut self) -> Self {
        if self.log_max_size == 0 {
            self.log_max_size = DEFAULT_MAX_LOG_ENTRIES;
        }
        self
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let config = AppConfig::default().with_overrides(lookup(&[
            ("SYSDECK_PORT", "8080"),
            ("SYSDECK_LOG_MAX_SIZE", "50"),
            ("SYSDECK_LOG_FILTER", "sysdeck=trace"),
        ]));

        assert_eq!(config.port, 8080);
        assert_eq!(config.log_max_size, 50);
        assert_eq!(config.log_filter, "sysdeck=trace");
    }

    #[test]
    fn unparsable_env_values_are_ignored() {
        let config = AppConfig::default().with_overrides(lookup(&[
            ("SYSDECK_PORT", "not-a-port"),
            ("SYSDECK_LOG_MAX_SIZE", "-3"),
        ]));

        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn zero_log_size_means_default() {
        let config =
            AppConfig::default().with_overrides(lookup(&[("SYSDECK_LOG_MAX_SIZE", "0")]));
        assert_eq!(config.log_max_size, DEFAULT_MAX_LOG_ENTRIES);
    }
}
