use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::constants;
use crate::error::{Result, TrackerError};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub sheet_id: String,
    pub sheet_name: String,
    /// Full export URL; takes precedence over `sheet_id`/`sheet_name`
    pub url: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            sheet_id: constants::DEFAULT_SHEET_ID.to_string(),
            sheet_name: constants::DEFAULT_SHEET_NAME.to_string(),
            url: None,
            timeout_seconds: constants::DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl SourceConfig {
    /// The URL the dashboard fetches its CSV from
    pub fn export_url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => constants::sheet_export_url(&self.sheet_id, &self.sheet_name),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: constants::DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl Config {
    /// Load `config.toml` from the working directory if present, then apply
    /// `TRACKER_*` environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::from_file_or_default(DEFAULT_CONFIG_PATH)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let config_content = fs::read_to_string(path).map_err(|e| {
            TrackerError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in production)
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("TRACKER_SHEET_ID") {
            self.source.sheet_id = v;
        }
        if let Some(v) = lookup("TRACKER_SHEET_NAME") {
            self.source.sheet_name = v;
        }
        if let Some(v) = lookup("TRACKER_SOURCE_URL") {
            self.source.url = Some(v);
        }
        if let Some(v) = lookup("TRACKER_TIMEOUT_SECONDS") {
            self.source.timeout_seconds = v.trim().parse().map_err(|_| {
                TrackerError::Config(format!("TRACKER_TIMEOUT_SECONDS is not a number: '{}'", v))
            })?;
        }
        if let Some(v) = lookup("TRACKER_BIND_ADDR") {
            self.server.bind_addr = v;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_file_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.source.sheet_id, constants::DEFAULT_SHEET_ID);
        assert_eq!(config.source.timeout_seconds, 30);
        assert_eq!(config.server.bind_addr, constants::DEFAULT_BIND_ADDR);
        assert!(config.source.export_url().contains("tqx=out:csv&sheet=Sheet1"));
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[source]\nsheet_name = \"Responses\"\ntimeout_seconds = 5").unwrap();

        let config = Config::from_file_or_default(file.path()).unwrap();
        assert_eq!(config.source.sheet_name, "Responses");
        assert_eq!(config.source.sheet_id, constants::DEFAULT_SHEET_ID);
        assert_eq!(config.source.timeout_seconds, 5);
        assert_eq!(config.server.bind_addr, constants::DEFAULT_BIND_ADDR);
    }

    #[test]
    fn malformed_file_is_a_toml_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[source\nsheet_name = ").unwrap();
        assert!(matches!(
            Config::from_file_or_default(file.path()),
            Err(TrackerError::Toml(_))
        ));
    }

    #[test]
    fn env_overrides_win_and_url_replaces_sheet() {
        let vars: HashMap<&str, &str> = [
            ("TRACKER_SOURCE_URL", "http://localhost:9000/export.csv"),
            ("TRACKER_TIMEOUT_SECONDS", "7"),
            ("TRACKER_BIND_ADDR", "0.0.0.0:8080"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_env_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.source.export_url(), "http://localhost:9000/export.csv");
        assert_eq!(config.source.timeout_seconds, 7);
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn bad_timeout_override_is_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_env_overrides(|k| (k == "TRACKER_TIMEOUT_SECONDS").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, TrackerError::Config(_)));
    }
}
