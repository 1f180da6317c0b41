//! View configuration from ~/.consensus-view/config.json.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ViewError;

/// Overrides `apiBaseUrl` when set.
pub const API_URL_ENV: &str = "CONSENSUS_API_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Forecast window requested from the service, in hours
    #[serde(default = "default_forecast_window_hours")]
    pub forecast_window_hours: u32,
    /// Periodic refresh of the current selection; 0 disables it
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_forecast_window_hours() -> u32 {
    168
}

fn default_refresh_interval_secs() -> u64 {
    60
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            forecast_window_hours: default_forecast_window_hours(),
            refresh_interval_secs: default_refresh_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ViewConfig {
    pub fn base_url(&self) -> Result<Url, ViewError> {
        Url::parse(&self.api_base_url).map_err(|e| {
            ViewError::Configuration(format!("Invalid API URL {:?}: {}", self.api_base_url, e))
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_secs > 0).then(|| Duration::from_secs(self.refresh_interval_secs))
    }
}

pub fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".consensus-view")
        .join("config.json")
}

/// Load config from the default location, applying the environment override.
pub fn load_config() -> Result<ViewConfig, ViewError> {
    load_config_from(&config_path(), std::env::var(API_URL_ENV).ok())
}

/// A missing file yields defaults; a malformed one is an error.
pub fn load_config_from(
    path: &Path,
    api_url_override: Option<String>,
) -> Result<ViewConfig, ViewError> {
    let mut config = if path.exists() {
        let content = fs::read_to_string(path).map_err(|e| {
            ViewError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            ViewError::Configuration(format!("Failed to parse {}: {}", path.display(), e))
        })?
    } else {
        log::info!("No config at {}, using defaults", path.display());
        ViewConfig::default()
    };

    if let Some(url) = api_url_override.filter(|u| !u.trim().is_empty()) {
        config.api_base_url = url.trim().to_string();
    }

    // Reject a bad URL at startup rather than on first fetch
    config.base_url()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_config_from(&temp.path().join("config.json"), None).unwrap();
        assert_eq!(config, ViewConfig::default());
        assert_eq!(config.forecast_window_hours, 168);
        assert_eq!(config.refresh_interval(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(
            &path,
            r#"{ "apiBaseUrl": "https://forecasts.example.com", "refreshIntervalSecs": 0 }"#,
        )
        .unwrap();

        let config = load_config_from(&path, None).unwrap();
        assert_eq!(config.api_base_url, "https://forecasts.example.com");
        assert_eq!(config.refresh_interval(), None);
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    fn test_env_override_wins() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{ "apiBaseUrl": "https://file.example.com" }"#).unwrap();

        let config = load_config_from(&path, Some("http://10.0.0.5:8000".into())).unwrap();
        assert_eq!(config.api_base_url, "http://10.0.0.5:8000");

        // Blank override is ignored
        let config = load_config_from(&path, Some("  ".into())).unwrap();
        assert_eq!(config.api_base_url, "https://file.example.com");
    }

    #[test]
    fn test_malformed_file_is_configuration_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_config_from(&path, None).unwrap_err();
        assert!(matches!(err, ViewError::Configuration(_)));
    }

    #[test]
    fn test_invalid_url_is_configuration_error() {
        let temp = TempDir::new().unwrap();
        let err = load_config_from(
            &temp.path().join("config.json"),
            Some("not a url".into()),
        )
        .unwrap_err();
        assert!(matches!(err, ViewError::Configuration(_)));
    }
}
