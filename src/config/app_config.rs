use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::domain::geo::{Coordinate, DEFAULT_LOCATION};
use crate::error::TaskMapError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the marketplace REST API, without a trailing slash
    pub api_base_url: String,

    /// Nominatim-compatible geocoder used for address autocomplete
    pub geocoder_url: String,

    /// Restrict geocoder results to these ISO country codes
    pub geocoder_countries: Vec<String>,

    /// SQLite file holding device-local preferences
    pub database_path: String,

    pub geolocation_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub search_debounce_ms: u64,

    /// Used whenever the device position is unknown. Kept last so TOML writes it as a table.
    pub default_location: Coordinate,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".to_string(),
            geocoder_url: "https://nominatim.openstreetmap.org".to_string(),
            geocoder_countries: vec!["lv".to_string()],
            database_path: "taskmap.db".to_string(),
            geolocation_timeout_ms: 10_000,
            request_timeout_ms: 15_000,
            search_debounce_ms: 400,
            default_location: DEFAULT_LOCATION,
        }
    }
}

impl AppConfig {
    /// Load configuration from file, creating it with defaults on first run,
    /// then apply environment overrides.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            let default_config = Self::default();
            default_config.save_to(&config_path)?;
            default_config
        };

        Ok(config.with_env_overrides())
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("taskmap").join("config.toml"))
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("TASKMAP_API_URL") {
            self.api_base_url = url;
        }
        if let Ok(path) = std::env::var("TASKMAP_DATABASE_PATH") {
            self.database_path = path;
        }
        self.api_base_url = self.api_base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn geolocation_timeout(&self) -> Duration {
        Duration::from_millis(self.geolocation_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// Reject values that would only fail later, deep inside a request.
    pub fn validate(&self) -> crate::error::Result<()> {
        for (name, url) in [("api_base_url", &self.api_base_url), ("geocoder_url", &self.geocoder_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(TaskMapError::Configuration {
                    message: format!("{name} must be an http(s) URL, got {url:?}"),
                });
            }
        }
        if !self.default_location.is_valid() {
            return Err(TaskMapError::Configuration {
                message: format!("default_location {} is out of range", self.default_location),
            });
        }
        if self.request_timeout_ms == 0 || self.geolocation_timeout_ms == 0 {
            return Err(TaskMapError::Configuration {
                message: "timeouts must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
