use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::datefmt::{DatePattern, DEFAULT_PATTERN};
use crate::error::ConfigError;

pub const API_URL_ENV: &str = "REVDASH_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub api_base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    pub date_pattern: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
    pub search_debounce_ms: u64,
    pub page_size: usize,
    pub restaurants: Vec<RestaurantConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RestaurantConfig {
    pub id: i64,
    pub name: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            request_timeout_secs: None,
            date_pattern: DEFAULT_PATTERN.to_string(),
            export_dir: None,
            search_debounce_ms: 300,
            page_size: 10,
            restaurants: vec![
                RestaurantConfig {
                    id: 1,
                    name: "Restaurant 1".to_string(),
                },
                RestaurantConfig {
                    id: 2,
                    name: "Restaurant 2".to_string(),
                },
            ],
        }
    }
}

impl DashboardConfig {
    pub fn date_pattern(&self) -> Result<DatePattern, ConfigError> {
        Ok(DatePattern::parse(&self.date_pattern)?)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// Export directory: configured > user downloads > current directory.
    pub fn resolved_export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn default_restaurant(&self) -> i64 {
        self.restaurants.first().map(|r| r.id).unwrap_or(1)
    }

    pub fn restaurant_name(&self, id: i64) -> String {
        self.restaurants
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| format!("Restaurant {}", id))
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_base_url = url.trim().to_string();
            }
        }
    }

    fn validate(self) -> Result<Self, ConfigError> {
        self.date_pattern()?;
        Ok(self)
    }
}

pub fn config_dir() -> Result<PathBuf, ConfigError> {
    ProjectDirs::from("com", "revdash", "revdash")
        .ok_or(ConfigError::NoConfigDir)
        .map(|dirs| dirs.config_dir().to_path_buf())
}

pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    config_dir().map(|dir| dir.join("config.toml"))
}

pub fn parse_config(content: &str) -> Result<DashboardConfig, ConfigError> {
    let cfg: DashboardConfig = toml::from_str(content)?;
    cfg.validate()
}

/// Loads the config file (defaults when missing), then applies environment
/// overrides.
pub fn load_config() -> Result<DashboardConfig, ConfigError> {
    let file = config_file_path()?;
    let mut cfg = if file.exists() {
        parse_config(&fs::read_to_string(&file)?)?
    } else {
        DashboardConfig::default()
    };
    cfg.apply_env();
    Ok(cfg)
}

pub fn save_config(config: &DashboardConfig) -> Result<(), ConfigError> {
    let dir = config_dir()?;
    fs::create_dir_all(&dir)?;
    let file = config_file_path()?;
    let content = toml::to_string_pretty(config)?;

    let temp_file = file.with_extension("toml.tmp");
    fs::write(&temp_file, content)?;
    fs::rename(&temp_file, &file)?;
    Ok(())
}
