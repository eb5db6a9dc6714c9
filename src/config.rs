use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

use crate::donkey::cities;
use crate::models::City;

/// Top-level configuration file structure. Every section is optional.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default = "default_output_dir")]
    output_dir: PathBuf,
    #[serde(default)]
    output_format: OutputFormat,
    #[serde(default)]
    fetch: FetchConfig,
    /// Replaces the built-in registry when present.
    cities: Option<Vec<City>>,
}

/// Shape of the per-city output files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// GeoJSON FeatureCollection with a metadata block.
    #[default]
    FeatureCollection,
    /// Bare array of hub objects.
    Array,
}

/// HTTP settings (optional in config file).
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchConfig {
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_city_delay_ms")]
    pub city_delay_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("hub-data")
}
fn default_request_timeout_secs() -> u64 {
    15
}
fn default_city_delay_ms() -> u64 {
    200
}
fn default_user_agent() -> String {
    "DonkeyHubProcessor/1.0".to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            request_timeout_secs: default_request_timeout_secs(),
            city_delay_ms: default_city_delay_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl FetchConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn city_delay(&self) -> Duration {
        Duration::from_millis(self.city_delay_ms)
    }
}

/// Resolved application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub output_dir: PathBuf,
    pub output_format: OutputFormat,
    pub fetch: FetchConfig,
    pub cities: Vec<City>,
}

impl Default for Config {
    /// Built-in registry, `hub-data/` output, GeoJSON format.
    fn default() -> Self {
        Config {
            output_dir: default_output_dir(),
            output_format: OutputFormat::default(),
            fetch: FetchConfig::default(),
            cities: cities::default_cities(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_json(&contents)
    }

    /// Parse config from a JSON string (useful for testing).
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let config = Config {
            output_dir: raw.output_dir,
            output_format: raw.output_format,
            fetch: raw.fetch,
            cities: raw.cities.unwrap_or_else(cities::default_cities),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate config values are within acceptable ranges.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.cities.is_empty() {
            return Err(ConfigError::Validation(
                "cities cannot be empty".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for city in &self.cities {
            if !is_file_safe_name(&city.name) {
                return Err(ConfigError::Validation(format!(
                    "city name {:?} must be non-empty and use only letters, digits, '-' or '_'",
                    city.name
                )));
            }
            if !names.insert(city.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate city name {:?}",
                    city.name
                )));
            }
            if city.endpoints.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "city {:?} has no endpoints",
                    city.name
                )));
            }
            for endpoint in &city.endpoints {
                let valid = Url::parse(endpoint)
                    .map(|u| u.scheme() == "https" || u.scheme() == "http")
                    .unwrap_or(false);
                if !valid {
                    return Err(ConfigError::Validation(format!(
                        "city {:?} has invalid endpoint {:?}",
                        city.name, endpoint
                    )));
                }
            }
        }
        Ok(())
    }
}

/// City names become file names, so they are restricted to a safe alphabet.
fn is_file_safe_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error: {0}")]
    Io(String),
    #[error("Config parse error: {0}")]
    Parse(String),
    #[error("Config validation error: {0}")]
    Validation(String),
}
