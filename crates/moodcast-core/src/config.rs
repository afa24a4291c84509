use anyhow::{Context, Result};
use moodcast_news::{countries, CategorySelection, FilterMode};
use moodcast_weather::{Coordinates, LocationRequest, PermissionState, TemperatureUnit};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

pub const WEATHER_API_KEY_ENV: &str = "MOODCAST_WEATHER_API_KEY";
pub const NEWS_API_KEY_ENV: &str = "MOODCAST_NEWS_API_KEY";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub weather: WeatherConfig,

    #[serde(default)]
    pub news: NewsConfig,

    #[serde(default)]
    pub location: LocationConfig,

    /// Initial user preferences
    #[serde(default)]
    pub preferences: PreferencesConfig,
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn request_timeout(secs: u64) -> Duration {
    if secs == 0 {
        Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
    } else {
        Duration::from_secs(secs)
    }
}

/// Look up an API key, treating blank values as absent
fn present(key: &Option<String>) -> Option<&str> {
    key.as_deref().map(str::trim).filter(|k| !k.is_empty())
}

/// OpenWeatherMap settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,

    /// Read from the file or `MOODCAST_WEATHER_API_KEY`; never written back
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    #[serde(default = "default_request_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_weather_base_url() -> String {
    moodcast_weather::OPENWEATHER_API_BASE.to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            api_key: None,
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl WeatherConfig {
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        present(&self.api_key)
            .ok_or_else(|| ConfigError::MissingSetting("weather.api_key".to_string()))
    }

    pub fn timeout(&self) -> Duration {
        request_timeout(self.timeout_secs)
    }
}

/// NewsAPI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    #[serde(default = "default_news_base_url")]
    pub base_url: String,

    /// Read from the file or `MOODCAST_NEWS_API_KEY`; never written back
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    #[serde(default = "default_request_timeout_secs")]
    pub timeout_secs: u64,

    /// Country used by the last headline attempt
    #[serde(default = "default_fallback_country")]
    pub fallback_country: String,
}

fn default_news_base_url() -> String {
    moodcast_news::NEWSAPI_BASE.to_string()
}

fn default_fallback_country() -> String {
    countries::DEFAULT_COUNTRY.to_string()
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            base_url: default_news_base_url(),
            api_key: None,
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            fallback_country: default_fallback_country(),
        }
    }
}

impl NewsConfig {
    /// A missing key is tolerated; every news request then fails and the feed stays empty.
    pub fn api_key(&self) -> &str {
        present(&self.api_key).unwrap_or_default()
    }

    pub fn timeout(&self) -> Duration {
        request_timeout(self.timeout_secs)
    }
}

/// Device location settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_fallback_latitude")]
    pub fallback_latitude: f64,

    #[serde(default = "default_fallback_longitude")]
    pub fallback_longitude: f64,

    #[serde(default = "default_location_timeout_secs")]
    pub timeout_secs: u64,

    /// Oldest cached fix accepted from the platform
    #[serde(default = "default_maximum_age_secs")]
    pub maximum_age_secs: u64,

    /// Fixed position standing in for a device fix
    #[serde(default)]
    pub latitude: Option<f64>,

    #[serde(default)]
    pub longitude: Option<f64>,

    #[serde(default)]
    pub permission: PermissionState,
}

fn default_fallback_latitude() -> f64 {
    moodcast_weather::FALLBACK_COORDINATES.latitude
}

fn default_fallback_longitude() -> f64 {
    moodcast_weather::FALLBACK_COORDINATES.longitude
}

fn default_location_timeout_secs() -> u64 {
    moodcast_weather::location::DEFAULT_TIMEOUT.as_secs()
}

fn default_maximum_age_secs() -> u64 {
    moodcast_weather::location::DEFAULT_MAXIMUM_AGE.as_secs()
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            fallback_latitude: default_fallback_latitude(),
            fallback_longitude: default_fallback_longitude(),
            timeout_secs: default_location_timeout_secs(),
            maximum_age_secs: default_maximum_age_secs(),
            latitude: None,
            longitude: None,
            permission: PermissionState::default(),
        }
    }
}

impl LocationConfig {
    pub fn fallback(&self) -> Coordinates {
        Coordinates::new(self.fallback_latitude, self.fallback_longitude)
    }

    /// Configured position, if both halves are set
    pub fn fixed_position(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)),
            _ => None,
        }
    }

    pub fn request(&self) -> LocationRequest {
        let defaults = LocationRequest::default();
        LocationRequest {
            timeout: if self.timeout_secs == 0 {
                defaults.timeout
            } else {
                Duration::from_secs(self.timeout_secs)
            },
            maximum_age: Duration::from_secs(self.maximum_age_secs),
            high_accuracy: defaults.high_accuracy,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreferencesConfig {
    #[serde(default)]
    pub temperature_unit: TemperatureUnit,

    #[serde(default)]
    pub categories: CategorySelection,

    #[serde(default)]
    pub filter_mode: FilterMode,
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&contents).context("Failed to parse config file")?
        } else {
            let config = Self::default();
            config.save_to(path)?;
            config
        };

        config.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Replace API keys with values from the environment when present.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(WEATHER_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.weather.api_key = Some(key);
        }
        if let Some(key) = lookup(NEWS_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.news.api_key = Some(key);
        }
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        validate_url(&self.weather.base_url, "weather.base_url", &mut result);
        validate_url(&self.news.base_url, "news.base_url", &mut result);

        if present(&self.weather.api_key).is_none() {
            result.add_error(
                "weather.api_key",
                format!("No weather API key; set {}", WEATHER_API_KEY_ENV),
            );
        }
        if present(&self.news.api_key).is_none() {
            result.add_warning(
                "news.api_key",
                format!("No news API key; set {} to load articles", NEWS_API_KEY_ENV),
            );
        }

        if self.weather.timeout_secs == 0 {
            result.add_warning("weather.timeout_secs", "Timeout of 0 ignored, using default");
        }
        if self.news.timeout_secs == 0 {
            result.add_warning("news.timeout_secs", "Timeout of 0 ignored, using default");
        }
        if self.location.timeout_secs == 0 {
            result.add_warning("location.timeout_secs", "Timeout of 0 ignored, using default");
        }

        if !countries::is_supported(&self.news.fallback_country) {
            result.add_warning(
                "news.fallback_country",
                format!(
                    "{:?} is not a supported headline country",
                    self.news.fallback_country
                ),
            );
        }

        if !self.location.fallback().is_valid() {
            result.add_error(
                "location.fallback_latitude",
                "Fallback coordinates out of range",
            );
        }

        match (self.location.latitude, self.location.longitude) {
            (Some(_), None) | (None, Some(_)) => result.add_warning(
                "location",
                "Both latitude and longitude are needed for a fixed position",
            ),
            _ => {}
        }
        if let Some(position) = self.location.fixed_position() {
            if !position.is_valid() {
                result.add_error("location.latitude", "Fixed position out of range");
            }
        }

        result
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("moodcast");

        Ok(config_dir.join("config.toml"))
    }
}

/// Validate a URL field
fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
    match Url::parse(url_str) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                result.add_error(
                    field_name,
                    format!("URL must use http or https scheme, got: {}", url.scheme()),
                );
            }

            if url.host().is_none() {
                result.add_error(field_name, "URL must have a host");
            }
        }
        Err(e) => {
            result.add_error(field_name, format!("Invalid URL: {}", e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodcast_news::NewsCategory;

    fn keyed() -> Config {
        let mut config = Config::default();
        config.weather.api_key = Some("weather-key".into());
        config.news.api_key = Some("news-key".into());
        config
    }

    #[test]
    fn test_keyed_default_config_is_clean() {
        let result = keyed().validate();
        assert!(result.is_valid(), "errors: {:?}", result.errors);
        assert!(result.warnings.is_empty(), "warnings: {:?}", result.warnings);
    }

    #[test]
    fn test_default_base_urls_match_providers() {
        let config = Config::default();
        assert_eq!(config.weather.base_url, moodcast_weather::OPENWEATHER_API_BASE);
        assert_eq!(config.news.base_url, moodcast_news::NEWSAPI_BASE);
    }

    #[test]
    fn test_missing_weather_key_is_error() {
        let mut config = keyed();
        config.weather.api_key = Some("   ".into());
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "weather.api_key"));
        assert!(matches!(
            config.weather.api_key(),
            Err(ConfigError::MissingSetting(_))
        ));
    }

    #[test]
    fn test_missing_news_key_is_warning() {
        let mut config = keyed();
        config.news.api_key = None;
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "news.api_key"));
        assert_eq!(config.news.api_key(), "");
    }

    #[test]
    fn test_invalid_url() {
        let mut config = keyed();
        config.news.base_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "news.base_url"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = keyed();
        config.weather.base_url = "ftp://localhost:8080".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result
            .errors
            .iter()
            .any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_zero_timeout_warns_and_uses_default() {
        let mut config = keyed();
        config.weather.timeout_secs = 0;
        config.location.timeout_secs = 0;
        let result = config.validate();
        assert!(result.is_valid());
        assert_eq!(result.warnings.len(), 2);
        assert_eq!(config.weather.timeout(), Duration::from_secs(15));
        assert_eq!(config.location.request().timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_out_of_range_fallback_is_error() {
        let mut config = keyed();
        config.location.fallback_latitude = 123.0;
        assert!(!config.validate().is_valid());
    }

    #[test]
    fn test_half_fixed_position_is_ignored() {
        let mut config = keyed();
        config.location.latitude = Some(48.85);
        assert!(config.location.fixed_position().is_none());
        assert!(config.validate().warnings.iter().any(|w| w.field == "location"));

        config.location.longitude = Some(2.35);
        assert_eq!(
            config.location.fixed_position(),
            Some(Coordinates::new(48.85, 2.35))
        );
    }

    #[test]
    fn test_env_overrides_keys() {
        let mut config = Config::default();
        config.weather.api_key = Some("from-file".into());
        config.apply_env_overrides(|name| match name {
            WEATHER_API_KEY_ENV => Some("from-env".into()),
            NEWS_API_KEY_ENV => Some(String::new()),
            _ => None,
        });

        assert_eq!(config.weather.api_key().unwrap(), "from-env");
        assert!(config.news.api_key.is_none());
    }

    #[test]
    fn test_first_load_writes_defaults_without_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moodcast").join("config.toml");

        let mut config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.news.fallback_country, "us");

        config.weather.api_key = Some("secret".into());
        config.save_to(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("secret"));
        assert!(!written.contains("api_key"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[weather]
api_key = "abc"

[location]
permission = "denied"

[preferences]
temperature_unit = "fahrenheit"
categories = ["sports", "science"]
filter_mode = "all"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.weather.base_url, "https://api.openweathermap.org/data/2.5");
        assert_eq!(config.location.permission, PermissionState::Denied);
        assert_eq!(config.location.fallback(), moodcast_weather::FALLBACK_COORDINATES);
        assert_eq!(
            config.preferences.temperature_unit,
            TemperatureUnit::Fahrenheit
        );
        assert_eq!(config.preferences.categories.first(), NewsCategory::Sports);
        assert_eq!(config.preferences.filter_mode, FilterMode::AllNews);
    }

    #[test]
    fn test_empty_category_list_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[preferences]\ncategories = []\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }
}
