//! Configuration management for the trip planner
//!
//! Handles loading configuration from a TOML file and `TRIPPLANNER_`
//! environment variables, and validates every section before use.

use crate::TripPlannerError;
use crate::models::PlacesProviderKind;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub currency: CurrencyConfig,
    #[serde(default)]
    pub places: PlacesConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub planner: PlannerDefaults,
}

/// Exchange-rate API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// When false no request is ever sent and built-in rates are used
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_currency_base_url")]
    pub base_url: String,
    pub api_key: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    #[serde(default = "default_currency_ttl")]
    pub cache_ttl_minutes: u32,
}

/// Geocoding and points-of-interest settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacesConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_places_provider")]
    pub provider: PlacesProviderKind,
    /// Google is only ever queried when this is set
    pub google_api_key: Option<String>,
    #[serde(default = "default_nominatim_url")]
    pub nominatim_url: String,
    #[serde(default = "default_overpass_url")]
    pub overpass_url: String,
    #[serde(default = "default_google_places_url")]
    pub google_places_url: String,
    /// Nominatim rejects requests without a user agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_search_radius")]
    pub search_radius_m: u32,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    #[serde(default = "default_places_ttl")]
    pub cache_ttl_minutes: u32,
}

/// Forecast settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_open_meteo_url")]
    pub open_meteo_url: String,
    #[serde(default = "default_openweather_url")]
    pub openweather_url: String,
    pub openweather_api_key: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    #[serde(default = "default_weather_ttl")]
    pub cache_ttl_minutes: u32,
    /// Longest forecast fetched natively; longer trips repeat the pattern
    #[serde(default = "default_max_forecast_days")]
    pub max_forecast_days: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Planning defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerDefaults {
    #[serde(default = "default_currency")]
    pub default_currency: String,
    /// Fixes activity selection order; random when unset
    pub seed: Option<u64>,
}

fn default_enabled() -> bool {
    true
}

fn default_timeout() -> u32 {
    10
}

fn default_currency_base_url() -> String {
    "https://api.exchangerate-api.com/v4".to_string()
}

fn default_currency_ttl() -> u32 {
    60
}

fn default_places_provider() -> PlacesProviderKind {
    PlacesProviderKind::Nominatim
}

fn default_nominatim_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_overpass_url() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}

fn default_google_places_url() -> String {
    "https://maps.googleapis.com/maps/api/place".to_string()
}

fn default_user_agent() -> String {
    crate::http::default_user_agent()
}

fn default_search_radius() -> u32 {
    10_000
}

fn default_places_ttl() -> u32 {
    30
}

fn default_open_meteo_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_openweather_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_weather_ttl() -> u32 {
    10
}

fn default_max_forecast_days() -> u32 {
    14
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            base_url: default_currency_base_url(),
            api_key: None,
            timeout_seconds: default_timeout(),
            cache_ttl_minutes: default_currency_ttl(),
        }
    }
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            provider: default_places_provider(),
            google_api_key: None,
            nominatim_url: default_nominatim_url(),
            overpass_url: default_overpass_url(),
            google_places_url: default_google_places_url(),
            user_agent: default_user_agent(),
            search_radius_m: default_search_radius(),
            timeout_seconds: default_timeout(),
            cache_ttl_minutes: default_places_ttl(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            open_meteo_url: default_open_meteo_url(),
            openweather_url: default_openweather_url(),
            openweather_api_key: None,
            timeout_seconds: default_timeout(),
            cache_ttl_minutes: default_weather_ttl(),
            max_forecast_days: default_max_forecast_days(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for PlannerDefaults {
    fn default() -> Self {
        Self {
            default_currency: default_currency(),
            seed: None,
        }
    }
}

impl CurrencyConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }
}

impl PlacesConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }

    /// Google key, treating an empty string as absent
    #[must_use]
    pub fn google_key(&self) -> Option<&str> {
        self.google_api_key.as_deref().filter(|key| !key.is_empty())
    }
}

impl WeatherConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }

    #[must_use]
    pub fn openweather_key(&self) -> Option<&str> {
        self.openweather_api_key.as_deref().filter(|key| !key.is_empty())
    }
}

impl PlannerConfig {
    /// Load configuration from the default file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // TRIPPLANNER_PLACES__GOOGLE_API_KEY -> places.google_api_key
        builder = builder.add_source(
            Environment::with_prefix("TRIPPLANNER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: PlannerConfig = settings
            .try_deserialize()
            .with_context(|| format!("Failed to deserialize configuration from {}", config_file.display()))?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tripplanner").join("config.toml"))
    }

    /// Replace zero or empty values with their defaults
    pub fn apply_defaults(&mut self) {
        if self.currency.base_url.is_empty() {
            self.currency.base_url = default_currency_base_url();
        }
        if self.currency.timeout_seconds == 0 {
            self.currency.timeout_seconds = default_timeout();
        }
        if self.currency.cache_ttl_minutes == 0 {
            self.currency.cache_ttl_minutes = default_currency_ttl();
        }
        if self.places.nominatim_url.is_empty() {
            self.places.nominatim_url = default_nominatim_url();
        }
        if self.places.overpass_url.is_empty() {
            self.places.overpass_url = default_overpass_url();
        }
        if self.places.google_places_url.is_empty() {
            self.places.google_places_url = default_google_places_url();
        }
        if self.places.user_agent.is_empty() {
            self.places.user_agent = default_user_agent();
        }
        if self.places.search_radius_m == 0 {
            self.places.search_radius_m = default_search_radius();
        }
        if self.places.timeout_seconds == 0 {
            self.places.timeout_seconds = default_timeout();
        }
        if self.places.cache_ttl_minutes == 0 {
            self.places.cache_ttl_minutes = default_places_ttl();
        }
        if self.weather.open_meteo_url.is_empty() {
            self.weather.open_meteo_url = default_open_meteo_url();
        }
        if self.weather.openweather_url.is_empty() {
            self.weather.openweather_url = default_openweather_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_timeout();
        }
        if self.weather.cache_ttl_minutes == 0 {
            self.weather.cache_ttl_minutes = default_weather_ttl();
        }
        if self.weather.max_forecast_days == 0 {
            self.weather.max_forecast_days = default_max_forecast_days();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.planner.default_currency.is_empty() {
            self.planner.default_currency = default_currency();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Keys are optional, but a configured key must look like one
    pub fn validate_api_keys(&self) -> Result<()> {
        let keys = [
            ("Currency API key", self.currency.api_key.as_deref()),
            ("Google Places API key", self.places.google_api_key.as_deref()),
            ("OpenWeatherMap API key", self.weather.openweather_api_key.as_deref()),
        ];

        for (label, key) in keys {
            let Some(key) = key else { continue };
            if key.is_empty() {
                return Err(TripPlannerError::config(format!(
                    "{label} cannot be empty if provided. Either remove it or provide a valid key."
                ))
                .into());
            }
            if key.len() < 8 {
                return Err(TripPlannerError::config(format!(
                    "{label} appears to be invalid (too short). Please check your API key."
                ))
                .into());
            }
            if key.len() > 100 {
                return Err(TripPlannerError::config(format!(
                    "{label} appears to be invalid (too long). Please check your API key."
                ))
                .into());
            }
        }

        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        let timeouts = [
            self.currency.timeout_seconds,
            self.places.timeout_seconds,
            self.weather.timeout_seconds,
        ];
        if timeouts.iter().any(|&timeout| timeout > 300) {
            return Err(TripPlannerError::config("API timeout cannot exceed 300 seconds").into());
        }

        let ttls = [
            self.currency.cache_ttl_minutes,
            self.places.cache_ttl_minutes,
            self.weather.cache_ttl_minutes,
        ];
        if ttls.iter().any(|&ttl| ttl > 1440) {
            return Err(
                TripPlannerError::config("Cache TTL cannot exceed 1440 minutes (1 day)").into(),
            );
        }

        if self.places.search_radius_m > 50_000 {
            return Err(
                TripPlannerError::config("Attraction search radius cannot exceed 50000 m").into(),
            );
        }

        if self.weather.max_forecast_days > 16 {
            return Err(TripPlannerError::config(
                "Open-Meteo serves at most 16 forecast days",
            )
            .into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TripPlannerError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TripPlannerError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let urls = [
            ("Currency API", &self.currency.base_url),
            ("Nominatim", &self.places.nominatim_url),
            ("Overpass", &self.places.overpass_url),
            ("Google Places", &self.places.google_places_url),
            ("Open-Meteo", &self.weather.open_meteo_url),
            ("OpenWeatherMap", &self.weather.openweather_url),
        ];
        for (label, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TripPlannerError::config(format!(
                    "{label} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        crate::currency::validate_currency_code(&self.planner.default_currency)
            .map_err(|e| TripPlannerError::config(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = PlannerConfig::default();
        assert_eq!(config.currency.base_url, "https://api.exchangerate-api.com/v4");
        assert_eq!(config.currency.cache_ttl_minutes, 60);
        assert_eq!(config.places.cache_ttl_minutes, 30);
        assert_eq!(config.places.search_radius_m, 10_000);
        assert_eq!(config.places.provider, PlacesProviderKind::Nominatim);
        assert_eq!(config.weather.cache_ttl_minutes, 10);
        assert_eq!(config.weather.max_forecast_days, 14);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.planner.default_currency, "USD");
        assert!(config.places.google_key().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_short_api_key_rejected() {
        let mut config = PlannerConfig::default();
        config.places.google_api_key = Some("abc".to_string());
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("too short"));
    }

    #[test]
    fn test_valid_api_key_accepted() {
        let mut config = PlannerConfig::default();
        config.weather.openweather_api_key = Some("valid_api_key_123".to_string());
        assert!(config.validate_api_keys().is_ok());
        assert_eq!(config.weather.openweather_key(), Some("valid_api_key_123"));
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = PlannerConfig::default();
        config.logging.level = "verbose".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_numeric_ranges() {
        let mut config = PlannerConfig::default();
        config.weather.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_bad_default_currency() {
        let mut config = PlannerConfig::default();
        config.planner.default_currency = "euro".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_defaults_fills_zeroes() {
        let mut config = PlannerConfig::default();
        config.currency.cache_ttl_minutes = 0;
        config.places.user_agent.clear();
        config.apply_defaults();
        assert_eq!(config.currency.cache_ttl_minutes, 60);
        assert!(config.places.user_agent.starts_with("tripplanner/"));
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!("tripplanner-test-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[places]\nprovider = \"google\"\ngoogle_api_key = \"google-key-123\"\n\n[weather]\nenabled = false\n\n[planner]\ndefault_currency = \"EUR\"\nseed = 7"
        )
        .unwrap();

        let config = PlannerConfig::load_from_path(Some(path.clone())).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.places.provider, PlacesProviderKind::Google);
        assert_eq!(config.places.google_key(), Some("google-key-123"));
        assert!(!config.weather.enabled);
        assert_eq!(config.planner.default_currency, "EUR");
        assert_eq!(config.planner.seed, Some(7));
        assert_eq!(config.currency.cache_ttl_minutes, 60);
    }

    #[test]
    fn test_config_path_generation() {
        let path = PlannerConfig::get_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("tripplanner"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }
}
