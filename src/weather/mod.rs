//! Daily forecasts for a trip.
//!
//! Sources are tried in order: Open-Meteo (keyless, up to
//! `max_forecast_days`), the forecast cache, OpenWeatherMap when a key is
//! configured, and finally a deterministic synthetic forecast. A forecast
//! request never fails.

pub mod open_meteo;
pub mod openweather;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Timelike;
use tracing::{debug, instrument, warn};

use crate::Result;
use crate::cache::{Clock, SystemClock, TtlCache};
use crate::config::WeatherConfig;
use crate::models::{WeatherCondition, WeatherSnapshot};
use crate::providers::WeatherProvider;

pub use open_meteo::OpenMeteoClient;
pub use openweather::OpenWeatherClient;

/// OpenWeatherMap's 5-day feed never yields more distinct dates than this
const OPENWEATHER_MAX_DAYS: usize = 7;
/// Longest OpenWeatherMap forecast before the pattern repeats
const OPENWEATHER_PATTERN_DAYS: usize = 14;

struct MockCondition {
    condition: WeatherCondition,
    description: &'static str,
    icon: &'static str,
    temperature: i32,
}

const MOCK_CONDITIONS: [MockCondition; 10] = [
    MockCondition { condition: WeatherCondition::Clear, description: "Clear sky", icon: "01d", temperature: 25 },
    MockCondition { condition: WeatherCondition::Clouds, description: "Few clouds", icon: "02d", temperature: 22 },
    MockCondition { condition: WeatherCondition::Clouds, description: "Partly cloudy", icon: "03d", temperature: 20 },
    MockCondition { condition: WeatherCondition::Clouds, description: "Overcast", icon: "04d", temperature: 19 },
    MockCondition { condition: WeatherCondition::Rain, description: "Light rain", icon: "10d", temperature: 18 },
    MockCondition { condition: WeatherCondition::Rain, description: "Moderate rain", icon: "10d", temperature: 16 },
    MockCondition { condition: WeatherCondition::Drizzle, description: "Drizzle", icon: "09d", temperature: 17 },
    MockCondition { condition: WeatherCondition::Storm, description: "Thunderstorm", icon: "11d", temperature: 15 },
    MockCondition { condition: WeatherCondition::Mist, description: "Misty", icon: "50d", temperature: 21 },
    MockCondition { condition: WeatherCondition::Clear, description: "Sunny", icon: "01d", temperature: 28 },
];

/// Deterministic synthetic weather for a location and day offset.
///
/// `hour` (0-23, UTC) shifts the pattern so repeated runs within the same
/// hour agree with each other.
#[must_use]
pub fn mock_weather(lat: f64, lng: f64, day_offset: u32, hour: u32) -> WeatherSnapshot {
    #[allow(clippy::cast_possible_truncation)]
    let location_seed = ((lat.abs() + lng.abs()) * 1000.0).floor() as i64;
    let day_seed = i64::from(day_offset) * 13;
    let index = (location_seed + day_seed + i64::from(hour % 24)).rem_euclid(MOCK_CONDITIONS.len() as i64);
    let mock = &MOCK_CONDITIONS[usize::try_from(index).unwrap_or(0)];

    #[allow(clippy::cast_precision_loss)]
    let variation = (f64::from(day_offset) * 0.3).sin() * 5.0 + (location_seed as f64 * 0.01).cos() * 3.0;
    #[allow(clippy::cast_possible_truncation)]
    let temperature = (mock.temperature + variation.floor() as i32).clamp(10, 35);

    #[allow(clippy::cast_precision_loss)]
    let day_seed = day_seed as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let humidity = (((day_seed * 0.5).sin() * 15.0 + 55.0).floor() as u32 % 80 + 30) as u8;
    #[allow(clippy::cast_possible_truncation)]
    let wind_speed = ((day_seed * 0.7).sin() * 8.0 + 12.0).floor() as f32;

    #[allow(clippy::cast_precision_loss)]
    let temperature = temperature as f32;

    WeatherSnapshot {
        temperature,
        condition: mock.condition,
        description: mock.description.to_string(),
        humidity,
        wind_speed,
        icon: mock.icon.to_string(),
    }
}

/// Extend `forecast` to `target` days by nudging the last day's temperature
/// up and down alternately.
fn pad_alternating(forecast: &mut Vec<WeatherSnapshot>, target: usize) {
    while forecast.len() < target {
        let Some(last) = forecast.last() else { return };
        let mut next = last.clone();
        next.temperature += if forecast.len() % 2 == 0 { 1.0 } else { -1.0 };
        forecast.push(next);
    }
}

/// Extend `forecast` to `target` days by repeating its first `period` days
fn repeat_pattern(forecast: &mut Vec<WeatherSnapshot>, target: usize, period: usize) {
    if period == 0 {
        return;
    }
    while forecast.len() < target {
        let Some(day) = forecast.get(forecast.len() % period).cloned() else { return };
        forecast.push(day);
    }
}

/// Multi-source forecast service with fallbacks
pub struct WeatherService {
    enabled: bool,
    max_forecast_days: u32,
    open_meteo: OpenMeteoClient,
    openweather: Option<OpenWeatherClient>,
    forecast_cache: TtlCache<Vec<WeatherSnapshot>>,
    current_cache: TtlCache<WeatherSnapshot>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for WeatherService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherService")
            .field("enabled", &self.enabled)
            .field("max_forecast_days", &self.max_forecast_days)
            .field("openweather", &self.openweather.is_some())
            .field("cached_forecasts", &self.forecast_cache.len())
            .finish()
    }
}

impl WeatherService {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &WeatherConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let ttl = chrono::Duration::minutes(config.cache_ttl_minutes.into());
        let openweather = match config.openweather_key() {
            Some(key) => Some(OpenWeatherClient::new(config, key)?),
            None => None,
        };

        Ok(Self {
            enabled: config.enabled,
            max_forecast_days: config.max_forecast_days.max(1),
            open_meteo: OpenMeteoClient::new(config)?,
            openweather,
            forecast_cache: TtlCache::with_clock("weather_forecast", ttl, clock.clone()),
            current_cache: TtlCache::with_clock("weather_current", ttl, clock.clone()),
            clock,
        })
    }

    fn current_hour(&self) -> u32 {
        self.clock.now().hour()
    }

    fn mock_forecast(&self, lat: f64, lng: f64, days: u32) -> Vec<WeatherSnapshot> {
        let hour = self.current_hour();
        (0..days).map(|day| mock_weather(lat, lng, day, hour)).collect()
    }

    /// Current conditions, cached per coordinate pair
    #[instrument(skip(self))]
    pub async fn current_weather(&self, lat: f64, lng: f64) -> WeatherSnapshot {
        let key = format!("{lat}_{lng}");
        if let Some(cached) = self.current_cache.get(&key) {
            return cached;
        }

        let now = self.clock.now();
        let day_offset = u32::try_from(now.timestamp().div_euclid(86_400).rem_euclid(10)).unwrap_or(0);
        let mock = || mock_weather(lat, lng, day_offset, now.hour());

        let client = match (&self.openweather, self.enabled) {
            (Some(client), true) => client,
            _ => {
                let snapshot = mock();
                self.current_cache.put(&key, snapshot.clone());
                return snapshot;
            }
        };

        match client.current(lat, lng).await {
            Ok(snapshot) => {
                self.current_cache.put(&key, snapshot.clone());
                snapshot
            }
            Err(e) => {
                warn!("Current weather unavailable, using synthetic data: {}", e);
                mock()
            }
        }
    }

    /// Exactly `days` daily snapshots starting today
    #[instrument(skip(self))]
    pub async fn forecast(&self, lat: f64, lng: f64, days: u32) -> Vec<WeatherSnapshot> {
        if days == 0 {
            return Vec::new();
        }
        let wanted = usize::try_from(days).unwrap_or(usize::MAX);
        let key = format!("{lat}_{lng}_{days}");

        if self.enabled {
            let native_days = days.min(self.max_forecast_days);
            match self.open_meteo.daily_forecast(lat, lng, native_days).await {
                Ok(mut forecast) if !forecast.is_empty() => {
                    let native = usize::try_from(native_days).unwrap_or(usize::MAX);
                    pad_alternating(&mut forecast, native);
                    repeat_pattern(&mut forecast, wanted, native);
                    forecast.truncate(wanted);
                    self.forecast_cache.put(&key, forecast.clone());
                    return forecast;
                }
                Ok(_) => debug!("Open-Meteo returned no days"),
                Err(e) => warn!("Open-Meteo forecast failed: {}", e),
            }
        }

        if let Some(cached) = self.forecast_cache.get(&key) {
            debug!("Serving cached forecast for {}", key);
            return cached;
        }

        let client = match (&self.openweather, self.enabled) {
            (Some(client), true) => client,
            _ => {
                let forecast = self.mock_forecast(lat, lng, days);
                self.forecast_cache.put(&key, forecast.clone());
                return forecast;
            }
        };

        let mut forecast = match client
            .daily_forecast(lat, lng, wanted.min(OPENWEATHER_MAX_DAYS))
            .await
        {
            Ok(forecast) => forecast,
            Err(e) => {
                warn!("OpenWeatherMap forecast failed, using synthetic data: {}", e);
                return self.mock_forecast(lat, lng, days);
            }
        };

        if forecast.is_empty() {
            forecast.push(self.current_weather(lat, lng).await);
        }
        let pattern_days = wanted.min(OPENWEATHER_PATTERN_DAYS);
        while forecast.len() < pattern_days {
            let Some(last) = forecast.last() else { break };
            let mut next = last.clone();
            #[allow(clippy::cast_precision_loss)]
            let swing = ((forecast.len() as f32).sin() * 3.0).round();
            next.temperature += swing;
            forecast.push(next);
        }
        repeat_pattern(&mut forecast, wanted, OPENWEATHER_PATTERN_DAYS);
        forecast.truncate(wanted);

        self.forecast_cache.put(&key, forecast.clone());
        forecast
    }

    pub fn clear_cache(&self) {
        self.forecast_cache.clear();
        self.current_cache.clear();
    }
}

#[async_trait]
impl WeatherProvider for WeatherService {
    async fn forecast(&self, lat: f64, lng: f64, days: u32) -> Vec<WeatherSnapshot> {
        WeatherService::forecast(self, lat, lng, days).await
    }
}
