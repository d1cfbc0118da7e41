//! Open-Meteo daily forecast client (no API key required).

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::Result;
use crate::config::WeatherConfig;
use crate::http;
use crate::models::{WeatherCondition, WeatherSnapshot};

/// Open-Meteo has no humidity in the daily endpoint
const DAILY_HUMIDITY: u8 = 55;

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: Option<DailyData>,
}

#[derive(Debug, Deserialize)]
struct DailyData {
    #[serde(default)]
    time: Vec<String>,
    #[serde(rename = "temperature_2m_max", default)]
    temperature_max: Vec<Option<f32>>,
    #[serde(rename = "temperature_2m_min", default)]
    temperature_min: Vec<Option<f32>>,
    #[serde(rename = "weathercode", default)]
    weather_code: Vec<Option<u8>>,
    #[serde(rename = "windspeed_10m_max", default)]
    wind_speed_max: Vec<Option<f32>>,
}

/// Human-readable description of a WMO weather code
#[must_use]
pub fn describe_code(code: u8) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow",
        73 => "Moderate snow",
        75 => "Heavy snow",
        77 => "Snow grains",
        80 => "Rain showers",
        81 => "Heavy rain showers",
        82 => "Violent rain showers",
        85 => "Snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Cloudy",
    }
}

/// OpenWeatherMap-style icon for a WMO weather code
#[must_use]
pub fn icon_for_code(code: u8) -> &'static str {
    match code {
        0 => "01d",
        1..=3 => "02d",
        45 | 48 => "50d",
        61 | 63 | 65 | 80..=82 => "10d",
        71 | 73 | 75 | 85 | 86 => "13d",
        95 | 96 | 99 => "11d",
        _ => "03d",
    }
}

impl DailyData {
    /// Snapshots for the leading days that have both temperatures
    fn into_snapshots(self, days: usize) -> Vec<WeatherSnapshot> {
        let len = days.min(self.time.len());
        let mut snapshots = Vec::with_capacity(len);

        for i in 0..len {
            let (Some(Some(max)), Some(Some(min))) =
                (self.temperature_max.get(i), self.temperature_min.get(i))
            else {
                debug!("Open-Meteo day {} has no temperature, stopping", i);
                break;
            };
            let code = self.weather_code.get(i).copied().flatten().unwrap_or(3);
            let wind = self.wind_speed_max.get(i).copied().flatten().unwrap_or(0.0);

            snapshots.push(WeatherSnapshot {
                temperature: ((max + min) / 2.0).round(),
                condition: WeatherCondition::from_wmo_code(code),
                description: describe_code(code).to_string(),
                humidity: DAILY_HUMIDITY,
                wind_speed: wind.round(),
                icon: icon_for_code(code).to_string(),
            });
        }
        snapshots
    }
}

/// Client for `GET {base}/forecast?daily=...`
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
}

impl OpenMeteoClient {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        Ok(Self {
            client: http::client(config.timeout(), &http::default_user_agent())?,
            base_url: config.open_meteo_url.trim_end_matches('/').to_string(),
        })
    }

    /// Up to `days` daily snapshots; fewer when Open-Meteo returns fewer
    #[instrument(skip(self))]
    pub async fn daily_forecast(&self, lat: f64, lng: f64, days: u32) -> Result<Vec<WeatherSnapshot>> {
        let url = format!(
            "{}/forecast?latitude={lat}&longitude={lng}&daily=temperature_2m_max,temperature_2m_min,weathercode,windspeed_10m_max,precipitation_sum&timezone=auto&forecast_days={days}",
            self.base_url
        );
        let response: ForecastResponse = http::fetch_json(self.client.get(url), "Open-Meteo").await?;

        let snapshots = response
            .daily
            .map(|daily| daily.into_snapshots(usize::try_from(days).unwrap_or(usize::MAX)))
            .unwrap_or_default();
        debug!("Open-Meteo returned {} days", snapshots.len());
        Ok(snapshots)
    }
}
