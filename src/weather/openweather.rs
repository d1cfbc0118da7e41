//! OpenWeatherMap client (current conditions and the 5-day/3-hour forecast).

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Timelike};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::Result;
use crate::config::WeatherConfig;
use crate::http;
use crate::models::{WeatherCondition, WeatherSnapshot};

/// m/s to km/h
const MS_TO_KMH: f32 = 3.6;

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    main: MainData,
    #[serde(default)]
    weather: Vec<ConditionData>,
    wind: Option<WindData>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    list: Vec<ForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct ForecastEntry {
    /// Unix timestamp, UTC
    dt: i64,
    main: MainData,
    #[serde(default)]
    weather: Vec<ConditionData>,
    wind: Option<WindData>,
}

#[derive(Debug, Deserialize)]
struct MainData {
    temp: f32,
    #[serde(default)]
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct ConditionData {
    id: Option<u16>,
    #[serde(default)]
    main: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct WindData {
    #[serde(default)]
    speed: f32,
}

fn snapshot(main: &MainData, weather: &[ConditionData], wind: Option<&WindData>) -> WeatherSnapshot {
    let condition = weather.first();
    let kind = condition
        .and_then(|c| c.id.and_then(WeatherCondition::from_openweather_id))
        .or_else(|| condition.map(|c| WeatherCondition::from_main(&c.main)))
        .unwrap_or(WeatherCondition::Clouds);

    let mut snapshot = WeatherSnapshot::new(
        kind,
        condition.map_or_else(|| kind.as_str().to_string(), |c| c.description.clone()),
        main.temp.round(),
    );
    snapshot.humidity = main.humidity;
    snapshot.wind_speed = wind.map_or(0.0, |w| (w.speed * MS_TO_KMH).round());
    if let Some(icon) = condition.map(|c| c.icon.as_str()).filter(|icon| !icon.is_empty()) {
        snapshot.icon = icon.to_string();
    }
    snapshot
}

/// One entry per calendar date (UTC), the one closest to noon, in date order
fn daily_entries(entries: Vec<ForecastEntry>, max_days: usize) -> Vec<WeatherSnapshot> {
    let mut by_date: BTreeMap<NaiveDate, (u32, ForecastEntry)> = BTreeMap::new();

    for entry in entries {
        let Some(time) = DateTime::from_timestamp(entry.dt, 0) else {
            continue;
        };
        let distance = time.hour().abs_diff(12);
        match by_date.get(&time.date_naive()) {
            Some((best, _)) if *best <= distance => {}
            _ => {
                by_date.insert(time.date_naive(), (distance, entry));
            }
        }
    }

    by_date
        .into_values()
        .take(max_days)
        .map(|(_, entry)| snapshot(&entry.main, &entry.weather, entry.wind.as_ref()))
        .collect()
}

/// Client for the keyed OpenWeatherMap endpoints
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    pub fn new(config: &WeatherConfig, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http::client(config.timeout(), &http::default_user_agent())?,
            base_url: config.openweather_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn url(&self, endpoint: &str, lat: f64, lng: f64) -> String {
        format!(
            "{}/{endpoint}?lat={lat}&lon={lng}&appid={}&units=metric",
            self.base_url,
            urlencoding::encode(&self.api_key)
        )
    }

    #[instrument(skip(self))]
    pub async fn current(&self, lat: f64, lng: f64) -> Result<WeatherSnapshot> {
        let response: CurrentResponse =
            http::fetch_json(self.client.get(self.url("weather", lat, lng)), "OpenWeatherMap").await?;
        Ok(snapshot(&response.main, &response.weather, response.wind.as_ref()))
    }

    /// At most `max_days` daily snapshots derived from the 3-hourly feed
    #[instrument(skip(self))]
    pub async fn daily_forecast(&self, lat: f64, lng: f64, max_days: usize) -> Result<Vec<WeatherSnapshot>> {
        let response: ForecastResponse =
            http::fetch_json(self.client.get(self.url("forecast", lat, lng)), "OpenWeatherMap").await?;
        let days = daily_entries(response.list, max_days);
        debug!("OpenWeatherMap returned {} days", days.len());
        Ok(days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(dt: i64, temp: f32, id: u16) -> serde_json::Value {
        serde_json::json!({
            "dt": dt,
            "main": {"temp": temp, "humidity": 70},
            "weather": [{"id": id, "main": "Rain", "description": "light rain", "icon": "10d"}],
            "wind": {"speed": 5.0}
        })
    }

    #[test]
    fn test_picks_entry_closest_to_noon() {
        // 2025-05-01 09:00, 12:00, 15:00 UTC and 2025-05-02 00:00 UTC
        let list: Vec<ForecastEntry> = serde_json::from_value(serde_json::json!([
            entry(1_746_090_000, 10.0, 500),
            entry(1_746_100_800, 18.4, 800),
            entry(1_746_111_600, 16.0, 500),
            entry(1_746_144_000, 8.0, 211),
        ]))
        .unwrap();

        let days = daily_entries(list, 7);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].temperature, 18.0);
        assert_eq!(days[0].condition, WeatherCondition::Clear);
        assert_eq!(days[0].wind_speed, 18.0);
        assert_eq!(days[1].condition, WeatherCondition::Storm);
    }

    #[test]
    fn test_daily_entries_respects_limit() {
        let list: Vec<ForecastEntry> = serde_json::from_value(serde_json::json!([
            entry(1_746_100_800, 18.0, 800),
            entry(1_746_187_200, 19.0, 800),
            entry(1_746_273_600, 20.0, 800),
        ]))
        .unwrap();
        assert_eq!(daily_entries(list, 2).len(), 2);
    }

    #[test]
    fn test_unknown_id_falls_back_to_main_group() {
        let main = MainData { temp: 4.6, humidity: 90 };
        let weather = vec![ConditionData {
            id: Some(950),
            main: "Snow".into(),
            description: "light snow".into(),
            icon: String::new(),
        }];
        let result = snapshot(&main, &weather, None);
        assert_eq!(result.condition, WeatherCondition::Snow);
        assert_eq!(result.icon, "13d");
        assert_eq!(result.wind_speed, 0.0);
    }
}
