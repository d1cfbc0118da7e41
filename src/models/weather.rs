//! Daily weather snapshot model

use serde::{Deserialize, Serialize};

/// Coarse weather condition for one planned day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherCondition {
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Storm,
    Snow,
    Mist,
}

impl WeatherCondition {
    /// Map an Open-Meteo WMO weather code.
    ///
    /// See: <https://open-meteo.com/en/docs> for the code table. Drizzle codes
    /// are folded into `Rain`, unknown codes into `Clouds`.
    #[must_use]
    pub const fn from_wmo_code(code: u8) -> Self {
        match code {
            0 => Self::Clear,
            1..=3 => Self::Clouds,
            45 | 48 => Self::Mist,
            51 | 53 | 55 | 56 | 57 | 61 | 63 | 65 | 66 | 67 | 80..=82 => Self::Rain,
            71 | 73 | 75 | 77 | 85 | 86 => Self::Snow,
            95 | 96 | 99 => Self::Storm,
            _ => Self::Clouds,
        }
    }

    /// Map an OpenWeatherMap condition id (2xx thunderstorm ... 80x clouds).
    /// Returns `None` for ids outside the documented groups.
    #[must_use]
    pub const fn from_openweather_id(id: u16) -> Option<Self> {
        match id {
            200..=299 => Some(Self::Storm),
            300..=399 => Some(Self::Drizzle),
            500..=599 => Some(Self::Rain),
            600..=699 => Some(Self::Snow),
            700..=799 => Some(Self::Mist),
            800 => Some(Self::Clear),
            801..=804 => Some(Self::Clouds),
            _ => None,
        }
    }

    /// Parse an OpenWeatherMap `main` group name such as "Thunderstorm"
    #[must_use]
    pub fn from_main(main: &str) -> Self {
        match main.to_lowercase().as_str() {
            "clear" => Self::Clear,
            "rain" => Self::Rain,
            "drizzle" => Self::Drizzle,
            "thunderstorm" | "storm" => Self::Storm,
            "snow" => Self::Snow,
            "mist" | "fog" | "haze" | "smoke" | "dust" => Self::Mist,
            _ => Self::Clouds,
        }
    }

    /// Conditions under which weather-dependent activities are dropped
    #[must_use]
    pub const fn is_adverse(&self) -> bool {
        matches!(self, Self::Rain | Self::Storm)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::Clouds => "Clouds",
            Self::Rain => "Rain",
            Self::Drizzle => "Drizzle",
            Self::Storm => "Storm",
            Self::Snow => "Snow",
            Self::Mist => "Mist",
        }
    }
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Weather for one day of the trip
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherSnapshot {
    /// Temperature in Celsius
    pub temperature: f32,
    pub condition: WeatherCondition,
    /// Human-readable description, e.g. "Light rain"
    pub description: String,
    /// Relative humidity percentage (0-100)
    pub humidity: u8,
    /// Wind speed in km/h
    pub wind_speed: f32,
    /// OpenWeatherMap-style icon code, e.g. "10d"
    pub icon: String,
}

impl WeatherSnapshot {
    #[must_use]
    pub fn new(condition: WeatherCondition, description: impl Into<String>, temperature: f32) -> Self {
        Self {
            temperature,
            condition,
            description: description.into(),
            humidity: 55,
            wind_speed: 10.0,
            icon: default_icon(condition).to_string(),
        }
    }

    /// Neutral snapshot used when no forecast at all was supplied for a trip
    #[must_use]
    pub fn unavailable() -> Self {
        Self::new(WeatherCondition::Clouds, "Forecast unavailable", 20.0)
    }

    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.0}°C", self.temperature)
    }
}

fn default_icon(condition: WeatherCondition) -> &'static str {
    match condition {
        WeatherCondition::Clear => "01d",
        WeatherCondition::Clouds => "03d",
        WeatherCondition::Drizzle => "09d",
        WeatherCondition::Rain => "10d",
        WeatherCondition::Storm => "11d",
        WeatherCondition::Snow => "13d",
        WeatherCondition::Mist => "50d",
    }
}
