//! Day plan, itinerary and currency rate models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Activity, Destination, WeatherSnapshot};

/// One day of the itinerary
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DayPlan {
    /// 1-based day index
    pub day: u32,
    pub date: NaiveDate,
    pub weather: WeatherSnapshot,
    pub activities: Vec<Activity>,
    /// Sum of the (already rounded) activity costs, rounded to 2 decimals
    pub total_cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Exchange rate between two currencies
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrencyRate {
    pub from: String,
    pub to: String,
    /// Multiply an amount in `from` by this to get `to`
    pub rate: f64,
    /// Display symbol of the target currency
    pub symbol: String,
}

/// A complete multi-day trip plan
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Itinerary {
    pub destination: Destination,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: u32,
    pub budget: Option<f64>,
    pub currency: String,
    pub currency_symbol: String,
    pub day_plans: Vec<DayPlan>,
    /// Sum of day totals, rounded to 2 decimals
    pub total_cost: f64,
    pub over_budget: bool,
}

impl Itinerary {
    /// Number of activities across all days
    #[must_use]
    pub fn activity_count(&self) -> usize {
        self.day_plans.iter().map(|day| day.activities.len()).sum()
    }
}
