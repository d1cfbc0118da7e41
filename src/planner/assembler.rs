//! Day-by-day itinerary assembly.

use std::sync::{Arc, Mutex};

use chrono::{Days, NaiveDate};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, instrument, warn};

use super::catalog::{attractions_to_activities, resolve_catalog};
use super::partition::partition_by_day;
use super::pricing::{convert_activities, day_total};
use super::weather_filter::{MAX_ACTIVITIES_PER_DAY, select_for_weather};
use crate::models::{Activity, DayPlan, DestinationInput, PlacesProviderKind, WeatherSnapshot};
use crate::providers::{AttractionProvider, ExchangeRateProvider, Fetched};

/// Smallest attraction feed requested from the places service
const MIN_ATTRACTION_FEED: usize = 12;

/// Turns a destination, a forecast and a currency into day plans.
///
/// Exchange rates come from an [`ExchangeRateProvider`]; live attractions
/// from an optional [`AttractionProvider`]. Activity selection draws from a
/// seedable random source so that tests can pin the output.
pub struct ItineraryPlanner {
    rates: Arc<dyn ExchangeRateProvider>,
    attractions: Option<Arc<dyn AttractionProvider>>,
    rng: Mutex<StdRng>,
}

impl std::fmt::Debug for ItineraryPlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItineraryPlanner")
            .field("live_attractions", &self.attractions.is_some())
            .finish_non_exhaustive()
    }
}

impl ItineraryPlanner {
    /// Planner without live attractions, randomly seeded
    pub fn new(rates: Arc<dyn ExchangeRateProvider>) -> Self {
        Self {
            rates,
            attractions: None,
            rng: Mutex::new(StdRng::seed_from_u64(rand::random())),
        }
    }

    #[must_use]
    pub fn with_attractions(mut self, attractions: Arc<dyn AttractionProvider>) -> Self {
        self.attractions = Some(attractions);
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Candidate activities for one day: catalog lookup, then weather filter.
    pub fn generate_activities(
        &self,
        weather: &WeatherSnapshot,
        destination: &DestinationInput,
    ) -> Vec<Activity> {
        let candidates = resolve_catalog(destination);
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        select_for_weather(candidates, weather.condition, &mut *rng)
    }

    /// Price one day's activities and wrap them in a [`DayPlan`].
    ///
    /// `activities` is used as-is when non-empty; otherwise the day's
    /// activities are generated from the catalog. Activity ids are prefixed
    /// with the day number so they stay unique across a whole itinerary.
    pub fn generate_day_plan(
        &self,
        day: u32,
        date: NaiveDate,
        weather: &WeatherSnapshot,
        destination: &DestinationInput,
        exchange_rate: f64,
        activities: &[Activity],
    ) -> DayPlan {
        let selected = if activities.is_empty() {
            self.generate_activities(weather, destination)
        } else {
            activities.to_vec()
        };

        let converted: Vec<Activity> = convert_activities(&selected, exchange_rate)
            .into_iter()
            .map(|activity| activity.with_id(format!("d{day}_{}", activity.id)))
            .collect();
        let total_cost = day_total(&converted);

        DayPlan {
            day,
            date,
            notes: Some(format!(
                "Day {day} in {} - {}",
                destination.name(),
                weather.description
            )),
            weather: weather.clone(),
            activities: converted,
            total_cost,
        }
    }

    /// Build exactly `days` day plans starting at `start_date`.
    ///
    /// `weather` is indexed by day; days past its end reuse the first entry.
    /// Days whose date would overflow the calendar are dropped. Live attractions are only requested for a resolved destination, and
    /// any failure there falls back to catalog generation for every day.
    #[instrument(skip(self, weather), fields(destination = destination.name()))]
    #[allow(clippy::too_many_arguments)]
    pub async fn generate_itinerary(
        &self,
        destination: &DestinationInput,
        start_date: NaiveDate,
        days: u32,
        weather: &[WeatherSnapshot],
        currency: &str,
        provider: Option<PlacesProviderKind>,
        budget: Option<f64>,
    ) -> Vec<DayPlan> {
        let day_count = usize::try_from(days).unwrap_or(usize::MAX);
        let rate = self.rates.exchange_rate("USD", currency).await;
        debug!("Using USD->{} rate {}", currency, rate.rate);

        let live = self
            .fetch_attractions(destination, provider, day_count)
            .await;
        let slices = partition_by_day(&live, day_count);

        let fallback_weather = WeatherSnapshot::unavailable();
        let mut plans = Vec::with_capacity(day_count);
        for (index, todays_attractions) in (1..=days).zip(slices) {
            let offset = usize::try_from(index - 1).unwrap_or_default();
            let Some(date) = start_date.checked_add_days(Days::new(u64::from(index - 1))) else {
                warn!("Day {} after {} is past the last representable date", index, start_date);
                break;
            };
            let day_weather = weather
                .get(offset)
                .or_else(|| weather.first())
                .unwrap_or(&fallback_weather);

            plans.push(self.generate_day_plan(
                index,
                date,
                day_weather,
                destination,
                rate.rate,
                todays_attractions,
            ));
        }

        if let Some(budget) = budget {
            let total: f64 = plans.iter().map(|plan| plan.total_cost).sum();
            if total > budget {
                warn!(
                    "Planned activities cost {}{:.2}, over the budget of {:.2}",
                    rate.symbol, total, budget
                );
            }
        }

        info!("Generated {} day plans", plans.len());
        plans
    }

    async fn fetch_attractions(
        &self,
        destination: &DestinationInput,
        provider: Option<PlacesProviderKind>,
        days: usize,
    ) -> Vec<Activity> {
        let (Some(source), Some(resolved)) = (&self.attractions, destination.resolved()) else {
            return Vec::new();
        };

        let limit = MIN_ATTRACTION_FEED.max(days.saturating_mul(MAX_ACTIVITIES_PER_DAY));
        match source.attractions(resolved, provider, limit).await {
            Fetched::Live(attractions) => {
                debug!("Received {} live attractions", attractions.len());
                attractions_to_activities(&attractions)
            }
            Fetched::Fallback(reason) => {
                warn!("Live attractions unavailable, using catalog: {}", reason);
                Vec::new()
            }
        }
    }
}
