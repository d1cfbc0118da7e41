//! End-to-end trip planning: resolve the destination, fetch the forecast and
//! assemble an [`Itinerary`].

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::PlannerConfig;
use crate::currency::{self, CurrencyService};
use crate::models::{Destination, DestinationInput, Itinerary, PlacesProviderKind};
use crate::places::PlacesService;
use crate::planner::ItineraryPlanner;
use crate::planner::pricing::round_to_cents;
use crate::providers::{PlaceResolver, WeatherProvider};
use crate::weather::WeatherService;
use crate::{Result, TripPlannerError};

/// Longest trip that can be planned in one request
pub const MAX_TRIP_DAYS: u32 = 30;

/// How the traveller named the destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DestinationRef {
    /// Free-text search, resolved through the first suggestion
    Query(String),
    /// Provider place id from an earlier search
    PlaceId(String),
}

/// Everything needed to plan one trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    pub destination: DestinationRef,
    pub start_date: NaiveDate,
    pub days: u32,
    /// ISO code; the configured default when absent
    pub currency: Option<String>,
    /// Advisory spending limit in `currency`
    pub budget: Option<f64>,
    pub provider: Option<PlacesProviderKind>,
}

impl TripRequest {
    #[must_use]
    pub fn new(destination: DestinationRef, start_date: NaiveDate, days: u32) -> Self {
        Self {
            destination,
            start_date,
            days,
            currency: None,
            budget: None,
            provider: None,
        }
    }

    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    #[must_use]
    pub fn with_budget(mut self, budget: f64) -> Self {
        self.budget = Some(budget);
        self
    }

    #[must_use]
    pub fn with_provider(mut self, provider: PlacesProviderKind) -> Self {
        self.provider = Some(provider);
        self
    }

    fn validate(&self) -> Result<()> {
        if !(1..=MAX_TRIP_DAYS).contains(&self.days) {
            return Err(TripPlannerError::validation(format!(
                "Trip length must be between 1 and {MAX_TRIP_DAYS} days, got {}",
                self.days
            )));
        }
        if let Some(budget) = self.budget {
            if !budget.is_finite() || budget < 0.0 {
                return Err(TripPlannerError::validation(format!(
                    "Budget must be a non-negative amount, got {budget}"
                )));
            }
        }
        Ok(())
    }
}

/// Planning facade over the places, weather and currency services
pub struct TripPlanner {
    places: Arc<dyn PlaceResolver>,
    weather: Arc<dyn WeatherProvider>,
    planner: ItineraryPlanner,
    default_currency: String,
}

impl std::fmt::Debug for TripPlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TripPlanner")
            .field("planner", &self.planner)
            .field("default_currency", &self.default_currency)
            .finish_non_exhaustive()
    }
}

impl TripPlanner {
    /// Assemble a planner from explicit collaborators
    pub fn new(
        places: Arc<dyn PlaceResolver>,
        weather: Arc<dyn WeatherProvider>,
        planner: ItineraryPlanner,
        default_currency: impl Into<String>,
    ) -> Self {
        Self {
            places,
            weather,
            planner,
            default_currency: default_currency.into(),
        }
    }

    /// Build the live services described by `config`
    pub fn from_config(config: &PlannerConfig) -> Result<Self> {
        let rates = Arc::new(CurrencyService::new(&config.currency)?);
        let places = Arc::new(PlacesService::new(&config.places)?);
        let weather = Arc::new(WeatherService::new(&config.weather)?);

        let mut planner = ItineraryPlanner::new(rates).with_attractions(places.clone());
        if let Some(seed) = config.planner.seed {
            planner = planner.with_seed(seed);
        }

        Ok(Self::new(places, weather, planner, &config.planner.default_currency))
    }

    async fn resolve(&self, request: &TripRequest) -> Result<Destination> {
        let place_id = match &request.destination {
            DestinationRef::PlaceId(id) => id.clone(),
            DestinationRef::Query(query) => {
                let suggestions = self.places.search(query, request.provider).await;
                let first = suggestions.into_iter().next().ok_or_else(|| {
                    TripPlannerError::validation(format!("No destination found for '{query}'"))
                })?;
                debug!("Resolved '{}' to {}", query, first.description);
                first.place_id
            }
        };
        Ok(self.places.details(&place_id, request.provider).await)
    }

    /// Plan a complete trip. Only invalid input is an error; upstream
    /// failures degrade to fallback data.
    #[instrument(skip(self), fields(days = request.days))]
    pub async fn plan(&self, request: &TripRequest) -> Result<Itinerary> {
        request.validate()?;
        let currency = request
            .currency
            .as_deref()
            .unwrap_or(self.default_currency.as_str())
            .trim()
            .to_uppercase();
        currency::validate_currency_code(&currency)?;

        let destination = self.resolve(request).await?;
        info!(
            "Planning {} days in {} ({:.4}, {:.4})",
            request.days, destination.name, destination.lat, destination.lng
        );

        let forecast = self
            .weather
            .forecast(destination.lat, destination.lng, request.days)
            .await;
        let input = DestinationInput::Resolved(destination.clone());
        let day_plans = self
            .planner
            .generate_itinerary(
                &input,
                request.start_date,
                request.days,
                &forecast,
                &currency,
                request.provider,
                request.budget,
            )
            .await;

        let total_cost = round_to_cents(day_plans.iter().map(|day| day.total_cost).sum());
        let over_budget = request.budget.is_some_and(|budget| total_cost > budget);

        Ok(Itinerary {
            destination,
            start_date: request.start_date,
            end_date: request.start_date + Duration::days(i64::from(request.days - 1)),
            days: request.days,
            budget: request.budget,
            currency_symbol: currency::currency_symbol(&currency).to_string(),
            currency,
            day_plans,
            total_cost,
            over_budget,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CurrencyRate, PlaceSuggestion, WeatherCondition, WeatherSnapshot};
    use crate::providers::ExchangeRateProvider;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct OnePlace {
        searched: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PlaceResolver for OnePlace {
        async fn search(&self, query: &str, _: Option<PlacesProviderKind>) -> Vec<PlaceSuggestion> {
            self.searched
                .lock()
                .unwrap()
                .push(query.to_string());
            if query.len() < 2 {
                return Vec::new();
            }
            vec![PlaceSuggestion::from_display_name("lisbon_1", "Lisbon, Portugal")]
        }

        async fn details(&self, place_id: &str, _: Option<PlacesProviderKind>) -> Destination {
            Destination::new(place_id, "Lisbon", "Lisbon, Portugal", 38.72, -9.14)
        }
    }

    struct SunnyWeather;

    #[async_trait]
    impl WeatherProvider for SunnyWeather {
        async fn forecast(&self, _: f64, _: f64, days: u32) -> Vec<WeatherSnapshot> {
            (0..days)
                .map(|_| WeatherSnapshot::new(WeatherCondition::Clear, "Clear sky", 24.0))
                .collect()
        }
    }

    struct Parity;

    #[async_trait]
    impl ExchangeRateProvider for Parity {
        async fn exchange_rate(&self, from: &str, to: &str) -> CurrencyRate {
            CurrencyRate {
                from: from.to_string(),
                to: to.to_string(),
                rate: 1.0,
                symbol: currency::currency_symbol(to).to_string(),
            }
        }
    }

    fn trip_planner() -> (TripPlanner, Arc<OnePlace>) {
        let places = Arc::new(OnePlace {
            searched: Mutex::new(Vec::new()),
        });
        let planner = ItineraryPlanner::new(Arc::new(Parity)).with_seed(3);
        (
            TripPlanner::new(places.clone(), Arc::new(SunnyWeather), planner, "EUR"),
            places,
        )
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
    }

    #[tokio::test]
    async fn test_plan_assembles_itinerary() {
        let (planner, places) = trip_planner();
        let request = TripRequest::new(DestinationRef::Query("Lisbon".into()), start(), 3);

        let itinerary = planner.plan(&request).await.unwrap();

        assert_eq!(places.searched.lock().unwrap().as_slice(), ["Lisbon"]);
        assert_eq!(itinerary.destination.place_id, "lisbon_1");
        assert_eq!(itinerary.day_plans.len(), 3);
        assert_eq!(itinerary.end_date, NaiveDate::from_ymd_opt(2025, 9, 3).unwrap());
        assert_eq!(itinerary.currency, "EUR");
        assert_eq!(itinerary.currency_symbol, "€");
        let sum: f64 = itinerary.day_plans.iter().map(|day| day.total_cost).sum();
        assert_eq!(itinerary.total_cost, round_to_cents(sum));
        assert!(!itinerary.over_budget);
    }

    #[tokio::test]
    async fn test_place_id_skips_search() {
        let (planner, places) = trip_planner();
        let request = TripRequest::new(DestinationRef::PlaceId("known".into()), start(), 1)
            .with_currency(" usd ");

        let itinerary = planner.plan(&request).await.unwrap();

        assert!(places.searched.lock().unwrap().is_empty());
        assert_eq!(itinerary.destination.place_id, "known");
        assert_eq!(itinerary.currency, "USD");
        assert_eq!(itinerary.start_date, itinerary.end_date);
    }

    #[tokio::test]
    async fn test_zero_budget_is_flagged_not_rejected() {
        let (planner, _) = trip_planner();
        let request =
            TripRequest::new(DestinationRef::Query("Lisbon".into()), start(), 2).with_budget(0.0);

        let itinerary = planner.plan(&request).await.unwrap();
        assert_eq!(itinerary.budget, Some(0.0));
        assert_eq!(itinerary.over_budget, itinerary.total_cost > 0.0);
    }

    #[rstest::rstest]
    #[case(0, None, None)]
    #[case(31, None, None)]
    #[case(3, Some("EURO"), None)]
    #[case(3, None, Some(-5.0))]
    #[tokio::test]
    async fn test_invalid_requests_are_rejected(
        #[case] days: u32,
        #[case] currency: Option<&str>,
        #[case] budget: Option<f64>,
    ) {
        let (planner, _) = trip_planner();
        let mut request = TripRequest::new(DestinationRef::Query("Lisbon".into()), start(), days);
        request.currency = currency.map(str::to_string);
        request.budget = budget;

        let err = planner.plan(&request).await.unwrap_err();
        assert!(matches!(err, TripPlannerError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_unresolvable_query_is_an_error() {
        let (planner, _) = trip_planner();
        let request = TripRequest::new(DestinationRef::Query("x".into()), start(), 2);
        assert!(planner.plan(&request).await.is_err());
    }
}
