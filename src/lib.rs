//! `TripPlanner` - weather-aware, budget-conscious itinerary synthesis
//!
//! This library resolves a destination, gathers forecasts, exchange rates and
//! points of interest from third-party services, and turns them into a
//! day-by-day plan of activities priced in the traveller's currency.

pub mod cache;
pub mod config;
pub mod currency;
pub mod error;
pub mod http;
pub mod logging;
pub mod models;
pub mod places;
pub mod planner;
pub mod providers;
pub mod trip;
pub mod weather;

// Re-export core types for public API
pub use cache::{Clock, ManualClock, SystemClock, TtlCache};
pub use config::PlannerConfig;
pub use currency::{CurrencyService, ExchangeRateApiClient, format_currency};
pub use error::TripPlannerError;
pub use models::{
    Activity, ActivityCategory, Attraction, CurrencyRate, DayPlan, Destination, DestinationInput,
    Itinerary, PlaceSuggestion, PlacesProviderKind, WeatherCondition, WeatherSnapshot,
};
pub use places::PlacesService;
pub use planner::ItineraryPlanner;
pub use providers::{AttractionProvider, ExchangeRateProvider, Fetched, PlaceResolver, WeatherProvider};
pub use trip::{DestinationRef, TripPlanner, TripRequest};
pub use weather::WeatherService;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TripPlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
