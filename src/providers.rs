//! Seams between the itinerary engine and the services it depends on.
//!
//! The engine never talks HTTP itself. It asks these traits for exchange
//! rates, attractions and forecasts, and every implementation is expected to
//! absorb its own failures: either by answering with fallback data or, for
//! best-effort feeds, by returning [`Fetched::Fallback`] with a reason.

use async_trait::async_trait;

use crate::models::{
    Attraction, CurrencyRate, Destination, PlaceSuggestion, PlacesProviderKind, WeatherSnapshot,
};

/// Outcome of a best-effort upstream fetch
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    /// Data came from the live service
    Live(T),
    /// The service could not deliver; the caller should use its own fallback
    Fallback(String),
}

impl<T> Fetched<T> {
    #[must_use]
    pub fn is_live(&self) -> bool {
        matches!(self, Fetched::Live(_))
    }

    /// Live data, or `None` when the caller has to fall back
    pub fn into_live(self) -> Option<T> {
        match self {
            Fetched::Live(value) => Some(value),
            Fetched::Fallback(_) => None,
        }
    }
}

/// Exchange-rate collaborator
#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    /// Rate and display symbol for converting `from` into `to`. Never fails;
    /// implementations degrade to built-in rates.
    async fn exchange_rate(&self, from: &str, to: &str) -> CurrencyRate;
}

/// Points-of-interest collaborator
#[async_trait]
pub trait AttractionProvider: Send + Sync {
    async fn attractions(
        &self,
        destination: &Destination,
        provider: Option<PlacesProviderKind>,
        limit: usize,
    ) -> Fetched<Vec<Attraction>>;
}

/// Geocoding collaborator
#[async_trait]
pub trait PlaceResolver: Send + Sync {
    async fn search(&self, query: &str, provider: Option<PlacesProviderKind>)
    -> Vec<PlaceSuggestion>;

    async fn details(&self, place_id: &str, provider: Option<PlacesProviderKind>) -> Destination;
}

/// Forecast collaborator
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// One snapshot per requested day
    async fn forecast(&self, lat: f64, lng: f64, days: u32) -> Vec<WeatherSnapshot>;
}
