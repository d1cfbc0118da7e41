//! Data models for the trip planner
//!
//! This module contains the core domain models organized by concern:
//! - Destination: resolved places, place suggestions and attractions
//! - Weather: the per-day weather snapshot
//! - Activity: a single planned activity
//! - Itinerary: day plans, the full trip and currency rates

pub mod activity;
pub mod destination;
pub mod itinerary;
pub mod weather;

// Re-export all public types for convenient access
pub use activity::{Activity, ActivityCategory};
pub use destination::{Attraction, Destination, DestinationInput, PlaceSuggestion, PlacesProviderKind};
pub use itinerary::{CurrencyRate, DayPlan, Itinerary};
pub use weather::{WeatherCondition, WeatherSnapshot};
