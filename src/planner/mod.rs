//! Itinerary synthesis: classify the destination, pick weather-appropriate
//! activities, price them and assemble day plans.

pub mod assembler;
pub mod catalog;
pub mod classifier;
pub mod partition;
pub mod pricing;
pub mod weather_filter;

pub use assembler::ItineraryPlanner;
pub use classifier::{Continent, GeoContext};
pub use pricing::AFFORDABILITY_SCALE;
pub use weather_filter::{MAX_ACTIVITIES_PER_DAY, select_for_weather};
