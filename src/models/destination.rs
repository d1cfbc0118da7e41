//! Destination model and place-search result types

use serde::{Deserialize, Serialize};

use super::ActivityCategory;

/// A resolved travel destination
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Destination {
    /// Provider-specific place identifier
    pub place_id: String,
    /// Display name (city, landmark, region)
    pub name: String,
    /// Full comma-separated address as returned by the geocoder
    pub formatted_address: String,
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lng: f64,
}

impl Destination {
    /// Create a new destination
    #[must_use]
    pub fn new(
        place_id: impl Into<String>,
        name: impl Into<String>,
        formatted_address: impl Into<String>,
        lat: f64,
        lng: f64,
    ) -> Self {
        Self {
            place_id: place_id.into(),
            name: name.into(),
            formatted_address: formatted_address.into(),
            lat,
            lng,
        }
    }

    /// Address components, trimmed, in their original order
    #[must_use]
    pub fn address_parts(&self) -> Vec<&str> {
        self.formatted_address.split(',').map(str::trim).collect()
    }

    /// Last address component, usually the country
    #[must_use]
    pub fn country(&self) -> &str {
        self.address_parts().last().copied().unwrap_or_default()
    }

    /// Round coordinates for cache key generation
    #[must_use]
    pub fn rounded_coordinates(&self, precision: u32) -> (f64, f64) {
        let multiplier = 10_f64.powi(i32::try_from(precision).unwrap_or(4));
        let lat = (self.lat * multiplier).round() / multiplier;
        let lng = (self.lng * multiplier).round() / multiplier;
        (lat, lng)
    }
}

/// What the planner is told about where the traveller is going.
///
/// A bare name is enough for heuristic planning; live attraction data needs
/// the coordinates of a resolved destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DestinationInput {
    Name(String),
    Resolved(Destination),
}

impl DestinationInput {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            DestinationInput::Name(name) => name,
            DestinationInput::Resolved(destination) => &destination.name,
        }
    }

    /// Formatted address, empty for a bare name
    #[must_use]
    pub fn address(&self) -> &str {
        match self {
            DestinationInput::Name(_) => "",
            DestinationInput::Resolved(destination) => &destination.formatted_address,
        }
    }

    #[must_use]
    pub fn resolved(&self) -> Option<&Destination> {
        match self {
            DestinationInput::Name(_) => None,
            DestinationInput::Resolved(destination) => Some(destination),
        }
    }
}

impl From<Destination> for DestinationInput {
    fn from(destination: Destination) -> Self {
        DestinationInput::Resolved(destination)
    }
}

impl From<&str> for DestinationInput {
    fn from(name: &str) -> Self {
        DestinationInput::Name(name.to_string())
    }
}

/// Which places backend answered (or should answer) a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacesProviderKind {
    Nominatim,
    Google,
}

impl PlacesProviderKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PlacesProviderKind::Nominatim => "nominatim",
            PlacesProviderKind::Google => "google",
        }
    }
}

impl std::str::FromStr for PlacesProviderKind {
    type Err = crate::TripPlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nominatim" | "osm" => Ok(PlacesProviderKind::Nominatim),
            "google" => Ok(PlacesProviderKind::Google),
            other => Err(crate::TripPlannerError::validation(format!(
                "Unknown places provider '{other}'. Must be one of: nominatim, google"
            ))),
        }
    }
}

/// One autocomplete suggestion from a place search
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlaceSuggestion {
    pub place_id: String,
    /// Full description, e.g. "Paris, Île-de-France, France"
    pub description: String,
    /// Leading component of the description
    pub main_text: String,
    /// Remaining components joined with ", "
    pub secondary_text: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub provider: Option<PlacesProviderKind>,
}

impl PlaceSuggestion {
    /// Build a suggestion from a comma-separated display name
    #[must_use]
    pub fn from_display_name(place_id: impl Into<String>, display_name: &str) -> Self {
        let parts: Vec<&str> = display_name.split(',').map(str::trim).collect();
        Self {
            place_id: place_id.into(),
            description: display_name.to_string(),
            main_text: parts.first().copied().unwrap_or(display_name).to_string(),
            secondary_text: parts.get(1..).map(|rest| rest.join(", ")).unwrap_or_default(),
            lat: None,
            lng: None,
            provider: None,
        }
    }
}

/// A real-world point of interest from the places collaborator
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Attraction {
    pub name: String,
    pub description: String,
    pub category: ActivityCategory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_country() {
        let destination = Destination::new("1", "Lyon", "Lyon, Rhône, France", 45.76, 4.84);
        assert_eq!(destination.country(), "France");
        assert_eq!(destination.address_parts(), vec!["Lyon", "Rhône", "France"]);
    }

    #[test]
    fn test_destination_rounded_coordinates() {
        let destination = Destination::new("1", "Test", "Test", 48.856_613, 2.352_222);
        let (lat, lng) = destination.rounded_coordinates(2);
        assert_eq!(lat, 48.86);
        assert_eq!(lng, 2.35);
    }

    #[test]
    fn test_suggestion_from_display_name() {
        let suggestion = PlaceSuggestion::from_display_name("42", "Paris, Île-de-France, France");
        assert_eq!(suggestion.main_text, "Paris");
        assert_eq!(suggestion.secondary_text, "Île-de-France, France");
    }

    #[test]
    fn test_suggestion_single_component() {
        let suggestion = PlaceSuggestion::from_display_name("7", "Atlantis");
        assert_eq!(suggestion.main_text, "Atlantis");
        assert_eq!(suggestion.secondary_text, "");
    }

    #[test]
    fn test_destination_input_accessors() {
        let named = DestinationInput::from("Paris");
        assert_eq!(named.name(), "Paris");
        assert_eq!(named.address(), "");
        assert!(named.resolved().is_none());

        let resolved: DestinationInput =
            Destination::new("p", "Paris", "Paris, France", 48.85, 2.35).into();
        assert_eq!(resolved.address(), "Paris, France");
        assert!(resolved.resolved().is_some());
    }

    #[test]
    fn test_provider_kind_parsing() {
        assert_eq!(
            "Google".parse::<PlacesProviderKind>().unwrap(),
            PlacesProviderKind::Google
        );
        assert_eq!(
            "nominatim".parse::<PlacesProviderKind>().unwrap(),
            PlacesProviderKind::Nominatim
        );
        assert!("bing".parse::<PlacesProviderKind>().is_err());
    }
}
