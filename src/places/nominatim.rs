//! OpenStreetMap backend: Nominatim for geocoding, Overpass for attractions.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use super::PlacesBackend;
use crate::config::PlacesConfig;
use crate::http;
use crate::models::{
    ActivityCategory, Attraction, Destination, PlaceSuggestion, PlacesProviderKind,
};
use crate::planner::classifier::is_all_digits;
use crate::{Result, TripPlannerError};

/// OSM `tourism` values requested from Overpass
const TOURISM_TAGS: &str = "attraction|museum|gallery|viewpoint|theme_park|zoo|aquarium|artwork|castle|monument|memorial|ruins|park|garden";

const SEARCH_LIMIT: u32 = 6;

/// Nominatim search/lookup result
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    /// Numeric in practice, but some mirrors return a string
    place_id: Value,
    display_name: String,
    lat: Option<String>,
    lon: Option<String>,
    address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    name: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    county: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(default)]
    tags: HashMap<String, String>,
}

impl NominatimPlace {
    fn id(&self) -> String {
        match &self.place_id {
            Value::String(id) => id.clone(),
            other => other.to_string(),
        }
    }

    fn coordinates(&self) -> Option<(f64, f64)> {
        let lat = self.lat.as_deref()?.parse().ok()?;
        let lng = self.lon.as_deref()?.parse().ok()?;
        Some((lat, lng))
    }

    /// Most specific non-numeric name: address details first, then the
    /// first meaningful component of the display name.
    fn best_name(&self) -> String {
        let from_address = self.address.as_ref().and_then(|address| {
            [
                &address.name,
                &address.city,
                &address.town,
                &address.village,
                &address.municipality,
                &address.county,
            ]
            .into_iter()
            .flatten()
            .find(|name| !name.is_empty())
            .cloned()
        });

        match from_address {
            Some(name) if !is_all_digits(&name) => name,
            _ => self
                .display_name
                .split(',')
                .map(str::trim)
                .find(|part| !part.is_empty() && !is_all_digits(part))
                .unwrap_or(self.display_name.as_str())
                .to_string(),
        }
    }

    fn into_suggestion(self) -> PlaceSuggestion {
        let coordinates = self.coordinates();
        let mut suggestion = PlaceSuggestion::from_display_name(self.id(), &self.display_name);
        suggestion.lat = coordinates.map(|(lat, _)| lat);
        suggestion.lng = coordinates.map(|(_, lng)| lng);
        suggestion.provider = Some(PlacesProviderKind::Nominatim);
        suggestion
    }
}

/// Map an OSM `tourism` tag value to an activity category
#[must_use]
pub fn category_for_tourism(tourism: &str) -> ActivityCategory {
    fn contains_any(haystack: &str, keys: &[&str]) -> bool {
        keys.iter().any(|key| haystack.contains(key))
    }

    let tourism = tourism.to_lowercase();
    if contains_any(&tourism, &["museum", "gallery", "artwork", "castle", "monument", "memorial", "ruins"]) {
        ActivityCategory::Cultural
    } else if contains_any(&tourism, &["viewpoint", "park", "garden"]) && !tourism.contains("theme_park") {
        ActivityCategory::Outdoor
    } else {
        ActivityCategory::Sightseeing
    }
}

fn overpass_query(destination: &Destination, radius_m: u32, limit: usize) -> String {
    let around = format!("(around:{radius_m},{},{})", destination.lat, destination.lng);
    format!(
        "[out:json][timeout:25];(node[\"tourism\"~\"{TOURISM_TAGS}\"]{around};way[\"tourism\"~\"{TOURISM_TAGS}\"]{around};relation[\"tourism\"~\"{TOURISM_TAGS}\"]{around};);out center {limit};"
    )
}

/// Nominatim + Overpass client
#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: Client,
    base_url: String,
    overpass_url: String,
    radius_m: u32,
}

impl NominatimClient {
    pub fn new(config: &PlacesConfig) -> Result<Self> {
        Ok(Self {
            client: http::client(config.timeout(), &config.user_agent)?,
            base_url: config.nominatim_url.trim_end_matches('/').to_string(),
            overpass_url: config.overpass_url.clone(),
            radius_m: config.search_radius_m,
        })
    }
}

#[async_trait]
impl PlacesBackend for NominatimClient {
    fn kind(&self) -> PlacesProviderKind {
        PlacesProviderKind::Nominatim
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<PlaceSuggestion>> {
        let url = format!(
            "{}/search?q={}&format=json&addressdetails=1&limit={SEARCH_LIMIT}",
            self.base_url,
            urlencoding::encode(query)
        );
        let places: Vec<NominatimPlace> = http::fetch_json(self.client.get(url), "Nominatim").await?;

        debug!("Nominatim returned {} places", places.len());
        Ok(places.into_iter().map(NominatimPlace::into_suggestion).collect())
    }

    #[instrument(skip(self))]
    async fn details(&self, place_id: &str) -> Result<Destination> {
        let url = format!(
            "{}/lookup?place_ids={}&format=json&addressdetails=1",
            self.base_url,
            urlencoding::encode(place_id)
        );
        let places: Vec<NominatimPlace> = http::fetch_json(self.client.get(url), "Nominatim").await?;

        let place = places
            .into_iter()
            .next()
            .ok_or_else(|| TripPlannerError::api(format!("Place {place_id} not found in Nominatim response")))?;
        let (lat, lng) = place
            .coordinates()
            .ok_or_else(|| TripPlannerError::api(format!("Place {place_id} has no coordinates")))?;

        Ok(Destination::new(place.id(), place.best_name(), &place.display_name, lat, lng))
    }

    #[instrument(skip(self, destination), fields(destination = %destination.name))]
    async fn attractions(&self, destination: &Destination, limit: usize) -> Result<Vec<Attraction>> {
        let query = overpass_query(destination, self.radius_m, limit);
        let request = self.client.post(&self.overpass_url).form(&[("data", query)]);
        let response: OverpassResponse = http::fetch_json(request, "Overpass").await?;

        let attractions: Vec<Attraction> = response
            .elements
            .into_iter()
            .filter_map(|element| {
                let name = element.tags.get("name").filter(|name| !name.is_empty())?;
                let tourism = element.tags.get("tourism").map_or("", String::as_str);
                let description = element
                    .tags
                    .get("description")
                    .or_else(|| element.tags.get("name:en"))
                    .cloned()
                    .unwrap_or_else(|| format!("{tourism} in {}", destination.name));

                Some(Attraction {
                    name: name.clone(),
                    description,
                    category: category_for_tourism(tourism),
                })
            })
            .collect();

        debug!("Overpass returned {} named attractions", attractions.len());
        Ok(attractions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("museum", ActivityCategory::Cultural)]
    #[case("gallery", ActivityCategory::Cultural)]
    #[case("ruins", ActivityCategory::Cultural)]
    #[case("viewpoint", ActivityCategory::Outdoor)]
    #[case("garden", ActivityCategory::Outdoor)]
    #[case("theme_park", ActivityCategory::Sightseeing)]
    #[case("zoo", ActivityCategory::Sightseeing)]
    #[case("", ActivityCategory::Sightseeing)]
    fn test_category_for_tourism(#[case] tag: &str, #[case] expected: ActivityCategory) {
        assert_eq!(category_for_tourism(tag), expected);
    }

    fn place(json: serde_json::Value) -> NominatimPlace {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_best_name_prefers_address_details() {
        let p = place(serde_json::json!({
            "place_id": 88,
            "display_name": "Innere Stadt, Wien, Österreich",
            "lat": "48.2", "lon": "16.37",
            "address": {"city": "Wien", "county": "Wien"}
        }));
        assert_eq!(p.best_name(), "Wien");
        assert_eq!(p.id(), "88");
    }

    #[test]
    fn test_best_name_skips_house_numbers() {
        let p = place(serde_json::json!({
            "place_id": "x1",
            "display_name": "221, Baker Street, London, United Kingdom",
            "address": {"name": "221"}
        }));
        assert_eq!(p.best_name(), "Baker Street");
        assert_eq!(p.coordinates(), None);
    }

    #[test]
    fn test_suggestion_carries_coordinates() {
        let suggestion = place(serde_json::json!({
            "place_id": 7,
            "display_name": "Kyoto, Japan",
            "lat": "35.01", "lon": "135.76"
        }))
        .into_suggestion();

        assert_eq!(suggestion.main_text, "Kyoto");
        assert_eq!(suggestion.lat, Some(35.01));
        assert_eq!(suggestion.provider, Some(PlacesProviderKind::Nominatim));
    }

    #[test]
    fn test_overpass_query_shape() {
        let destination = Destination::new("1", "Rome", "Rome, Italy", 41.9, 12.5);
        let query = overpass_query(&destination, 10_000, 12);
        assert!(query.starts_with("[out:json]"));
        assert!(query.contains("(around:10000,41.9,12.5)"));
        assert!(query.ends_with("out center 12;"));
    }
}
