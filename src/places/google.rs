//! Google Places backend (autocomplete, details, nearby and text search).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::PlacesBackend;
use crate::config::PlacesConfig;
use crate::http;
use crate::models::{ActivityCategory, Attraction, Destination, PlaceSuggestion, PlacesProviderKind};
use crate::{Result, TripPlannerError};

/// Text searches run after the nearby search, in order, until the limit is hit
const TEXT_SEARCHES: [&str; 3] = ["museums", "parks", "landmarks"];

#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    place_id: String,
    description: String,
    structured_formatting: Option<StructuredFormatting>,
}

#[derive(Debug, Deserialize)]
struct StructuredFormatting {
    main_text: Option<String>,
    secondary_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    result: Option<PlaceResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<PlaceResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    place_id: Option<String>,
    name: Option<String>,
    formatted_address: Option<String>,
    vicinity: Option<String>,
    geometry: Option<Geometry>,
    #[serde(default)]
    types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Google reports quota and key problems in the body with a 200 status
fn reject_error_message(error_message: Option<String>) -> Result<()> {
    match error_message {
        Some(message) => Err(TripPlannerError::api(format!("Google Places: {message}"))),
        None => Ok(()),
    }
}

impl Prediction {
    fn into_suggestion(self) -> PlaceSuggestion {
        let mut suggestion = PlaceSuggestion::from_display_name(self.place_id, &self.description);
        if let Some(formatting) = self.structured_formatting {
            if let Some(main) = formatting.main_text.filter(|text| !text.is_empty()) {
                suggestion.main_text = main;
            }
            if let Some(secondary) = formatting.secondary_text.filter(|text| !text.is_empty()) {
                suggestion.secondary_text = secondary;
            }
        }
        suggestion.provider = Some(PlacesProviderKind::Google);
        suggestion
    }
}

/// Google Places web service client
#[derive(Debug, Clone)]
pub struct GooglePlacesClient {
    client: Client,
    base_url: String,
    api_key: String,
    radius_m: u32,
}

impl GooglePlacesClient {
    pub fn new(config: &PlacesConfig, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http::client(config.timeout(), &config.user_agent)?,
            base_url: config.google_places_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            radius_m: config.search_radius_m,
        })
    }

    fn url(&self, endpoint: &str, params: &[(&str, &str)]) -> String {
        let mut url = format!("{}/{endpoint}/json?key={}", self.base_url, urlencoding::encode(&self.api_key));
        for (name, value) in params {
            url.push('&');
            url.push_str(name);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    async fn search_results(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Vec<PlaceResult>> {
        let response: SearchResponse =
            http::fetch_json(self.client.get(self.url(endpoint, params)), "Google Places").await?;
        reject_error_message(response.error_message)?;
        Ok(response.results)
    }
}

#[async_trait]
impl PlacesBackend for GooglePlacesClient {
    fn kind(&self) -> PlacesProviderKind {
        PlacesProviderKind::Google
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<PlaceSuggestion>> {
        let url = self.url("autocomplete", &[("input", query), ("types", "(cities)")]);
        let response: AutocompleteResponse = http::fetch_json(self.client.get(url), "Google Places").await?;
        reject_error_message(response.error_message)?;

        Ok(response
            .predictions
            .into_iter()
            .map(Prediction::into_suggestion)
            .collect())
    }

    #[instrument(skip(self))]
    async fn details(&self, place_id: &str) -> Result<Destination> {
        let url = self.url(
            "details",
            &[("place_id", place_id), ("fields", "place_id,name,formatted_address,geometry")],
        );
        let response: DetailsResponse = http::fetch_json(self.client.get(url), "Google Places").await?;
        reject_error_message(response.error_message)?;

        let result = response
            .result
            .ok_or_else(|| TripPlannerError::api(format!("Place {place_id} not found in Google Places response")))?;
        let location = result
            .geometry
            .map(|geometry| geometry.location)
            .ok_or_else(|| TripPlannerError::api(format!("Place {place_id} has no geometry")))?;

        Ok(Destination::new(
            result.place_id.unwrap_or_else(|| place_id.to_string()),
            result.name.unwrap_or_default(),
            result.formatted_address.unwrap_or_default(),
            location.lat,
            location.lng,
        ))
    }

    #[instrument(skip(self, destination), fields(destination = %destination.name))]
    async fn attractions(&self, destination: &Destination, limit: usize) -> Result<Vec<Attraction>> {
        let location = format!("{},{}", destination.lat, destination.lng);
        let radius = self.radius_m.to_string();
        let mut attractions = Vec::new();

        let nearby = self
            .search_results(
                "nearbysearch",
                &[("location", location.as_str()), ("radius", radius.as_str()), ("type", "tourist_attraction")],
            )
            .await?;
        for place in nearby {
            if attractions.len() >= limit {
                break;
            }
            let Some(name) = place.name else { continue };
            attractions.push(Attraction {
                name,
                description: place
                    .vicinity
                    .or(place.formatted_address)
                    .unwrap_or_else(|| format!("Attraction in {}", destination.name)),
                category: ActivityCategory::Sightseeing,
            });
        }

        for topic in TEXT_SEARCHES {
            if attractions.len() >= limit {
                break;
            }
            let query = format!("{topic} in {}", destination.name);
            let found = self
                .search_results(
                    "textsearch",
                    &[("query", query.as_str()), ("location", location.as_str()), ("radius", radius.as_str())],
                )
                .await?;
            for place in found {
                if attractions.len() >= limit {
                    break;
                }
                let Some(name) = place.name else { continue };
                let cultural = place
                    .types
                    .iter()
                    .any(|kind| kind.contains("museum") || kind.contains("art_gallery"));
                attractions.push(Attraction {
                    name,
                    description: place
                        .formatted_address
                        .unwrap_or_else(|| format!("Place in {}", destination.name)),
                    category: if cultural {
                        ActivityCategory::Cultural
                    } else {
                        ActivityCategory::Sightseeing
                    },
                });
            }
        }

        debug!("Google Places returned {} attractions", attractions.len());
        Ok(attractions)
    }
}
