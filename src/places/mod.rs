//! Place search, place details and attraction lookup.
//!
//! [`PlacesService`] picks a backend per request (Google only when a key is
//! configured), caches search and details results, and answers with built-in
//! mock places whenever a backend is disabled or fails.

pub mod google;
pub mod nominatim;

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::cache::{Clock, SystemClock, TtlCache};
use crate::config::PlacesConfig;
use crate::models::{Attraction, Destination, PlaceSuggestion, PlacesProviderKind};
use crate::providers::{AttractionProvider, Fetched, PlaceResolver};
use crate::Result;

pub use google::GooglePlacesClient;
pub use nominatim::NominatimClient;

/// Queries shorter than this are not sent anywhere
const MIN_QUERY_CHARS: usize = 2;

/// Coordinates used for mock places nobody has heard of
const MOCK_DEFAULT_COORDINATES: (f64, f64) = (48.8566, 2.3522);

/// (search keyword, place id, main text, secondary text, lat, lng)
const MOCK_PLACES: &[(&str, &str, &str, &str, f64, f64)] = &[
    ("paris", "paris_france", "Paris", "France", 48.8566, 2.3522),
    ("tokyo", "tokyo_japan", "Tokyo", "Japan", 35.6762, 139.6503),
    ("new york", "new_york_usa", "New York", "USA", 40.7128, -74.0060),
    ("london", "london_uk", "London", "UK", 51.5074, -0.1278),
];

/// One geocoding/points-of-interest provider
#[async_trait]
pub trait PlacesBackend: Send + Sync {
    fn kind(&self) -> PlacesProviderKind;

    async fn search(&self, query: &str) -> Result<Vec<PlaceSuggestion>>;

    async fn details(&self, place_id: &str) -> Result<Destination>;

    /// Up to `limit` named attractions around the destination
    async fn attractions(&self, destination: &Destination, limit: usize) -> Result<Vec<Attraction>>;
}

/// Suggestions for a query when no backend can answer
#[must_use]
pub fn mock_suggestions(query: &str) -> Vec<PlaceSuggestion> {
    let lower = query.to_lowercase();
    if let Some((_, id, main, secondary, ..)) =
        MOCK_PLACES.iter().find(|(keyword, ..)| lower.contains(keyword))
    {
        return vec![PlaceSuggestion::from_display_name(*id, &format!("{main}, {secondary}"))];
    }

    let id = format!("{}_mock", lower.split_whitespace().collect::<Vec<_>>().join("_"));
    let mut generic = PlaceSuggestion::from_display_name(id, query);
    generic.main_text = query.to_string();
    generic.secondary_text = "Location".to_string();
    vec![generic]
}

/// Details for a place id when no backend can answer
#[must_use]
pub fn mock_details(place_id: &str) -> Destination {
    if let Some((_, id, main, secondary, lat, lng)) =
        MOCK_PLACES.iter().find(|(_, id, ..)| *id == place_id)
    {
        return Destination::new(*id, *main, format!("{main}, {secondary}"), *lat, *lng);
    }

    let spaced = place_id.replace('_', " ");
    let name = spaced.split(' ').next().unwrap_or_default().to_string();
    let (lat, lng) = MOCK_DEFAULT_COORDINATES;
    Destination::new(place_id, name, place_id.replace('_', ", "), lat, lng)
}

/// Case-insensitive de-duplication by name, keeping first occurrences, capped at `limit`
#[must_use]
pub fn dedupe_attractions(attractions: Vec<Attraction>, limit: usize) -> Vec<Attraction> {
    let mut seen = HashSet::new();
    attractions
        .into_iter()
        .filter(|attraction| seen.insert(attraction.name.to_lowercase()))
        .take(limit)
        .collect()
}

/// Place lookups with provider selection, caching and mock fallbacks
pub struct PlacesService {
    enabled: bool,
    default_provider: PlacesProviderKind,
    nominatim: Arc<dyn PlacesBackend>,
    google: Option<Arc<dyn PlacesBackend>>,
    search_cache: TtlCache<Vec<PlaceSuggestion>>,
    details_cache: TtlCache<Destination>,
    /// Nominatim suggestions with coordinates, by place id
    known_places: Mutex<HashMap<String, PlaceSuggestion>>,
}

impl std::fmt::Debug for PlacesService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacesService")
            .field("enabled", &self.enabled)
            .field("default_provider", &self.default_provider)
            .field("google", &self.google.is_some())
            .finish_non_exhaustive()
    }
}

impl PlacesService {
    pub fn new(config: &PlacesConfig) -> Result<Self> {
        let nominatim: Arc<dyn PlacesBackend> = Arc::new(NominatimClient::new(config)?);
        let google: Option<Arc<dyn PlacesBackend>> = match config.google_key() {
            Some(key) => Some(Arc::new(GooglePlacesClient::new(config, key)?)),
            None => None,
        };
        if config.provider == PlacesProviderKind::Google && google.is_none() {
            info!("Google Places requested without an API key, using Nominatim");
        }

        Ok(Self::with_backends(config, nominatim, google, Arc::new(SystemClock)))
    }

    #[must_use]
    pub fn with_backends(
        config: &PlacesConfig,
        nominatim: Arc<dyn PlacesBackend>,
        google: Option<Arc<dyn PlacesBackend>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let ttl = chrono::Duration::minutes(config.cache_ttl_minutes.into());
        Self {
            enabled: config.enabled,
            default_provider: config.provider,
            nominatim,
            google,
            search_cache: TtlCache::with_clock("place_search", ttl, clock.clone()),
            details_cache: TtlCache::with_clock("place_details", ttl, clock),
            known_places: Mutex::new(HashMap::new()),
        }
    }

    /// Backend that will actually serve a request for `requested`
    fn backend(&self, requested: PlacesProviderKind) -> &Arc<dyn PlacesBackend> {
        match (requested, &self.google) {
            (PlacesProviderKind::Google, Some(google)) => google,
            _ => &self.nominatim,
        }
    }

    fn remember(&self, suggestions: &[PlaceSuggestion]) {
        let mut known = self.known_places.lock().unwrap_or_else(|e| e.into_inner());
        for suggestion in suggestions {
            if suggestion.lat.is_some() && suggestion.lng.is_some() {
                known.insert(suggestion.place_id.clone(), suggestion.clone());
            }
        }
    }

    fn known_destination(&self, place_id: &str) -> Option<Destination> {
        let known = self.known_places.lock().unwrap_or_else(|e| e.into_inner());
        let suggestion = known.get(place_id)?;
        Some(Destination::new(
            place_id,
            &suggestion.main_text,
            &suggestion.description,
            suggestion.lat?,
            suggestion.lng?,
        ))
    }

    /// Autocomplete suggestions for `query`
    #[instrument(skip(self))]
    pub async fn search_places(
        &self,
        query: &str,
        provider: Option<PlacesProviderKind>,
    ) -> Vec<PlaceSuggestion> {
        if query.chars().count() < MIN_QUERY_CHARS {
            return Vec::new();
        }

        let requested = provider.unwrap_or(self.default_provider);
        let cache_key = format!("{}_{}", requested.as_str(), query.trim().to_lowercase());
        if let Some(cached) = self.search_cache.get(&cache_key) {
            return cached;
        }

        if !self.enabled {
            let mock = mock_suggestions(query);
            self.search_cache.put(&cache_key, mock.clone());
            return mock;
        }

        let backend = self.backend(requested);
        match backend.search(query).await {
            Ok(suggestions) => {
                if backend.kind() == PlacesProviderKind::Nominatim {
                    self.remember(&suggestions);
                }
                debug!("Found {} places for '{}'", suggestions.len(), query);
                self.search_cache.put(&cache_key, suggestions.clone());
                suggestions
            }
            Err(e) => {
                warn!("Places search failed, using fallback: {}", e);
                mock_suggestions(query)
            }
        }
    }

    /// Coordinates and address for a place returned by [`Self::search_places`]
    #[instrument(skip(self))]
    pub async fn place_details(
        &self,
        place_id: &str,
        provider: Option<PlacesProviderKind>,
    ) -> Destination {
        let requested = provider.unwrap_or(self.default_provider);

        if requested == PlacesProviderKind::Nominatim || self.google.is_none() {
            if let Some(destination) = self.known_destination(place_id) {
                return destination;
            }
        }

        let cache_key = match requested {
            PlacesProviderKind::Google => format!("google_{place_id}"),
            PlacesProviderKind::Nominatim => place_id.to_string(),
        };
        if let Some(cached) = self.details_cache.get(&cache_key) {
            return cached;
        }

        if !self.enabled {
            let mock = mock_details(place_id);
            self.details_cache.put(&cache_key, mock.clone());
            return mock;
        }

        match self.backend(requested).details(place_id).await {
            Ok(destination) => {
                self.details_cache.put(&cache_key, destination.clone());
                destination
            }
            Err(e) => {
                warn!("Place details failed, using fallback: {}", e);
                mock_details(place_id)
            }
        }
    }

    /// Real-world attractions near `destination`, de-duplicated and capped
    #[instrument(skip(self, destination), fields(destination = %destination.name))]
    pub async fn attractions(
        &self,
        destination: &Destination,
        provider: Option<PlacesProviderKind>,
        limit: usize,
    ) -> Fetched<Vec<Attraction>> {
        if !self.enabled {
            return Fetched::Fallback("places API disabled".to_string());
        }

        let requested = provider.unwrap_or(self.default_provider);
        match self.backend(requested).attractions(destination, limit).await {
            Ok(attractions) => Fetched::Live(dedupe_attractions(attractions, limit)),
            Err(e) => Fetched::Fallback(e.to_string()),
        }
    }

    pub fn clear_cache(&self) {
        self.search_cache.clear();
        self.details_cache.clear();
        self.known_places
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

#[async_trait]
impl PlaceResolver for PlacesService {
    async fn search(&self, query: &str, provider: Option<PlacesProviderKind>) -> Vec<PlaceSuggestion> {
        self.search_places(query, provider).await
    }

    async fn details(&self, place_id: &str, provider: Option<PlacesProviderKind>) -> Destination {
        self.place_details(place_id, provider).await
    }
}

#[async_trait]
impl AttractionProvider for PlacesService {
    async fn attractions(
        &self,
        destination: &Destination,
        provider: Option<PlacesProviderKind>,
        limit: usize,
    ) -> Fetched<Vec<Attraction>> {
        PlacesService::attractions(self, destination, provider, limit).await
    }
}
