//! Candidate activities for a destination.
//!
//! Well-known cities have a hand-written catalog. Anywhere else gets a
//! synthetic list assembled from the destination's [`GeoContext`]. Costs are
//! canonical USD figures.

use tracing::debug;

use super::classifier::{Continent, GeoContext, is_all_digits};
use crate::models::{Activity, ActivityCategory, Attraction, DestinationInput};

/// Cost assigned to every externally sourced attraction
pub const ATTRACTION_BASE_COST: f64 = 8.0;
/// Duration assigned to every externally sourced attraction
pub const ATTRACTION_DURATION_HOURS: f32 = 2.0;

const POI_ID_START: usize = 10_000;
const SYNTHETIC_ID_START: usize = 1_000;

struct CatalogEntry {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    category: ActivityCategory,
    duration: f32,
    weather_dependent: bool,
    cost: f64,
}

impl CatalogEntry {
    fn to_activity(&self) -> Activity {
        Activity::new(
            self.id,
            self.name,
            self.description,
            self.category,
            self.duration,
            self.weather_dependent,
            self.cost,
        )
    }
}

const PARIS: &[CatalogEntry] = &[
    CatalogEntry {
        id: "1",
        name: "Visit Eiffel Tower",
        description: "Iconic iron lattice tower and symbol of Paris",
        category: ActivityCategory::Sightseeing,
        duration: 3.0,
        weather_dependent: true,
        cost: 25.0,
    },
    CatalogEntry {
        id: "2",
        name: "Louvre Museum",
        description: "World's largest art museum",
        category: ActivityCategory::Cultural,
        duration: 4.0,
        weather_dependent: false,
        cost: 17.0,
    },
    CatalogEntry {
        id: "3",
        name: "Seine River Cruise",
        description: "Scenic boat tour along the Seine",
        category: ActivityCategory::Sightseeing,
        duration: 2.0,
        weather_dependent: true,
        cost: 15.0,
    },
    CatalogEntry {
        id: "4",
        name: "Montmartre District",
        description: "Historic hilltop district with Sacré-Cœur",
        category: ActivityCategory::Cultural,
        duration: 3.0,
        weather_dependent: true,
        cost: 10.0,
    },
];

const TOKYO: &[CatalogEntry] = &[
    CatalogEntry {
        id: "5",
        name: "Senso-ji Temple",
        description: "Ancient Buddhist temple in Asakusa",
        category: ActivityCategory::Cultural,
        duration: 2.0,
        weather_dependent: false,
        cost: 0.0,
    },
    CatalogEntry {
        id: "6",
        name: "Tokyo Skytree",
        description: "Tallest structure in Japan with panoramic views",
        category: ActivityCategory::Sightseeing,
        duration: 2.0,
        weather_dependent: false,
        cost: 20.0,
    },
    CatalogEntry {
        id: "7",
        name: "Shibuya Crossing",
        description: "World's busiest pedestrian crossing",
        category: ActivityCategory::Sightseeing,
        duration: 1.0,
        weather_dependent: true,
        cost: 0.0,
    },
    CatalogEntry {
        id: "8",
        name: "Tsukiji Outer Market",
        description: "Famous fish market and food stalls",
        category: ActivityCategory::Food,
        duration: 3.0,
        weather_dependent: false,
        cost: 30.0,
    },
];

const CURATED: &[(&str, &[CatalogEntry])] = &[("Paris", PARIS), ("Tokyo", TOKYO)];

const GENERIC: &[CatalogEntry] = &[
    CatalogEntry {
        id: "default1",
        name: "City Walking Tour",
        description: "Explore the main attractions on foot",
        category: ActivityCategory::Sightseeing,
        duration: 3.0,
        weather_dependent: true,
        cost: 20.0,
    },
    CatalogEntry {
        id: "default2",
        name: "Local Museum Visit",
        description: "Discover local history and culture",
        category: ActivityCategory::Cultural,
        duration: 2.0,
        weather_dependent: false,
        cost: 15.0,
    },
    CatalogEntry {
        id: "default3",
        name: "Shopping District",
        description: "Browse local shops and markets",
        category: ActivityCategory::Shopping,
        duration: 2.0,
        weather_dependent: false,
        cost: 50.0,
    },
    CatalogEntry {
        id: "default4",
        name: "Local Cuisine Experience",
        description: "Try authentic local dishes",
        category: ActivityCategory::Food,
        duration: 2.0,
        weather_dependent: false,
        cost: 40.0,
    },
];

/// The four always-available backfill activities
#[must_use]
pub fn generic_activities() -> Vec<Activity> {
    GENERIC.iter().map(CatalogEntry::to_activity).collect()
}

/// Names of the cities with a hand-written catalog
#[must_use]
pub fn curated_cities() -> Vec<&'static str> {
    CURATED.iter().map(|(city, _)| *city).collect()
}

/// Hand-written activities for a destination, matched on the exact name,
/// then the exact city, then a case-insensitive substring match either way
/// round on the name.
#[must_use]
pub fn curated_activities(name: &str, city: &str) -> Option<Vec<Activity>> {
    let lower_name = name.trim().to_lowercase();

    CURATED
        .iter()
        .find(|(key, _)| *key == name)
        .or_else(|| CURATED.iter().find(|(key, _)| *key == city))
        .or_else(|| {
            if lower_name.is_empty() {
                return None;
            }
            CURATED.iter().find(|(key, _)| {
                let lower_key = key.to_lowercase();
                lower_name.contains(&lower_key) || lower_key.contains(&lower_name)
            })
        })
        .map(|(_, entries)| entries.iter().map(CatalogEntry::to_activity).collect())
}

fn sanitized<'a>(candidate: &'a str) -> Option<&'a str> {
    let trimmed = candidate.trim();
    (!trimmed.is_empty() && !is_all_digits(trimmed)).then_some(trimmed)
}

/// Rule-based activity list for a destination without a curated catalog
#[must_use]
pub fn synthesize_activities(name: &str, context: &GeoContext) -> Vec<Activity> {
    let display = sanitized(name)
        .or_else(|| sanitized(&context.city))
        .unwrap_or("the city");
    let country = sanitized(&context.country).unwrap_or(display);

    let mut activities = Vec::new();
    let mut next_id = SYNTHETIC_ID_START;
    let mut push = |name: &str,
                    description: String,
                    category: ActivityCategory,
                    duration: f32,
                    weather_dependent: bool,
                    cost: f64| {
        activities.push(Activity::new(
            format!("dynamic_{next_id}"),
            name,
            description,
            category,
            duration,
            weather_dependent,
            cost,
        ));
        next_id += 1;
    };

    if context.is_capital {
        push(
            "Government District & Historical Sites",
            format!("Explore {display}'s historic center and government buildings"),
            ActivityCategory::Cultural,
            3.0,
            false,
            15.0,
        );
        push(
            "National Museum",
            format!("Visit the national museum to learn about {country}'s history"),
            ActivityCategory::Cultural,
            3.0,
            false,
            20.0,
        );
    }

    if context.is_coastal {
        push(
            "Beach & Waterfront",
            format!("Enjoy {display}'s beautiful beaches and waterfront area"),
            ActivityCategory::Outdoor,
            4.0,
            true,
            10.0,
        );
        push(
            "Seafood & Local Cuisine",
            format!("Taste fresh seafood and local specialties in {display}"),
            ActivityCategory::Food,
            2.0,
            false,
            45.0,
        );
    }

    if context.is_mountainous {
        push(
            "Scenic Viewpoints",
            format!("Take in panoramic views from {display}'s scenic overlooks"),
            ActivityCategory::Outdoor,
            3.0,
            true,
            5.0,
        );
    }

    match context.continent {
        Continent::Europe => {
            push(
                "Historic Old Town",
                format!("Walk through {display}'s charming historic district"),
                ActivityCategory::Sightseeing,
                2.0,
                true,
                0.0,
            );
            push(
                "Local Markets & Cafés",
                format!("Experience {display}'s café culture and local markets"),
                ActivityCategory::Food,
                2.0,
                false,
                35.0,
            );
        }
        Continent::Asia => {
            push(
                "Temple & Shrine Visit",
                format!("Explore {display}'s historic temples and religious sites"),
                ActivityCategory::Cultural,
                2.0,
                false,
                5.0,
            );
            push(
                "Street Food Tour",
                format!("Discover {display}'s vibrant street food scene"),
                ActivityCategory::Food,
                3.0,
                false,
                30.0,
            );
        }
        Continent::Americas => {
            push(
                "City Center Exploration",
                format!("Discover {display}'s downtown area and main attractions"),
                ActivityCategory::Sightseeing,
                3.0,
                true,
                10.0,
            );
        }
        Continent::Africa | Continent::Oceania | Continent::Unknown => {}
    }

    push(
        "City Walking Tour",
        format!("Explore {display}'s main attractions on a guided walking tour"),
        ActivityCategory::Sightseeing,
        3.0,
        true,
        25.0,
    );
    push(
        "Local Shopping & Markets",
        format!("Browse {display}'s shops and local markets for souvenirs"),
        ActivityCategory::Shopping,
        2.0,
        false,
        50.0,
    );
    push(
        "Authentic Dining Experience",
        format!("Enjoy traditional cuisine at a local restaurant in {display}"),
        ActivityCategory::Food,
        2.0,
        false,
        40.0,
    );
    push(
        "Cultural Center or Museum",
        format!("Learn about {display}'s culture and heritage"),
        ActivityCategory::Cultural,
        2.0,
        false,
        18.0,
    );

    activities
}

/// Full candidate list for a destination: curated when known, synthetic
/// otherwise. Never empty.
#[must_use]
pub fn resolve_catalog(destination: &DestinationInput) -> Vec<Activity> {
    let name = destination.name();
    let context = GeoContext::classify(name, destination.address());

    if let Some(curated) = curated_activities(name, &context.city) {
        debug!("Using curated catalog for {}", name);
        return curated;
    }

    debug!(
        "Synthesizing catalog for {} (capital: {}, coastal: {}, mountainous: {}, continent: {:?})",
        name, context.is_capital, context.is_coastal, context.is_mountainous, context.continent
    );
    synthesize_activities(name, &context)
}

/// Map live points of interest to activities with sequential `poi_` ids
#[must_use]
pub fn attractions_to_activities(attractions: &[Attraction]) -> Vec<Activity> {
    attractions
        .iter()
        .enumerate()
        .map(|(index, attraction)| {
            Activity::new(
                format!("poi_{}", POI_ID_START + index),
                attraction.name.clone(),
                attraction.description.clone(),
                attraction.category,
                ATTRACTION_DURATION_HOURS,
                attraction.category.is_weather_exposed(),
                ATTRACTION_BASE_COST,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Destination;
    use std::collections::HashSet;

    fn names(activities: &[Activity]) -> Vec<&str> {
        activities.iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn test_curated_exact_and_fuzzy_match() {
        assert_eq!(curated_activities("Paris", "").map(|a| a.len()), Some(4));
        assert!(curated_activities("paris", "").is_some());
        assert!(curated_activities("Greater Tokyo Area", "").is_some());
        assert!(curated_activities("Lyon", "Lyon").is_none());
    }

    #[test]
    fn test_curated_match_by_city() {
        let activities = curated_activities("Eiffel Tower", "Paris").unwrap();
        assert!(names(&activities).contains(&"Louvre Museum"));
    }

    #[test]
    fn test_empty_name_does_not_match_everything() {
        assert!(curated_activities("", "").is_none());
    }

    #[test]
    fn test_synthetic_capital_in_europe() {
        let context = GeoContext::classify("Vienna", "Vienna, Austria");
        let activities = synthesize_activities("Vienna", &context);

        // 2 capital + 2 European + 4 generic
        assert_eq!(activities.len(), 8);
        assert_eq!(activities[0].name, "Government District & Historical Sites");
        assert_eq!(
            activities[1].description,
            "Visit the national museum to learn about Austria's history"
        );
        assert!(names(&activities).contains(&"Historic Old Town"));
    }

    #[test]
    fn test_synthetic_coastal_mountain_americas() {
        let context = GeoContext::classify("Valparaíso", "Valparaíso, Bay Hills, Chile");
        let activities = synthesize_activities("Valparaíso", &context);

        // 2 coastal + 1 mountain + 1 Americas + 4 generic
        assert_eq!(activities.len(), 8);
        assert!(names(&activities).contains(&"Beach & Waterfront"));
        assert!(names(&activities).contains(&"Scenic Viewpoints"));
        assert!(names(&activities).contains(&"City Center Exploration"));
    }

    #[test]
    fn test_synthetic_ids_are_unique() {
        let context = GeoContext::classify("Bangkok", "Bangkok, Bay, Thailand");
        let activities = synthesize_activities("Bangkok", &context);
        let ids: HashSet<_> = activities.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids.len(), activities.len());
        assert_eq!(activities[0].id, "dynamic_1000");
    }

    #[test]
    fn test_numeric_name_uses_generic_wording() {
        let context = GeoContext::classify("12345", "");
        let activities = synthesize_activities("12345", &context);
        assert_eq!(activities.len(), 4);
        assert_eq!(
            activities[0].description,
            "Explore the city's main attractions on a guided walking tour"
        );
    }

    #[test]
    fn test_resolve_catalog_for_resolved_destination() {
        let destination: DestinationInput =
            Destination::new("x", "Eiffel Tower", "Eiffel Tower, Paris, France", 48.85, 2.29)
                .into();
        let activities = resolve_catalog(&destination);
        // neither the name nor the extracted city ("Eiffel Tower") is curated
        assert!(names(&activities).contains(&"City Walking Tour"));

        let paris = resolve_catalog(&DestinationInput::from("Paris"));
        assert_eq!(names(&paris)[0], "Visit Eiffel Tower");
    }

    #[test]
    fn test_attractions_mapping() {
        let attractions = vec![
            Attraction {
                name: "Jardin des Plantes".into(),
                description: "park in Paris".into(),
                category: ActivityCategory::Outdoor,
            },
            Attraction {
                name: "Musée d'Orsay".into(),
                description: "museum in Paris".into(),
                category: ActivityCategory::Cultural,
            },
        ];
        let activities = attractions_to_activities(&attractions);
        assert_eq!(activities[0].id, "poi_10000");
        assert_eq!(activities[1].id, "poi_10001");
        assert!(activities[0].weather_dependent);
        assert!(!activities[1].weather_dependent);
        assert!(activities.iter().all(|a| a.cost_estimate == ATTRACTION_BASE_COST));
    }
}
