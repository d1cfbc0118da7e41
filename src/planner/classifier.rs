//! Coarse geographic facts inferred from a destination's name and address.
//!
//! Classification is plain keyword matching against the tables below. It is
//! case-insensitive, deterministic and never calls out to a service.

use serde::{Deserialize, Serialize};

const CAPITALS: &[&str] = &[
    "paris", "london", "tokyo", "berlin", "rome", "madrid", "amsterdam", "vienna", "athens",
    "lisbon", "stockholm", "copenhagen", "oslo", "washington", "ottawa", "canberra",
    "wellington", "pretoria", "nairobi", "cairo", "new delhi", "jakarta", "bangkok", "seoul",
    "beijing", "moscow", "kiev", "warsaw", "prague", "budapest",
];

const COASTAL_KEYWORDS: &[&str] = &[
    "beach", "coast", "seaside", "seashore", "ocean", "bay", "harbor", "harbour", "port",
    "marina", "riviera", "shore",
];

const MOUNTAIN_KEYWORDS: &[&str] = &[
    "mountain", "alps", "himalaya", "hill", "peak", "valley", "plateau", "highland", "ridge",
    "summit",
];

// Checked in order; the first continent with a matching country wins.
const CONTINENTS: &[(Continent, &[&str])] = &[
    (
        Continent::Europe,
        &[
            "france", "germany", "italy", "spain", "uk", "united kingdom", "netherlands",
            "belgium", "portugal", "greece", "austria", "switzerland", "poland", "sweden",
            "norway", "denmark", "finland", "ireland", "czech", "hungary", "romania", "croatia",
        ],
    ),
    (
        Continent::Asia,
        &[
            "japan", "china", "india", "thailand", "singapore", "malaysia", "indonesia",
            "philippines", "vietnam", "south korea", "taiwan", "hong kong", "bangladesh",
            "sri lanka",
        ],
    ),
    (
        Continent::Americas,
        &[
            "usa", "united states", "canada", "mexico", "brazil", "argentina", "chile",
            "colombia", "peru", "venezuela", "costa rica",
        ],
    ),
    (
        Continent::Africa,
        &["south africa", "egypt", "kenya", "morocco", "tanzania", "ghana"],
    ),
    (Continent::Oceania, &["australia", "new zealand", "fiji"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Continent {
    Europe,
    Asia,
    Americas,
    Africa,
    Oceania,
    Unknown,
}

/// Everything the synthetic catalog needs to know about a place
#[derive(Debug, Clone, PartialEq)]
pub struct GeoContext {
    pub city: String,
    pub country: String,
    pub is_capital: bool,
    pub is_coastal: bool,
    pub is_mountainous: bool,
    pub continent: Continent,
}

impl GeoContext {
    /// Classify a destination from its display name and formatted address
    #[must_use]
    pub fn classify(name: &str, address: &str) -> Self {
        let city = extract_city(address, name);
        let country = address
            .split(',')
            .map(str::trim)
            .last()
            .unwrap_or_default()
            .to_string();

        Self {
            is_capital: is_likely_capital(&city),
            is_coastal: is_likely_coastal(address),
            is_mountainous: is_likely_mountainous(address),
            continent: detect_continent(address, &country),
            city,
            country,
        }
    }
}

pub(crate) fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// First address component that does not start like a street number
/// ("12", "12b Main St"); falls back to `fallback_name`.
#[must_use]
pub fn extract_city(address: &str, fallback_name: &str) -> String {
    address
        .split(',')
        .map(str::trim)
        .find(|part| !part.is_empty() && !part.starts_with(|c: char| c.is_ascii_digit()))
        .unwrap_or(fallback_name)
        .to_string()
}

/// Bidirectional substring match against the capital list, so both
/// "paris, France" and "Par" count. An empty name is never a capital.
#[must_use]
pub fn is_likely_capital(city: &str) -> bool {
    let lower = city.trim().to_lowercase();
    if lower.is_empty() {
        return false;
    }
    CAPITALS
        .iter()
        .any(|capital| lower.contains(capital) || capital.contains(lower.as_str()))
}

#[must_use]
pub fn is_likely_coastal(address: &str) -> bool {
    let lower = address.to_lowercase();
    COASTAL_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

#[must_use]
pub fn is_likely_mountainous(address: &str) -> bool {
    let lower = address.to_lowercase();
    MOUNTAIN_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

#[must_use]
pub fn detect_continent(address: &str, country: &str) -> Continent {
    let lower_address = address.to_lowercase();
    let lower_country = country.to_lowercase();

    CONTINENTS
        .iter()
        .find(|(_, countries)| {
            countries
                .iter()
                .any(|c| lower_country.contains(c) || lower_address.contains(c))
        })
        .map_or(Continent::Unknown, |(continent, _)| *continent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Paris")]
    #[case("paris, France")]
    #[case("New Delhi")]
    #[case("delhi")]
    fn test_capitals_detected(#[case] city: &str) {
        assert!(is_likely_capital(city));
    }

    #[rstest]
    #[case("Lyon")]
    #[case("Osaka")]
    #[case("")]
    fn test_non_capitals(#[case] city: &str) {
        assert!(!is_likely_capital(city));
    }

    #[test]
    fn test_detect_continent_europe() {
        assert_eq!(
            detect_continent("Munich, Bavaria, Germany", "Germany"),
            Continent::Europe
        );
    }

    #[rstest]
    #[case("Kyoto, Japan", "Japan", Continent::Asia)]
    #[case("Lima, Peru", "Peru", Continent::Americas)]
    #[case("Marrakesh, Morocco", "Morocco", Continent::Africa)]
    #[case("Suva, Fiji", "Fiji", Continent::Oceania)]
    #[case("Reykjavik, Iceland", "Iceland", Continent::Unknown)]
    fn test_detect_continent(
        #[case] address: &str,
        #[case] country: &str,
        #[case] expected: Continent,
    ) {
        assert_eq!(detect_continent(address, country), expected);
    }

    #[test]
    fn test_terrain_keywords() {
        assert!(is_likely_coastal("Byron Bay, New South Wales, Australia"));
        assert!(is_likely_mountainous("Chamonix, Haute-Savoie, Alps, France"));
        assert!(!is_likely_coastal("Madrid, Spain"));
        assert!(!is_likely_mountainous("Madrid, Spain"));
    }

    #[rstest]
    #[case("12, Rue de Rivoli, Paris, France", "Fallback", "Rue de Rivoli")]
    #[case("221b Baker Street, London, UK", "Fallback", "London")]
    #[case("75001, 12", "Fallback", "Fallback")]
    #[case("", "Lyon", "Lyon")]
    fn test_extract_city(#[case] address: &str, #[case] fallback: &str, #[case] expected: &str) {
        assert_eq!(extract_city(address, fallback), expected);
    }

    #[test]
    fn test_classify_combines_facts() {
        let context = GeoContext::classify("Nice", "Nice, Côte d'Azur, Riviera, France");
        assert_eq!(context.city, "Nice");
        assert_eq!(context.country, "France");
        assert!(!context.is_capital);
        assert!(context.is_coastal);
        assert!(!context.is_mountainous);
        assert_eq!(context.continent, Continent::Europe);
    }
}
