//! Activity model

use serde::{Deserialize, Serialize};

/// Broad kind of activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityCategory {
    Sightseeing,
    Outdoor,
    Indoor,
    Cultural,
    Food,
    Shopping,
}

impl ActivityCategory {
    /// Whether attractions of this category are exposed to the weather
    #[must_use]
    pub const fn is_weather_exposed(&self) -> bool {
        matches!(self, Self::Outdoor | Self::Sightseeing)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sightseeing => "sightseeing",
            Self::Outdoor => "outdoor",
            Self::Indoor => "indoor",
            Self::Cultural => "cultural",
            Self::Food => "food",
            Self::Shopping => "shopping",
        }
    }
}

impl std::fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single planned activity.
///
/// Activities are values: pricing and re-keying produce new records rather
/// than mutating existing ones.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Activity {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: ActivityCategory,
    /// Duration in hours
    pub duration: f32,
    pub weather_dependent: bool,
    /// Estimated cost; USD until converted, then the trip currency
    pub cost_estimate: f64,
}

impl Activity {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        category: ActivityCategory,
        duration: f32,
        weather_dependent: bool,
        cost_estimate: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            category,
            duration,
            weather_dependent,
            cost_estimate,
        }
    }

    /// Copy of this activity with a different cost
    #[must_use]
    pub fn with_cost(&self, cost_estimate: f64) -> Self {
        Self {
            cost_estimate,
            ..self.clone()
        }
    }

    /// Copy of this activity with a different identifier
    #[must_use]
    pub fn with_id(&self, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serializes_lowercase() {
        let json = serde_json::to_string(&ActivityCategory::Sightseeing).unwrap();
        assert_eq!(json, "\"sightseeing\"");
        let parsed: ActivityCategory = serde_json::from_str("\"food\"").unwrap();
        assert_eq!(parsed, ActivityCategory::Food);
    }

    #[test]
    fn test_with_cost_leaves_original_untouched() {
        let original = Activity::new(
            "1",
            "Louvre Museum",
            "World's largest art museum",
            ActivityCategory::Cultural,
            4.0,
            false,
            17.0,
        );
        let converted = original.with_cost(10.2);
        assert_eq!(original.cost_estimate, 17.0);
        assert_eq!(converted.cost_estimate, 10.2);
        assert_eq!(converted.name, original.name);
    }

    #[test]
    fn test_weather_exposed_categories() {
        assert!(ActivityCategory::Outdoor.is_weather_exposed());
        assert!(ActivityCategory::Sightseeing.is_weather_exposed());
        assert!(!ActivityCategory::Cultural.is_weather_exposed());
        assert!(!ActivityCategory::Food.is_weather_exposed());
    }
}
