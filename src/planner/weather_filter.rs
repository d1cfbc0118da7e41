//! Weather-aware selection of a day's activities.

use rand::Rng;
use rand::seq::SliceRandom;

use super::catalog::generic_activities;
use crate::models::{Activity, WeatherCondition};

/// Most activities scheduled on a single day
pub const MAX_ACTIVITIES_PER_DAY: usize = 4;
/// Below this many suitable candidates the list is backfilled with generics
pub const MIN_SUITABLE_ACTIVITIES: usize = 3;

/// Pick a day's activities from `candidates`.
///
/// Rain and storms remove weather-dependent entries. Fewer than
/// [`MIN_SUITABLE_ACTIVITIES`] survivors are topped up with the generic
/// catalog to [`MAX_ACTIVITIES_PER_DAY`]. The result is shuffled with `rng`
/// and capped at [`MAX_ACTIVITIES_PER_DAY`].
pub fn select_for_weather<R: Rng + ?Sized>(
    candidates: Vec<Activity>,
    condition: WeatherCondition,
    rng: &mut R,
) -> Vec<Activity> {
    let mut suitable: Vec<Activity> = if condition.is_adverse() {
        candidates
            .into_iter()
            .filter(|activity| !activity.weather_dependent)
            .collect()
    } else {
        candidates
    };

    if suitable.len() < MIN_SUITABLE_ACTIVITIES {
        tracing::debug!(
            "Only {} activities suit {} weather, backfilling with generics",
            suitable.len(),
            condition
        );
        suitable.extend(generic_activities());
        suitable.truncate(MAX_ACTIVITIES_PER_DAY);
    }

    suitable.shuffle(rng);
    suitable.truncate(MAX_ACTIVITIES_PER_DAY);
    suitable
}
