//! Converting canonical USD costs into the trip currency.

use crate::models::Activity;

/// Fixed multiplier applied after conversion to bias displayed costs low
pub const AFFORDABILITY_SCALE: f64 = 0.6;

/// Round half away from zero to two decimals
#[must_use]
pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// `round(usd * rate * AFFORDABILITY_SCALE, 2)`
#[must_use]
pub fn convert_cost(usd_cost: f64, rate: f64) -> f64 {
    round_to_cents(usd_cost * rate * AFFORDABILITY_SCALE)
}

/// New activity records with converted, individually rounded costs
#[must_use]
pub fn convert_activities(activities: &[Activity], rate: f64) -> Vec<Activity> {
    activities
        .iter()
        .map(|activity| activity.with_cost(convert_cost(activity.cost_estimate, rate)))
        .collect()
}

/// Sum of already-rounded activity costs, rounded again to two decimals
#[must_use]
pub fn day_total(activities: &[Activity]) -> f64 {
    round_to_cents(activities.iter().map(|a| a.cost_estimate).sum())
}
