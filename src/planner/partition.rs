//! Spreading a live attraction feed across the days of a trip.

/// Feed size assumed when no live attractions are available
const DEFAULT_FEED_SIZE: usize = 12;
const MIN_PER_DAY: usize = 3;
const MAX_PER_DAY: usize = 4;

/// Attractions per day: `ceil(total / days)` clamped to 3..=4.
#[must_use]
pub fn per_day_share(total: usize, days: usize) -> usize {
    if days == 0 {
        return 0;
    }
    let total = if total == 0 { DEFAULT_FEED_SIZE } else { total };
    total.div_ceil(days).clamp(MIN_PER_DAY, MAX_PER_DAY)
}

/// One contiguous, disjoint slice of `items` per day. Day `i` gets
/// `[i * share, (i + 1) * share)`; days past the end of the feed get an
/// empty slice.
#[must_use]
pub fn partition_by_day<T>(items: &[T], days: usize) -> Vec<&[T]> {
    let share = per_day_share(items.len(), days);

    (0..days)
        .map(|day| {
            let start = (day * share).min(items.len());
            let end = (start + share).min(items.len());
            &items[start..end]
        })
        .collect()
}
