//! Null-aware statistics and time-delta conversions
//!
//! Aggregations run over *defined* values only. `None` means "no defined
//! values", which is distinct from a zero mean or a zero sum.

use chrono::TimeDelta;
use statrs::statistics::Statistics;

use crate::acquisition::Timestamp;
use crate::config::defaults::AGGREGATE_DECIMALS;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Keep only the defined values.
pub fn defined<I>(values: I) -> Vec<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values.into_iter().flatten().collect()
}

/// Arithmetic mean, `None` for an empty set.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(Statistics::mean(values))
}

/// Sample standard deviation (N - 1 denominator), `None` below two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    Some(Statistics::std_dev(values))
}

/// Largest value, `None` for an empty set.
pub fn max(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(Statistics::max(values))
}

/// Sum of integer quantities, clamped at the `i64` bounds.
pub fn saturating_total<I>(values: I) -> i64
where
    I: IntoIterator<Item = i64>,
{
    values.into_iter().fold(0, i64::saturating_add)
}

/// Round half-to-even at [`AGGREGATE_DECIMALS`] places.
pub fn round_aggregate(value: f64) -> f64 {
    let scale = 10f64.powi(AGGREGATE_DECIMALS);
    (value * scale).round_ties_even() / scale
}

/// Whole days in a delta, floored toward negative infinity.
///
/// `-1h` is `-1` day, `+23h59m` is `0` days.
pub fn floor_days(delta: TimeDelta) -> i64 {
    delta.num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

/// `end - start` in hours, `None` unless both are present.
pub fn hours_between(start: Option<Timestamp>, end: Option<Timestamp>) -> Option<f64> {
    seconds_between(start, end).map(|s| s / 3600.0)
}

/// `end - start` in minutes, `None` unless both are present.
pub fn minutes_between(start: Option<Timestamp>, end: Option<Timestamp>) -> Option<f64> {
    seconds_between(start, end).map(|s| s / 60.0)
}

/// `end - start` in floored whole days, `None` unless both are present.
pub fn days_between(start: Option<Timestamp>, end: Option<Timestamp>) -> Option<i64> {
    Some(floor_days(end? - start?))
}

#[allow(clippy::cast_precision_loss)]
fn seconds_between(start: Option<Timestamp>, end: Option<Timestamp>) -> Option<f64> {
    let delta = end? - start?;
    Some(delta.num_milliseconds() as f64 / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn at(millis: i64) -> Option<Timestamp> {
        Local.timestamp_millis_opt(millis).single()
    }

    #[test]
    fn test_mean_and_std_empty_vs_zero() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[0.0, 0.0]), Some(0.0));
        assert_eq!(sample_std(&[]), None);
        assert_eq!(sample_std(&[4.0]), None);
        assert_eq!(max(&[]), None);
    }

    #[test]
    fn test_sample_std_uses_n_minus_one() {
        // values 2, 4, 4, 4, 5, 5, 7, 9: population std 2.0, sample std ~2.138
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let std = sample_std(&values).unwrap();
        assert!((std - 2.138_089_935).abs() < 1e-6, "got {}", std);
        assert_eq!(mean(&values), Some(5.0));
        assert_eq!(max(&values), Some(9.0));
    }

    #[test]
    fn test_defined_skips_none() {
        let values = defined(vec![Some(1.0), None, Some(3.0)]);
        assert_eq!(values, vec![1.0, 3.0]);
        assert_eq!(mean(&values), Some(2.0));
    }

    #[test]
    fn test_saturating_total_clamps() {
        assert_eq!(saturating_total([3, 4, -2]), 5);
        assert_eq!(saturating_total([i64::MAX, i64::MAX]), i64::MAX);
        assert_eq!(saturating_total([i64::MIN, -1]), i64::MIN);
        assert_eq!(saturating_total(std::iter::empty()), 0);
    }

    #[test]
    fn test_round_aggregate_half_even() {
        assert_eq!(round_aggregate(1.234), 1.23);
        assert_eq!(round_aggregate(1.236), 1.24);
        assert_eq!(round_aggregate(2.5), 2.5);
        assert_eq!(round_aggregate(-0.004), -0.0);
    }

    #[test]
    fn test_floor_days_negative_and_positive() {
        assert_eq!(floor_days(TimeDelta::hours(23) + TimeDelta::minutes(59)), 0);
        assert_eq!(floor_days(TimeDelta::hours(24)), 1);
        assert_eq!(floor_days(TimeDelta::hours(49)), 2);
        assert_eq!(floor_days(TimeDelta::hours(-1)), -1);
        assert_eq!(floor_days(TimeDelta::hours(-24)), -1);
        assert_eq!(floor_days(TimeDelta::hours(-25)), -2);
        assert_eq!(floor_days(TimeDelta::zero()), 0);
    }

    #[test]
    fn test_intervals_require_both_ends() {
        let t0 = 1_700_000_000_000;
        assert_eq!(hours_between(at(t0), at(t0 + 5_400_000)), Some(1.5));
        assert_eq!(minutes_between(at(t0), at(t0 + 5_400_000)), Some(90.0));
        assert_eq!(days_between(at(t0), at(t0 + 3 * MILLIS_PER_DAY)), Some(3));
        assert_eq!(hours_between(None, at(t0)), None);
        assert_eq!(minutes_between(at(t0), None), None);
        assert_eq!(days_between(None, None), None);
    }

    #[test]
    fn test_negative_interval_kept() {
        let t0 = 1_700_000_000_000;
        assert_eq!(hours_between(at(t0), at(t0 - 1_800_000)), Some(-0.5));
    }
}
