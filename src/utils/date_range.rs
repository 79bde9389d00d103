use chrono::NaiveDate;

use crate::error::ValidationFailure;

/// Inclusive day count of [start, end]; a single-day request counts as 1.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> Result<u32, ValidationFailure> {
    if end < start {
        return Err(ValidationFailure::InvalidDateRange);
    }
    let span = end.signed_duration_since(start).num_days() + 1;
    Ok(span as u32)
}

/// Closed-interval intersection; ranges touching on a single shared day
/// count as overlapping.
pub fn ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && b_start <= a_end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn day_count_is_inclusive() {
        assert_eq!(days_between(d(2025, 7, 1), d(2025, 7, 10)), Ok(10));
        assert_eq!(days_between(d(2025, 7, 1), d(2025, 7, 1)), Ok(1));
    }

    #[test]
    fn day_count_spans_month_boundaries() {
        assert_eq!(days_between(d(2025, 7, 28), d(2025, 8, 3)), Ok(7));
    }

    #[test]
    fn reversed_range_is_rejected() {
        assert_eq!(
            days_between(d(2025, 7, 10), d(2025, 7, 1)),
            Err(ValidationFailure::InvalidDateRange)
        );
    }

    #[test]
    fn touching_ranges_overlap() {
        assert!(ranges_overlap(
            d(2025, 7, 1),
            d(2025, 7, 10),
            d(2025, 7, 10),
            d(2025, 7, 20)
        ));
    }

    #[test]
    fn disjoint_ranges_do_not_overlap() {
        assert!(!ranges_overlap(
            d(2025, 7, 1),
            d(2025, 7, 10),
            d(2025, 7, 11),
            d(2025, 7, 20)
        ));
    }

    #[test]
    fn containment_overlaps() {
        assert!(ranges_overlap(
            d(2025, 7, 1),
            d(2025, 7, 31),
            d(2025, 7, 10),
            d(2025, 7, 12)
        ));
    }
}
