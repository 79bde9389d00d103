//! Property tests for the date utilities the validator and approval gate
//! are built on.

use chrono::{Duration, NaiveDate};
use hrm_leave::utils::date_range::{days_between, ranges_overlap};
use proptest::prelude::*;

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

proptest! {
    #[test]
    fn day_count_matches_offset_arithmetic(start in 0i64..3650, len in 0i64..365) {
        let s = base() + Duration::days(start);
        let e = s + Duration::days(len);
        prop_assert_eq!(days_between(s, e), Ok((len + 1) as u32));
    }

    #[test]
    fn reversed_ranges_always_fail(start in 0i64..3650, len in 1i64..365) {
        let s = base() + Duration::days(start);
        let e = s + Duration::days(len);
        prop_assert!(days_between(e, s).is_err());
    }

    #[test]
    fn overlap_is_symmetric(
        a in 0i64..1000, a_len in 0i64..60,
        b in 0i64..1000, b_len in 0i64..60,
    ) {
        let a_start = base() + Duration::days(a);
        let a_end = a_start + Duration::days(a_len);
        let b_start = base() + Duration::days(b);
        let b_end = b_start + Duration::days(b_len);
        prop_assert_eq!(
            ranges_overlap(a_start, a_end, b_start, b_end),
            ranges_overlap(b_start, b_end, a_start, a_end)
        );
    }

    #[test]
    fn overlap_means_a_shared_calendar_day(
        a in 0i64..100, a_len in 0i64..20,
        b in 0i64..100, b_len in 0i64..20,
    ) {
        let a_start = base() + Duration::days(a);
        let a_end = a_start + Duration::days(a_len);
        let b_start = base() + Duration::days(b);
        let b_end = b_start + Duration::days(b_len);

        let shares_day = (a..=a + a_len).any(|day| day >= b && day <= b + b_len);
        prop_assert_eq!(ranges_overlap(a_start, a_end, b_start, b_end), shares_day);
    }

    #[test]
    fn every_range_overlaps_itself(a in 0i64..1000, a_len in 0i64..60) {
        let s = base() + Duration::days(a);
        let e = s + Duration::days(a_len);
        prop_assert!(ranges_overlap(s, e, s, e));
    }
}
