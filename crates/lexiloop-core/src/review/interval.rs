//! Spaced-repetition interval table.
//!
//! A fixed forgetting-curve progression from ten minutes up to thirty days.
//! Review counts past the last entry reuse the largest interval.

use chrono::Duration;

/// Wait before the next review, in minutes, indexed by review count.
pub const INTERVAL_MINUTES: [i64; 10] = [
    10,     // 10 minutes
    30,     // 30 minutes
    60,     // 1 hour
    720,    // 12 hours
    1_440,  // 1 day
    2_880,  // 2 days
    4_320,  // 3 days
    10_080, // 7 days
    20_160, // 14 days
    43_200, // 30 days
];

/// Index of the saturating (largest) interval.
pub const MAX_INTERVAL_INDEX: usize = INTERVAL_MINUTES.len() - 1;

/// Duration to wait after reaching `review_count` consecutive correct answers.
pub fn interval_for(review_count: u32) -> Duration {
    Duration::minutes(interval_minutes(review_count))
}

/// Same as [`interval_for`] but in whole minutes.
pub fn interval_minutes(review_count: u32) -> i64 {
    let index = (review_count as usize).min(MAX_INTERVAL_INDEX);
    INTERVAL_MINUTES[index]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn reproduces_forgetting_curve() {
        let minutes: Vec<i64> = (0..10).map(interval_minutes).collect();
        assert_eq!(
            minutes,
            vec![10, 30, 60, 720, 1440, 2880, 4320, 10080, 20160, 43200]
        );
    }

    #[test]
    fn first_and_last_intervals() {
        assert_eq!(interval_for(0), Duration::minutes(10));
        assert_eq!(interval_for(3), Duration::minutes(720));
        assert_eq!(interval_for(9), Duration::minutes(43_200));
    }

    #[test]
    fn saturates_beyond_table() {
        assert_eq!(interval_for(10), Duration::minutes(43_200));
        assert_eq!(interval_for(50), Duration::minutes(43_200));
        assert_eq!(interval_for(u32::MAX), Duration::minutes(43_200));
    }

    #[test]
    fn table_is_strictly_ascending() {
        assert!(INTERVAL_MINUTES.windows(2).all(|w| w[0] < w[1]));
    }

    proptest! {
        #[test]
        fn interval_matches_clamped_index(count in any::<u32>()) {
            let expected = INTERVAL_MINUTES[(count as usize).min(9)];
            prop_assert_eq!(interval_for(count), Duration::minutes(expected));
        }

        #[test]
        fn interval_never_shrinks_with_more_reviews(count in 0u32..1_000) {
            prop_assert!(interval_for(count + 1) >= interval_for(count));
        }
    }
}
