//! Time remaining before an event's retention window runs out.
//!
//! Expiry is advisory: it is computed on read for display and nothing ever
//! deletes an expired event.

use std::fmt;

use chrono::{DateTime, Duration, Utc};

use crate::event::RetentionDays;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    Active { days: i64, hours: i64 },
    Expired,
}

impl Remaining {
    pub fn is_expired(&self) -> bool {
        matches!(self, Remaining::Expired)
    }
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Remaining::Active { days, hours } => write!(f, "{days} days {hours} hours"),
            Remaining::Expired => write!(f, "expired"),
        }
    }
}

pub fn expires_at(created_at: DateTime<Utc>, retention: RetentionDays) -> DateTime<Utc> {
    created_at + Duration::days(i64::from(retention.days()))
}

/// Whole days and hours left until `created_at + retention`, rounded down.
/// `Expired` once `now` reaches the expiry instant.
pub fn remaining(created_at: DateTime<Utc>, retention: RetentionDays, now: DateTime<Utc>) -> Remaining {
    let end = expires_at(created_at, retention);
    if now >= end {
        return Remaining::Expired;
    }

    // Positive, so truncation is floor.
    let left = end - now;
    Remaining::Active {
        days: left.num_days(),
        hours: left.num_hours() % 24,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use proptest::test_runner::Config;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn rank(r: Remaining) -> i64 {
        match r {
            Remaining::Active { days, hours } => days * 24 + hours,
            Remaining::Expired => -1,
        }
    }

    #[test]
    fn wedding_week_scenario() {
        let created = t0();
        let week = RetentionDays::Seven;

        assert_eq!(
            remaining(created, week, created + Duration::days(6) + Duration::hours(23)),
            Remaining::Active { days: 0, hours: 23 }
        );
        assert_eq!(remaining(created, week, created + Duration::days(7)), Remaining::Expired);
    }

    #[test]
    fn rounds_down_never_up() {
        let created = t0();
        // 23.9 hours left
        let now = created + Duration::minutes(6);
        assert_eq!(
            remaining(created, RetentionDays::One, now),
            Remaining::Active { days: 0, hours: 23 }
        );

        // 0.9 hours left
        let now = expires_at(created, RetentionDays::One) - Duration::minutes(54);
        assert_eq!(
            remaining(created, RetentionDays::One, now),
            Remaining::Active { days: 0, hours: 0 }
        );
    }

    #[test]
    fn full_window_at_creation() {
        let created = t0();
        assert_eq!(
            remaining(created, RetentionDays::Thirty, created),
            Remaining::Active { days: 30, hours: 0 }
        );
    }

    #[test]
    fn expired_exactly_at_boundary() {
        let created = t0();
        for retention in RetentionDays::ALL {
            let end = expires_at(created, retention);
            assert!(!remaining(created, retention, end - Duration::milliseconds(1)).is_expired());
            assert_eq!(
                remaining(created, retention, end - Duration::microseconds(1)),
                Remaining::Active { days: 0, hours: 0 }
            );
            assert!(!remaining(created, retention, end - Duration::nanoseconds(1)).is_expired());
            assert!(remaining(created, retention, end).is_expired());
            assert!(remaining(created, retention, end + Duration::days(365)).is_expired());
        }
    }

    #[test]
    fn display() {
        assert_eq!(Remaining::Active { days: 2, hours: 5 }.to_string(), "2 days 5 hours");
        assert_eq!(Remaining::Expired.to_string(), "expired");
    }

    fn any_retention() -> impl Strategy<Value = RetentionDays> {
        prop::sample::select(RetentionDays::ALL.to_vec())
    }

    // 1970..2100, microsecond precision.
    const CREATED_MICROS: std::ops::Range<i64> = 0..4_102_444_800_000_000;
    // Up to 40 days either side of creation.
    const SPAN_MICROS: i64 = 40 * 24 * 60 * 60 * 1_000_000;

    fn at(micros: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_micros(micros).unwrap()
    }

    proptest! {
        #![proptest_config(Config::with_cases(256))]

        #[test]
        fn expired_exactly_when_now_reaches_the_end(
            created in CREATED_MICROS,
            retention in any_retention(),
            offset in -SPAN_MICROS..SPAN_MICROS
        ) {
            let created = at(created);
            let now = created + Duration::microseconds(offset);
            let end = expires_at(created, retention);

            prop_assert_eq!(remaining(created, retention, now).is_expired(), now >= end);
        }

        #[test]
        fn active_parts_stay_in_range(
            created in CREATED_MICROS,
            retention in any_retention(),
            offset in -SPAN_MICROS..SPAN_MICROS
        ) {
            let created = at(created);
            let now = created + Duration::microseconds(offset);

            if let Remaining::Active { days, hours } = remaining(created, retention, now) {
                prop_assert!((0..24).contains(&hours));
                prop_assert!(days >= 0);
                // Floor never reports more than is left.
                let reported = Duration::days(days) + Duration::hours(hours);
                prop_assert!(reported <= expires_at(created, retention) - now);
            }
        }

        #[test]
        fn never_increases_as_time_passes(
            created in CREATED_MICROS,
            retention in any_retention(),
            a in -SPAN_MICROS..SPAN_MICROS,
            b in -SPAN_MICROS..SPAN_MICROS
        ) {
            let created = at(created);
            let (earlier, later) = (a.min(b), a.max(b));
            let first = rank(remaining(created, retention, created + Duration::microseconds(earlier)));
            let second = rank(remaining(created, retention, created + Duration::microseconds(later)));

            prop_assert!(second <= first);
        }
    }
}
