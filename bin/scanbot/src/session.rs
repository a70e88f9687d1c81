use chrono::{DateTime, NaiveDate, Timelike, Utc};
use tracing::info;

use common::SessionBalances;

/// Remembers the balance seen at the first scan of each UTC day and hour.
#[derive(Debug, Default)]
pub struct SessionTracker {
    day: Option<(NaiveDate, f64)>,
    hour: Option<(NaiveDate, u32, f64)>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `balance` at `now` and return the reference balances for the
    /// loss gates. A new day or hour resets its reference to `balance`.
    pub fn observe(&mut self, now: DateTime<Utc>, balance: f64) -> SessionBalances {
        let today = now.date_naive();
        let hour = now.hour();

        let day_start = match self.day {
            Some((d, start)) if d == today => start,
            _ => {
                info!(date = %today, balance, "New trading day");
                self.day = Some((today, balance));
                balance
            }
        };

        let hour_start = match self.hour {
            Some((d, h, start)) if d == today && h == hour => start,
            _ => {
                self.hour = Some((today, hour, balance));
                balance
            }
        };

        SessionBalances {
            day_start,
            hour_start: Some(hour_start),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, minute, 0).unwrap()
    }

    #[test]
    fn first_observation_sets_both_references() {
        let mut tracker = SessionTracker::new();
        let s = tracker.observe(at(4, 9, 0), 10_000.0);
        assert_eq!(s.day_start, 10_000.0);
        assert_eq!(s.hour_start, Some(10_000.0));
    }

    #[test]
    fn references_hold_within_the_hour() {
        let mut tracker = SessionTracker::new();
        tracker.observe(at(4, 9, 0), 10_000.0);
        let s = tracker.observe(at(4, 9, 45), 9_900.0);
        assert_eq!(s.day_start, 10_000.0);
        assert_eq!(s.hour_start, Some(10_000.0));
    }

    #[test]
    fn new_hour_resets_only_hourly() {
        let mut tracker = SessionTracker::new();
        tracker.observe(at(4, 9, 0), 10_000.0);
        let s = tracker.observe(at(4, 10, 0), 9_900.0);
        assert_eq!(s.day_start, 10_000.0);
        assert_eq!(s.hour_start, Some(9_900.0));
    }

    #[test]
    fn new_day_resets_both() {
        let mut tracker = SessionTracker::new();
        tracker.observe(at(4, 23, 30), 10_000.0);
        let s = tracker.observe(at(5, 0, 5), 9_800.0);
        assert_eq!(s.day_start, 9_800.0);
        assert_eq!(s.hour_start, Some(9_800.0));
    }

    #[test]
    fn same_hour_on_next_day_is_a_new_hour() {
        let mut tracker = SessionTracker::new();
        tracker.observe(at(4, 9, 0), 10_000.0);
        let s = tracker.observe(at(5, 9, 0), 9_500.0);
        assert_eq!(s.hour_start, Some(9_500.0));
    }
}
