//! Time source used by validation and timestamp stamping.
//!
//! # Responsibility
//! - Provide "now" and "today" to services without reaching for globals.
//! - Allow deterministic clocks in tests and seeded runs.
//!
//! # Invariants
//! - `now()` is truncated to millisecond precision, matching storage.

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use std::sync::Mutex;

/// Source of the current instant and calendar date.
pub trait Clock: Send + Sync {
    /// Current instant, millisecond precision.
    fn now(&self) -> DateTime<Utc>;
    /// Current calendar date used by date business rules.
    fn today(&self) -> NaiveDate;
}

/// Wall-clock implementation. `today()` follows the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        truncate_to_millis(Utc::now())
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Manually driven clock.
///
/// `today()` is derived from the current instant in UTC.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(truncate_to_millis(now)),
        }
    }

    /// Moves the clock forward by `step`.
    pub fn advance(&self, step: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now = truncate_to_millis(*now + step);
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now = truncate_to_millis(instant);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Drops sub-millisecond precision so values survive a storage round-trip.
pub fn truncate_to_millis(instant: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(instant.timestamp_millis()).unwrap_or(instant)
}

#[cfg(test)]
mod tests {
    use super::{truncate_to_millis, Clock, FixedClock};
    use chrono::{Duration, TimeZone, Timelike, Utc};

    #[test]
    fn truncate_drops_sub_millisecond_part() {
        let instant = Utc
            .with_ymd_and_hms(2030, 1, 2, 3, 4, 5)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();
        assert_eq!(truncate_to_millis(instant).nanosecond(), 123_000_000);
    }

    #[test]
    fn fixed_clock_advances_and_tracks_today() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2030, 1, 2, 23, 0, 0).unwrap());
        assert_eq!(clock.today().to_string(), "2030-01-02");

        clock.advance(Duration::hours(2));
        assert_eq!(clock.today().to_string(), "2030-01-03");
    }
}
