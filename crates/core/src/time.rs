use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};

/// A clock abstraction for deterministic time in services and tests.
///
/// `Manual` clocks share their instant between clones, so a test can hand a
/// clone to a controller and advance time from the outside.
#[derive(Debug, Clone, Default)]
pub enum Clock {
    #[default]
    Default,
    Manual(Arc<Mutex<DateTime<Utc>>>),
}

impl Clock {
    /// Returns a clock that uses the current system time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Returns a manual clock starting at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Manual(Arc::new(Mutex::new(at)))
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Manual(at) => *at.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Advance a manual clock (and every clone of it) by `delta`.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&self, delta: Duration) {
        if let Clock::Manual(at) = self {
            let mut guard = at.lock().unwrap_or_else(PoisonError::into_inner);
            *guard += delta;
        }
    }
}

/// Whole seconds elapsed between `since` and `now`, floor-rounded and never negative.
#[must_use]
pub fn elapsed_whole_seconds(since: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (now - since).num_milliseconds();
    u64::try_from(millis.div_euclid(1000)).unwrap_or(0)
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a manual `Clock` starting at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances_all_clones() {
        let clock = fixed_clock();
        let other = clock.clone();
        clock.advance(Duration::seconds(90));
        assert_eq!(other.now(), fixed_now() + Duration::seconds(90));
    }

    #[test]
    fn elapsed_seconds_floor_and_clamp() {
        let start = fixed_now();
        assert_eq!(elapsed_whole_seconds(start, start + Duration::milliseconds(1999)), 1);
        assert_eq!(elapsed_whole_seconds(start, start - Duration::seconds(5)), 0);
    }
}
