use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::time::elapsed_whole_seconds;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExamSettingsError {
    #[error("time limit must be > 0 for a timed exam")]
    InvalidTimeLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Minutes,
    Hours,
}

impl TimeUnit {
    #[must_use]
    pub fn seconds(self) -> u64 {
        match self {
            TimeUnit::Minutes => 60,
            TimeUnit::Hours => 3_600,
        }
    }
}

/// Timer configuration chosen before an exam starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamSettings {
    timed: bool,
    time_limit: u32,
    time_unit: TimeUnit,
}

impl ExamSettings {
    /// Default of the settings dialog: timed, ten minutes.
    pub const DEFAULT_TIME_LIMIT: u32 = 10;

    /// # Errors
    ///
    /// Returns `ExamSettingsError::InvalidTimeLimit` for a zero limit.
    pub fn timed(time_limit: u32, time_unit: TimeUnit) -> Result<Self, ExamSettingsError> {
        if time_limit == 0 {
            return Err(ExamSettingsError::InvalidTimeLimit);
        }
        Ok(Self {
            timed: true,
            time_limit,
            time_unit,
        })
    }

    #[must_use]
    pub fn untimed() -> Self {
        Self {
            timed: false,
            time_limit: 0,
            time_unit: TimeUnit::Minutes,
        }
    }

    #[must_use]
    pub fn is_timed(&self) -> bool {
        self.timed
    }

    #[must_use]
    pub fn time_limit(&self) -> u32 {
        self.time_limit
    }

    #[must_use]
    pub fn time_unit(&self) -> TimeUnit {
        self.time_unit
    }

    #[must_use]
    pub fn total_limit_seconds(&self) -> u64 {
        if !self.timed {
            return 0;
        }
        u64::from(self.time_limit) * self.time_unit.seconds()
    }

    /// Remaining seconds, derived from the start instant and never stored.
    ///
    /// Returns `None` for untimed exams.
    #[must_use]
    pub fn remaining_seconds(&self, started_at: DateTime<Utc>, now: DateTime<Utc>) -> Option<u64> {
        if !self.timed {
            return None;
        }
        let elapsed = elapsed_whole_seconds(started_at, now);
        Some(self.total_limit_seconds().saturating_sub(elapsed))
    }
}

impl Default for ExamSettings {
    fn default() -> Self {
        Self {
            timed: true,
            time_limit: Self::DEFAULT_TIME_LIMIT,
            time_unit: TimeUnit::Minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn zero_limit_is_rejected() {
        assert_eq!(
            ExamSettings::timed(0, TimeUnit::Minutes),
            Err(ExamSettingsError::InvalidTimeLimit)
        );
    }

    #[test]
    fn remaining_time_is_derived_and_clamped() {
        let settings = ExamSettings::timed(1, TimeUnit::Hours).unwrap();
        let start = fixed_now();
        assert_eq!(settings.remaining_seconds(start, start), Some(3_600));
        assert_eq!(
            settings.remaining_seconds(start, start + Duration::milliseconds(1_500)),
            Some(3_599)
        );
        assert_eq!(
            settings.remaining_seconds(start, start + Duration::hours(2)),
            Some(0)
        );
    }

    #[test]
    fn untimed_has_no_remaining_time() {
        let start = fixed_now();
        assert_eq!(ExamSettings::untimed().remaining_seconds(start, start), None);
    }
}
