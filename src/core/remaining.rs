//! Countdown badge for one-off due times.

use chrono::{DateTime, Utc};
use std::fmt;

/// Time left until (or elapsed since) a due instant, split into display units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remaining {
    /// The due instant has passed
    pub overdue: bool,
    /// Whole days
    pub days: i64,
    /// Hours within the day
    pub hours: i64,
    /// Minutes within the hour
    pub minutes: i64,
    /// Seconds within the minute
    pub seconds: i64,
}

impl Remaining {
    /// Splits `|due - now|` into days, hours, minutes, and seconds.
    #[must_use]
    pub fn between(due: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let diff = due.signed_duration_since(now);
        let total = diff.num_seconds().unsigned_abs();
        let total = i64::try_from(total).unwrap_or(i64::MAX);

        Self {
            overdue: diff.num_milliseconds() < 0,
            days: total / 86_400,
            hours: (total % 86_400) / 3_600,
            minutes: (total % 3_600) / 60,
            seconds: total % 60,
        }
    }
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.overdue {
            f.write_str("overdue ")?;
        }
        write!(
            f,
            "{}d {}:{:02}:{:02}",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}
