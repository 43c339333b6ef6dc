//! Period bucketing - maps an instant to its day, ISO week, or month.
//!
//! All functions take the instant explicitly; nothing here reads the system clock.
//! The time zone of the supplied `DateTime` decides what "local" means, so callers
//! pass `Local::now()` in the app and fixed offsets in tests.

use crate::entities::RecurringType;
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};

/// A half-open `[start, end)` span of instants covering one view period.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeriodWindow {
    /// First instant of the period (local midnight)
    pub start: DateTime<Utc>,
    /// First instant after the period
    pub end: DateTime<Utc>,
    /// Period key of the bucket this window covers
    pub period_key: String,
}

impl PeriodWindow {
    /// Returns true when `at` falls inside `[start, end)`.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }
}

/// Computes the bucket key for `at` in the time zone it carries.
///
/// * `Day` → `YYYY-MM-DD`
/// * `Month` → `YYYY-MM`
/// * `Week` → `YYYY-Www` using ISO-8601 week numbering (Monday start, the week's
///   Thursday decides the owning year)
#[must_use]
pub fn period_key<Tz: TimeZone>(kind: RecurringType, at: &DateTime<Tz>) -> String {
    let date = at.date_naive();
    match kind {
        RecurringType::Day => format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day()),
        RecurringType::Month => format!("{:04}-{:02}", date.year(), date.month()),
        RecurringType::Week => {
            let week = date.iso_week();
            format!("{:04}-W{:02}", week.year(), week.week())
        }
    }
}

/// Computes the `[start, end)` window of the view containing `now`.
///
/// Day covers the local calendar day, Week runs Monday to Monday, Month covers the
/// calendar month. Bounds are local midnights; a midnight skipped by a DST jump
/// starts at the first valid local hour instead.
#[must_use]
pub fn view_window<Tz: TimeZone>(view: RecurringType, now: &DateTime<Tz>) -> PeriodWindow {
    let tz = now.timezone();
    let today = now.date_naive();

    let (first, next) = match view {
        RecurringType::Day => (today, add_days(today, 1)),
        RecurringType::Week => {
            let monday = today
                .checked_sub_days(Days::new(u64::from(today.weekday().num_days_from_monday())))
                .unwrap_or(today);
            (monday, add_days(monday, 7))
        }
        RecurringType::Month => {
            let first = NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today);
            let next = if today.month() == 12 {
                NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)
            }
            .unwrap_or(NaiveDate::MAX);
            (first, next)
        }
    };

    PeriodWindow {
        start: local_midnight(&tz, first),
        end: local_midnight(&tz, next),
        period_key: period_key(view, now),
    }
}

fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}

/// Resolves local midnight of `date` to an instant. Ambiguous midnights take the
/// earlier reading; a midnight skipped by a DST jump moves to the first valid hour.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let naive = NaiveDateTime::new(date, NaiveTime::MIN);
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            naive
                .checked_add_signed(TimeDelta::hours(1))
                .and_then(|shifted| tz.from_local_datetime(&shifted).earliest())
        })
        .map_or_else(|| naive.and_utc(), |t| t.with_timezone(&Utc))
}
