//! Shared test utilities for `task-buddy`.
//!
//! Fixed clocks, sample entities with sensible defaults, and task books backed by
//! a seeded `MemoryStore`.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{StorageKeys, TaskBook, book::DEFAULT_STORAGE_KEY},
    entities::{AppData, OneOffTask, RecurringTemplate, RecurringType},
    store::MemoryStore,
};
use chrono::{
    DateTime, FixedOffset, MappedLocalTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta,
    TimeZone, Utc,
};

/// UTC+09:00, a zone without DST so local midnights are unambiguous.
pub fn tokyo() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).unwrap()
}

/// A UTC instant at whole minutes.
pub fn at_utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
}

/// A local instant in [`tokyo`] at whole minutes.
pub fn at_local(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<FixedOffset> {
    tokyo()
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .unwrap()
}

/// A zone that springs forward at local midnight: UTC-03:00 until
/// 2026-03-08T03:00Z, UTC-02:00 afterwards. Local times from 2026-03-08 00:00 up to
/// 01:00 do not exist.
#[derive(Clone, Copy, Debug)]
pub struct MidnightGapZone;

impl MidnightGapZone {
    fn switch_utc() -> NaiveDateTime {
        at_utc(2026, 3, 8, 3, 0).naive_utc()
    }

    /// Skipped local span, `[00:00, 01:00)` on 2026-03-08.
    fn gap() -> (NaiveDateTime, NaiveDateTime) {
        let start = NaiveDate::from_ymd_opt(2026, 3, 8)
            .unwrap()
            .and_time(NaiveTime::MIN);
        (start, start + TimeDelta::hours(1))
    }

    fn before() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    fn after() -> FixedOffset {
        FixedOffset::west_opt(2 * 3600).unwrap()
    }
}

impl TimeZone for MidnightGapZone {
    type Offset = FixedOffset;

    fn from_offset(_offset: &FixedOffset) -> Self {
        Self
    }

    fn offset_from_local_date(&self, local: &NaiveDate) -> MappedLocalTime<FixedOffset> {
        self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
    }

    fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> MappedLocalTime<FixedOffset> {
        let (gap_start, gap_end) = Self::gap();
        if *local < gap_start {
            MappedLocalTime::Single(Self::before())
        } else if *local >= gap_end {
            MappedLocalTime::Single(Self::after())
        } else {
            MappedLocalTime::None
        }
    }

    fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
        self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
    }

    fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
        if *utc < Self::switch_utc() {
            Self::before()
        } else {
            Self::after()
        }
    }
}

/// Creation/update instant shared by all sample entities.
pub fn sample_time() -> DateTime<Utc> {
    at_utc(2026, 2, 18, 0, 0)
}

/// Creates an open one-off task.
///
/// # Defaults
/// * `title`: the id in uppercase
/// * `memo`: empty
/// * `created_at` / `updated_at`: [`sample_time`]
pub fn sample_one_off(id: &str, due_at: Option<DateTime<Utc>>, gem: u32) -> OneOffTask {
    OneOffTask {
        id: id.to_string(),
        title: id.to_uppercase(),
        memo: String::new(),
        due_at,
        gem,
        done: false,
        created_at: sample_time(),
        updated_at: sample_time(),
        done_at: None,
    }
}

/// Creates a recurring template with the same defaults as [`sample_one_off`].
pub fn sample_template(id: &str, kind: RecurringType, gem: u32) -> RecurringTemplate {
    RecurringTemplate {
        id: id.to_string(),
        title: id.to_uppercase(),
        memo: String::new(),
        kind,
        gem,
        created_at: sample_time(),
        updated_at: sample_time(),
    }
}

/// A task book over an empty in-memory store.
pub fn empty_book() -> TaskBook<MemoryStore> {
    TaskBook::load(MemoryStore::new(), StorageKeys::default(), sample_time())
}

/// A task book whose store already holds the data built by `seed`.
pub fn book_with(seed: impl FnOnce(&mut AppData)) -> TaskBook<MemoryStore> {
    let mut data = AppData::default();
    seed(&mut data);
    let json = serde_json::to_string(&data).unwrap();
    let store = MemoryStore::new().with_entry(DEFAULT_STORAGE_KEY, &json);
    TaskBook::load(store, StorageKeys::default(), sample_time())
}
