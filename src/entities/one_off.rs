//! One-off task entity - a single-occurrence to-do with an optional due instant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single-occurrence task.
///
/// `done_at` is set exactly when a toggle marks the task done and cleared when it is
/// un-done. Tasks migrated from the legacy list keep `done_at = None` even when done.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneOffTask {
    /// Opaque unique identifier
    pub id: String,
    /// Non-empty title
    pub title: String,
    /// Free-form notes
    #[serde(default)]
    pub memo: String,
    /// Optional due instant
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub due_at: Option<DateTime<Utc>>,
    /// Reward granted on completion, within `0..=100`
    #[serde(default)]
    pub gem: u32,
    /// Completion flag
    #[serde(default)]
    pub done: bool,
    /// Creation instant
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// Last modification instant
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    /// When the task was last marked done
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub done_at: Option<DateTime<Utc>>,
}

impl OneOffTask {
    /// A task is overdue while it is not done and its due instant lies before `now`.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.done && self.due_at.is_some_and(|due| due < now)
    }
}
