//! Recurring template entity and its per-period completion state.
//!
//! Templates have no done flag of their own. Completion lives in
//! `AppData::recurring_states`, keyed by `"<templateId>:<periodKey>"`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Recurrence granularity of a template. The same three values name the list views.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecurringType {
    /// Resets every local calendar day
    #[default]
    Day,
    /// Resets every ISO week (Monday start)
    Week,
    /// Resets every local calendar month
    Month,
}

/// The active list view uses the same buckets as recurrence.
pub type View = RecurringType;

impl RecurringType {
    /// Interprets free text case-insensitively; anything unrecognized becomes `Day`.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "WEEK" => Self::Week,
            "MONTH" => Self::Month,
            _ => Self::Day,
        }
    }

    /// Uppercase wire name (`DAY`, `WEEK`, `MONTH`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "DAY",
            Self::Week => "WEEK",
            Self::Month => "MONTH",
        }
    }
}

impl fmt::Display for RecurringType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Definition of a repeating obligation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringTemplate {
    /// Opaque unique identifier
    pub id: String,
    /// Non-empty title
    pub title: String,
    /// Free-form notes
    #[serde(default)]
    pub memo: String,
    /// Recurrence bucket
    #[serde(rename = "type", default)]
    pub kind: RecurringType,
    /// Reward granted per completed period, within `0..=100`
    #[serde(default)]
    pub gem: u32,
    /// Creation instant
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// Last modification instant
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

/// Completion record for one template in one period.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringState {
    /// Whether the period is completed
    #[serde(default)]
    pub done: bool,
    /// When the period was marked done
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub done_at: Option<DateTime<Utc>>,
}

/// Builds the `recurringStates` map key for a template and period.
#[must_use]
pub fn state_key(template_id: &str, period_key: &str) -> String {
    format!("{template_id}:{period_key}")
}

/// Returns true when `key` was built by [`state_key`] for `template_id`.
///
/// Period keys never contain `:`, so the remainder after `"<id>:"` must be free of
/// colons. This keeps `"a:b:2026-02-18"` owned by template `a:b`, not `a`.
#[must_use]
pub fn state_belongs_to(key: &str, template_id: &str) -> bool {
    key.strip_prefix(template_id)
        .and_then(|rest| rest.strip_prefix(':'))
        .is_some_and(|period| !period.is_empty() && !period.contains(':'))
}
