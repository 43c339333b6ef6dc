//! Entity module - the persisted data schema of the task book.
//! One-off tasks, recurring templates with their per-period completion state,
//! and the `AppData` root that is serialized as a single JSON blob.

pub mod app_data;
pub mod one_off;
pub mod recurring;

pub use app_data::{AppData, CURRENT_VERSION};
pub use one_off::OneOffTask;
pub use recurring::{
    RecurringState, RecurringTemplate, RecurringType, View, state_belongs_to, state_key,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound of the per-item gem reward.
pub const MAX_GEM: u32 = 100;

/// Which collection an item lives in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemKind {
    /// A single-occurrence task from `oneOffTasks`
    OneOff,
    /// A recurring template from `recurringTemplates`
    Recurring,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneOff => f.write_str("ONE_OFF"),
            Self::Recurring => f.write_str("RECURRING"),
        }
    }
}

/// Clamps a raw reward value into `0..=MAX_GEM`.
#[must_use]
pub fn clamp_gem(raw: i64) -> u32 {
    u32::try_from(raw.clamp(0, i64::from(MAX_GEM))).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_gem_bounds() {
        assert_eq!(clamp_gem(-5), 0);
        assert_eq!(clamp_gem(0), 0);
        assert_eq!(clamp_gem(42), 42);
        assert_eq!(clamp_gem(100), 100);
        assert_eq!(clamp_gem(1_000), 100);
    }

    #[test]
    fn test_item_kind_serializes_screaming_snake() {
        let json = serde_json::to_string(&ItemKind::OneOff).unwrap_or_default();
        assert_eq!(json, "\"ONE_OFF\"");
        assert_eq!(ItemKind::Recurring.to_string(), "RECURRING");
    }
}
