//! `AppData` - the root document owned by the task book.

use super::{OneOffTask, RecurringState, RecurringTemplate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Schema version written by this crate.
pub const CURRENT_VERSION: u32 = 2;

/// Everything persisted for one device, serialized in full after each mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    /// Schema version
    pub version: u32,
    /// Reward balance earned by completing tasks
    pub gems: u64,
    /// Manually tracked coin counter
    pub coins: u64,
    /// One-off tasks, newest first
    pub one_off_tasks: Vec<OneOffTask>,
    /// Recurring templates, newest first
    pub recurring_templates: Vec<RecurringTemplate>,
    /// Per-period completion keyed by `"<templateId>:<periodKey>"`
    pub recurring_states: BTreeMap<String, RecurringState>,
}

impl Default for AppData {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            gems: 0,
            coins: 0,
            one_off_tasks: Vec::new(),
            recurring_templates: Vec::new(),
            recurring_states: BTreeMap::new(),
        }
    }
}

impl AppData {
    /// Looks up a one-off task by id.
    #[must_use]
    pub fn one_off(&self, id: &str) -> Option<&OneOffTask> {
        self.one_off_tasks.iter().find(|t| t.id == id)
    }

    /// Looks up a recurring template by id.
    #[must_use]
    pub fn template(&self, id: &str) -> Option<&RecurringTemplate> {
        self.recurring_templates.iter().find(|t| t.id == id)
    }

    /// Adds a reward, saturating at the top of the range.
    pub fn award_gems(&mut self, amount: u32) {
        self.gems = self.gems.saturating_add(u64::from(amount));
    }

    /// Takes a reward back, clamping the balance at zero.
    pub fn revoke_gems(&mut self, amount: u32) {
        self.gems = self.gems.saturating_sub(u64::from(amount));
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_default_data_serializes_current_schema() {
        let json = serde_json::to_value(AppData::default()).unwrap();
        assert_eq!(json["version"], 2);
        assert_eq!(json["gems"], 0);
        assert_eq!(json["coins"], 0);
        assert!(json["oneOffTasks"].as_array().unwrap().is_empty());
        assert!(json["recurringTemplates"].as_array().unwrap().is_empty());
        assert!(json["recurringStates"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_revoke_gems_clamps_at_zero() {
        let mut data = AppData::default();
        data.award_gems(5);
        data.revoke_gems(8);
        assert_eq!(data.gems, 0);
    }
}
