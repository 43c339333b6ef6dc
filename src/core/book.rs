//! The task book - single owner of `AppData` and the only writer to the store.
//!
//! Load once, query freely, and mutate through the methods below. Every mutation
//! that changes state re-serializes the whole document and writes it under the
//! current-schema key before returning. Operations naming an unknown id change
//! nothing and report `false` / `None`.

use crate::{
    core::{
        items::{Scope, VisibleItem, pinned_item, templates_by_recency, visible_items},
        period::period_key,
        sanitize::{decode_current, decode_legacy},
    },
    entities::{
        AppData, ItemKind, OneOffTask, RecurringState, RecurringTemplate, RecurringType, View,
        clamp_gem, state_belongs_to, state_key,
    },
    errors::{Error, Result},
    store::KeyValueStore,
};
use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, info, warn};
use ulid::Ulid;

/// Key under which the current schema is stored.
pub const DEFAULT_STORAGE_KEY: &str = "taskpwa.data.v2";
/// Key of the legacy flat task list, read only when the current key is absent.
pub const DEFAULT_LEGACY_STORAGE_KEY: &str = "taskpwa.tasks.v1";

/// Store keys used by a task book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    /// Current-schema key
    pub current: String,
    /// Legacy-list key
    pub legacy: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            current: DEFAULT_STORAGE_KEY.to_string(),
            legacy: DEFAULT_LEGACY_STORAGE_KEY.to_string(),
        }
    }
}

/// User input for creating or editing a one-off task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    /// Title, trimmed before use; must not be blank
    pub title: String,
    /// Notes
    pub memo: String,
    /// Due instant, `None` for undated tasks
    pub due_at: Option<DateTime<Utc>>,
    /// Requested reward, clamped to `0..=100`
    pub gem: i64,
}

/// User input for creating or editing a recurring template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateDraft {
    /// Title, trimmed before use; must not be blank
    pub title: String,
    /// Notes
    pub memo: String,
    /// Recurrence bucket
    pub kind: RecurringType,
    /// Requested reward, clamped to `0..=100`
    pub gem: i64,
}

fn checked_title(raw: &str) -> Result<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(Error::EmptyTitle);
    }
    Ok(title.to_string())
}

/// Owned model instance bound to a key-value store.
#[derive(Debug)]
pub struct TaskBook<S: KeyValueStore> {
    store: S,
    keys: StorageKeys,
    data: AppData,
}

impl<S: KeyValueStore> TaskBook<S> {
    /// Loads the book from `store`.
    ///
    /// Tries the current-schema key first. When it is absent or unusable, the legacy
    /// list is migrated and immediately written under the current key. When neither
    /// yields data the book starts empty. Read failures and corrupt blobs are logged
    /// and never returned.
    pub fn load(store: S, keys: StorageKeys, now: DateTime<Utc>) -> Self {
        let mut book = Self {
            store,
            keys,
            data: AppData::default(),
        };

        if let Some(data) = book.read(&book.keys.current).and_then(|raw| decode_current(&raw, now)) {
            debug!(
                one_off = data.one_off_tasks.len(),
                templates = data.recurring_templates.len(),
                "loaded task data"
            );
            book.data = data;
            return book;
        }

        if let Some(data) = book.read(&book.keys.legacy).and_then(|raw| decode_legacy(&raw, now)) {
            info!(tasks = data.one_off_tasks.len(), "migrated legacy task list");
            book.data = data;
            if let Err(e) = book.save() {
                warn!(error = %e, "failed to persist migrated task data");
            }
            return book;
        }

        debug!("no stored task data; starting empty");
        book
    }

    fn read(&self, key: &str) -> Option<String> {
        self.store
            .get(key)
            .inspect_err(|e| warn!(error = %e, key, "failed to read store entry"))
            .ok()
            .flatten()
    }

    /// Serializes the whole document under the current-schema key.
    pub fn save(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.data)?;
        self.store.set(&self.keys.current, &json)
    }

    /// Read-only view of the document.
    #[must_use]
    pub const fn data(&self) -> &AppData {
        &self.data
    }

    /// The backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Ordered items for one view at `now`.
    #[must_use]
    pub fn visible<Tz: TimeZone>(&self, view: View, now: &DateTime<Tz>) -> Vec<VisibleItem> {
        visible_items(&self.data, Scope::View(view), now)
    }

    /// Most urgent open item across all views.
    #[must_use]
    pub fn pinned<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<VisibleItem> {
        pinned_item(&self.data, now)
    }

    /// Recurring templates, most recently updated first.
    #[must_use]
    pub fn templates(&self) -> Vec<&RecurringTemplate> {
        templates_by_recency(&self.data)
    }

    /// Resolves which collection holds `id`, checking one-off tasks first.
    #[must_use]
    pub fn kind_of(&self, id: &str) -> Option<ItemKind> {
        if self.data.one_off(id).is_some() {
            Some(ItemKind::OneOff)
        } else if self.data.template(id).is_some() {
            Some(ItemKind::Recurring)
        } else {
            None
        }
    }

    /// Flips completion of a one-off task, or of a template's current period.
    ///
    /// Completing awards the item's gems; un-completing takes them back, never
    /// letting the balance drop below zero. Returns the new done state, or `None`
    /// when no item of `kind` has this id.
    pub fn toggle_done<Tz: TimeZone>(
        &mut self,
        kind: ItemKind,
        id: &str,
        now: &DateTime<Tz>,
    ) -> Result<Option<bool>> {
        let at = now.with_timezone(&Utc);

        let (done, gem) = match kind {
            ItemKind::OneOff => {
                let Some(task) = self.data.one_off_tasks.iter_mut().find(|t| t.id == id) else {
                    return Ok(None);
                };
                task.done = !task.done;
                task.updated_at = at;
                task.done_at = task.done.then_some(at);
                (task.done, task.gem)
            }
            ItemKind::Recurring => {
                let Some(template) = self.data.template(id) else {
                    return Ok(None);
                };
                let gem = template.gem;
                let key = state_key(&template.id, &period_key(template.kind, now));
                let done = !self.data.recurring_states.get(&key).is_some_and(|s| s.done);
                self.data.recurring_states.insert(
                    key,
                    RecurringState {
                        done,
                        done_at: done.then_some(at),
                    },
                );
                (done, gem)
            }
        };

        if done {
            self.data.award_gems(gem);
        } else {
            self.data.revoke_gems(gem);
        }
        info!(%kind, id, done, gems = self.data.gems, "toggled completion");

        self.save()?;
        Ok(Some(done))
    }

    /// Adds a one-off task at the front of the list.
    pub fn create_one_off(&mut self, draft: TaskDraft, now: DateTime<Utc>) -> Result<OneOffTask> {
        let task = OneOffTask {
            id: Ulid::new().to_string(),
            title: checked_title(&draft.title)?,
            memo: draft.memo,
            due_at: draft.due_at,
            gem: clamp_gem(draft.gem),
            done: false,
            created_at: now,
            updated_at: now,
            done_at: None,
        };

        self.data.one_off_tasks.insert(0, task.clone());
        info!(id = %task.id, "created one-off task");
        self.save()?;
        Ok(task)
    }

    /// Replaces title, memo, due time, and reward of a one-off task. Completion is
    /// left as it is.
    pub fn edit_one_off(&mut self, id: &str, draft: TaskDraft, now: DateTime<Utc>) -> Result<bool> {
        let title = checked_title(&draft.title)?;
        let Some(task) = self.data.one_off_tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };

        task.title = title;
        task.memo = draft.memo;
        task.due_at = draft.due_at;
        task.gem = clamp_gem(draft.gem);
        task.updated_at = now;

        info!(id, "edited one-off task");
        self.save()?;
        Ok(true)
    }

    /// Removes a one-off task, taking back its reward if it was done.
    pub fn delete_one_off(&mut self, id: &str) -> Result<bool> {
        let Some(index) = self.data.one_off_tasks.iter().position(|t| t.id == id) else {
            return Ok(false);
        };

        let task = self.data.one_off_tasks.remove(index);
        if task.done {
            self.data.revoke_gems(task.gem);
        }

        info!(id, was_done = task.done, "deleted one-off task");
        self.save()?;
        Ok(true)
    }

    /// Adds a recurring template at the front of the list.
    pub fn create_template(
        &mut self,
        draft: TemplateDraft,
        now: DateTime<Utc>,
    ) -> Result<RecurringTemplate> {
        let template = RecurringTemplate {
            id: Ulid::new().to_string(),
            title: checked_title(&draft.title)?,
            memo: draft.memo,
            kind: draft.kind,
            gem: clamp_gem(draft.gem),
            created_at: now,
            updated_at: now,
        };

        self.data.recurring_templates.insert(0, template.clone());
        info!(id = %template.id, kind = %template.kind, "created recurring template");
        self.save()?;
        Ok(template)
    }

    /// Replaces title, memo, recurrence, and reward of a template. Existing period
    /// states are kept.
    pub fn edit_template(
        &mut self,
        id: &str,
        draft: TemplateDraft,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let title = checked_title(&draft.title)?;
        let Some(template) = self.data.recurring_templates.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };

        template.title = title;
        template.memo = draft.memo;
        template.kind = draft.kind;
        template.gem = clamp_gem(draft.gem);
        template.updated_at = now;

        info!(id, "edited recurring template");
        self.save()?;
        Ok(true)
    }

    /// Removes a template and every period state recorded for it.
    ///
    /// Only the current period's completion is reversed in the gem balance; rewards
    /// from earlier periods stay earned.
    pub fn delete_template<Tz: TimeZone>(&mut self, id: &str, now: &DateTime<Tz>) -> Result<bool> {
        let Some(index) = self.data.recurring_templates.iter().position(|t| t.id == id) else {
            return Ok(false);
        };

        let template = self.data.recurring_templates.remove(index);
        let current = state_key(&template.id, &period_key(template.kind, now));
        if self.data.recurring_states.get(&current).is_some_and(|s| s.done) {
            self.data.revoke_gems(template.gem);
        }

        let before = self.data.recurring_states.len();
        self.data
            .recurring_states
            .retain(|key, _| !state_belongs_to(key, &template.id));

        info!(
            id,
            purged_states = before - self.data.recurring_states.len(),
            "deleted recurring template"
        );
        self.save()?;
        Ok(true)
    }

    /// Overwrites the coin counter. Negative values become zero.
    pub fn set_coins(&mut self, value: i64) -> Result<u64> {
        self.data.coins = u64::try_from(value).unwrap_or(0);
        info!(coins = self.data.coins, "set coins");
        self.save()?;
        Ok(self.data.coins)
    }
}
