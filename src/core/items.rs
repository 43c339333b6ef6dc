//! Visible-item assembly and ordering.
//!
//! This module turns `AppData` into the flat, ordered list a renderer shows for one
//! view, and picks the single pinned item across all views. Everything here is a
//! pure function of the data and the supplied instant.

use crate::{
    core::period::{period_key, view_window},
    entities::{AppData, ItemKind, RecurringTemplate, RecurringType, View, state_key},
};
use chrono::{DateTime, TimeZone, Utc};
use std::cmp::Ordering;

/// Which items to assemble.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    /// Items belonging to one view, filtered by its time window
    View(View),
    /// Every template and every one-off task, unfiltered (pinned selection)
    All,
}

/// One displayable row, flattened from either a one-off task or a template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibleItem {
    /// Stable display key: `O:<id>` or `R:<id>:<periodKey>`
    pub key: String,
    /// Source collection
    pub kind: ItemKind,
    /// Id of the task or template
    pub id: String,
    /// Title
    pub title: String,
    /// Notes
    pub memo: String,
    /// Recurrence bucket, for recurring items only
    pub recurring_type: Option<RecurringType>,
    /// Completion, for recurring items scoped to the current period
    pub done: bool,
    /// Reward value
    pub gem: u32,
    /// Due instant, one-off tasks only
    pub due_at: Option<DateTime<Utc>>,
    /// Not done and past due; never set for recurring items
    pub overdue: bool,
    /// Last modification of the underlying task or template
    pub updated_at: DateTime<Utc>,
}

fn recurring_item<Tz: TimeZone>(
    data: &AppData,
    template: &RecurringTemplate,
    now: &DateTime<Tz>,
) -> VisibleItem {
    let period = period_key(template.kind, now);
    let done = data
        .recurring_states
        .get(&state_key(&template.id, &period))
        .is_some_and(|state| state.done);

    VisibleItem {
        key: format!("R:{}:{period}", template.id),
        kind: ItemKind::Recurring,
        id: template.id.clone(),
        title: template.title.clone(),
        memo: template.memo.clone(),
        recurring_type: Some(template.kind),
        done,
        gem: template.gem,
        due_at: None,
        overdue: false,
        updated_at: template.updated_at,
    }
}

/// Assembles the items for `scope`, ordered by [`compare_visible`].
///
/// In a view scope, templates of other recurrence types are skipped, one-off tasks
/// without a due time appear only in the day view, and dated tasks appear only
/// when their due time falls inside the view's window. The day view also carries
/// open tasks whose due time passed before today, so nothing overdue drops out of
/// sight.
#[must_use]
pub fn visible_items<Tz: TimeZone>(data: &AppData, scope: Scope, now: &DateTime<Tz>) -> Vec<VisibleItem> {
    let now_utc = now.with_timezone(&Utc);
    let window = match scope {
        Scope::View(view) => Some((view, view_window(view, now))),
        Scope::All => None,
    };

    let mut items: Vec<VisibleItem> = data
        .recurring_templates
        .iter()
        .filter(|t| window.as_ref().is_none_or(|(view, _)| t.kind == *view))
        .map(|t| recurring_item(data, t, now))
        .collect();

    items.extend(
        data.one_off_tasks
            .iter()
            .filter(|t| match (&window, t.due_at) {
                (None, _) => true,
                (Some((view, _)), None) => *view == RecurringType::Day,
                (Some((view, span)), Some(due)) => {
                    span.contains(due)
                        || (*view == RecurringType::Day && !t.done && due < span.start)
                }
            })
            .map(|t| VisibleItem {
                key: format!("O:{}", t.id),
                kind: ItemKind::OneOff,
                id: t.id.clone(),
                title: t.title.clone(),
                memo: t.memo.clone(),
                recurring_type: None,
                done: t.done,
                gem: t.gem,
                due_at: t.due_at,
                overdue: t.is_overdue(now_utc),
                updated_at: t.updated_at,
            }),
    );

    items.sort_by(compare_visible);
    items
}

/// Earlier due first; items without a due time sort last.
fn compare_due(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_kind(a: ItemKind, b: ItemKind) -> Ordering {
    match (a, b) {
        (ItemKind::Recurring, ItemKind::OneOff) => Ordering::Less,
        (ItemKind::OneOff, ItemKind::Recurring) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// Display order: open before done, overdue first, soonest due, recurring before
/// undated one-offs, then most recently updated.
#[must_use]
pub fn compare_visible(a: &VisibleItem, b: &VisibleItem) -> Ordering {
    a.done
        .cmp(&b.done)
        .then_with(|| b.overdue.cmp(&a.overdue))
        .then_with(|| compare_due(a.due_at, b.due_at))
        .then_with(|| compare_kind(a.kind, b.kind))
        .then_with(|| b.updated_at.cmp(&a.updated_at))
}

/// Urgency order used for the pinned slot: overdue first, soonest due, recurring
/// before one-off.
fn compare_urgency(a: &VisibleItem, b: &VisibleItem) -> Ordering {
    b.overdue
        .cmp(&a.overdue)
        .then_with(|| compare_due(a.due_at, b.due_at))
        .then_with(|| compare_kind(a.kind, b.kind))
}

/// Picks the most urgent open item across every view, or `None` when everything
/// is done.
#[must_use]
pub fn pinned_item<Tz: TimeZone>(data: &AppData, now: &DateTime<Tz>) -> Option<VisibleItem> {
    visible_items(data, Scope::All, now)
        .into_iter()
        .filter(|item| !item.done)
        .min_by(compare_urgency)
}

/// All recurring templates, most recently updated first.
#[must_use]
pub fn templates_by_recency(data: &AppData) -> Vec<&RecurringTemplate> {
    let mut templates: Vec<&RecurringTemplate> = data.recurring_templates.iter().collect();
    templates.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    templates
}
