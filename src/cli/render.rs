//! Plain-text rendering. Every function returns a `String` so output can be
//! asserted on directly.

use crate::{
    core::{Remaining, VisibleItem},
    entities::{AppData, ItemKind, RecurringTemplate, View},
};
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// One-line balance header.
#[must_use]
pub fn render_header(data: &AppData) -> String {
    format!("gems: {}  coins: {}", data.gems, data.coins)
}

/// Status badge of an item: countdown for open dated tasks, "done" for finished
/// dated tasks, the recurrence for templates, nothing otherwise.
fn badge(item: &VisibleItem, now: DateTime<Utc>) -> Option<String> {
    match (item.kind, item.due_at) {
        (ItemKind::Recurring, _) => item
            .recurring_type
            .map(|kind| format!("recurring ({kind})")),
        (ItemKind::OneOff, Some(due)) if !item.done => Some(Remaining::between(due, now).to_string()),
        (ItemKind::OneOff, Some(_)) => Some("done".to_string()),
        (ItemKind::OneOff, None) => None,
    }
}

/// One list row. `focused` marks the row that also occupies the pinned slot.
#[must_use]
pub fn render_item(item: &VisibleItem, focused: bool, now: DateTime<Utc>) -> String {
    let mut line = format!(
        "{} [{}] {}",
        if focused { '>' } else { ' ' },
        if item.done { 'x' } else { ' ' },
        item.title
    );
    if let Some(badge) = badge(item, now) {
        let _ = write!(line, "  <{badge}>");
    }
    let _ = write!(line, "  gem {}  ({})", item.gem, item.id);
    line
}

/// Full list for a view, or an empty-state hint.
#[must_use]
pub fn render_list(
    view: View,
    items: &[VisibleItem],
    pinned: Option<&VisibleItem>,
    now: DateTime<Utc>,
) -> String {
    let mut out = format!("== {view} ==\n");
    if items.is_empty() {
        out.push_str("  No tasks for this view.\n");
        return out;
    }

    let focus_key = pinned.map(|p| p.key.as_str());
    for item in items {
        out.push_str(&render_item(item, focus_key == Some(item.key.as_str()), now));
        out.push('\n');
    }
    out
}

/// The pinned slot: the item plus its countdown, recurrence, or reward.
#[must_use]
pub fn render_pinned(pinned: Option<&VisibleItem>, now: DateTime<Utc>) -> String {
    let Some(item) = pinned else {
        return "Nothing pending.".to_string();
    };

    let meta = match (item.kind, item.due_at) {
        (ItemKind::OneOff, Some(due)) => Remaining::between(due, now).to_string(),
        (ItemKind::Recurring, _) => item
            .recurring_type
            .map_or_else(String::new, |kind| format!("recurring ({kind})")),
        (ItemKind::OneOff, None) => format!("gem {}", item.gem),
    };
    format!("Next: {}  <{meta}>  ({})", item.title, item.id)
}

/// Settings-style listing of templates.
#[must_use]
pub fn render_templates(templates: &[&RecurringTemplate]) -> String {
    if templates.is_empty() {
        return "No recurring templates.\n".to_string();
    }

    let mut out = String::new();
    for template in templates {
        let _ = writeln!(
            out,
            "{}  <{}>  gem {}  ({})",
            template.title, template.kind, template.gem, template.id
        );
    }
    out
}
