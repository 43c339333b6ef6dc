//! Parse-and-validate for persisted blobs of unknown shape.
//!
//! Every record goes through one explicit step that yields either a typed entity
//! or a [`Rejection`]. Field coercion rules live in [`Fields`] and nowhere else:
//! numbers fall back to zero, missing timestamps to `now`, unknown recurrence types
//! to `DAY`, and rewards are clamped to `0..=100`. A record without a usable `id`
//! or `title` is dropped rather than repaired.

use crate::entities::{
    AppData, OneOffTask, RecurringState, RecurringTemplate, RecurringType, clamp_gem,
};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Reason a raw record could not become a typed entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The record is not a JSON object
    #[error("record is not an object")]
    NotAnObject,
    /// A required identity field is absent, not text, or blank
    #[error("missing or invalid field '{field}'")]
    MissingField {
        /// Name of the offending field
        field: &'static str,
    },
}

/// Parses the leading integer of `raw` the way a lenient form field would:
/// optional surrounding whitespace, optional sign, then digits. Anything without
/// leading digits is zero; values beyond `i64` saturate.
#[must_use]
pub fn lenient_int(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    let mut seen_digit = false;
    for byte in digits.bytes().take_while(u8::is_ascii_digit) {
        seen_digit = true;
        value = value.saturating_mul(10).saturating_add(i64::from(byte - b'0'));
    }

    match (seen_digit, negative) {
        (false, _) => 0,
        (true, true) => -value,
        (true, false) => value,
    }
}

/// Read-only view over a JSON object with the coercion rules for each field shape.
struct Fields<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    fn of(value: &'a Value) -> Result<Self, Rejection> {
        value
            .as_object()
            .map(|map| Self { map })
            .ok_or(Rejection::NotAnObject)
    }

    /// Identity text: must be a non-blank JSON string.
    fn required_text(&self, field: &'static str) -> Result<String, Rejection> {
        match self.map.get(field) {
            Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
            _ => Err(Rejection::MissingField { field }),
        }
    }

    fn text_or_empty(&self, field: &str) -> String {
        match self.map.get(field) {
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        }
    }

    fn int_or_zero(&self, field: &str) -> i64 {
        match self.map.get(field) {
            Some(Value::Number(n)) => number_to_i64(n),
            Some(Value::String(s)) => lenient_int(s),
            _ => 0,
        }
    }

    fn count(&self, field: &str) -> u64 {
        u64::try_from(self.int_or_zero(field)).unwrap_or(0)
    }

    /// Truthiness of loosely typed flags.
    fn flag(&self, field: &str) -> bool {
        match self.map.get(field) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(_) | Value::Object(_)) => true,
        }
    }

    /// Epoch-millisecond instants. Only JSON numbers count.
    fn instant(&self, field: &str) -> Option<DateTime<Utc>> {
        match self.map.get(field) {
            Some(Value::Number(n)) => DateTime::from_timestamp_millis(number_to_i64(n)),
            _ => None,
        }
    }

    fn recurring_type(&self, field: &str) -> RecurringType {
        match self.map.get(field) {
            Some(Value::String(s)) => RecurringType::normalize(s),
            _ => RecurringType::Day,
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn number_to_i64(n: &serde_json::Number) -> i64 {
    n.as_i64()
        .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
        .unwrap_or(0)
}

fn parse_one_off(value: &Value, now: DateTime<Utc>) -> Result<OneOffTask, Rejection> {
    let fields = Fields::of(value)?;
    let done = fields.flag("done");
    Ok(OneOffTask {
        id: fields.required_text("id")?,
        title: fields.required_text("title")?,
        memo: fields.text_or_empty("memo"),
        due_at: fields.instant("dueAt"),
        gem: clamp_gem(fields.int_or_zero("gem")),
        done,
        created_at: fields.instant("createdAt").unwrap_or(now),
        updated_at: fields.instant("updatedAt").unwrap_or(now),
        done_at: fields.instant("doneAt").filter(|_| done),
    })
}

fn parse_template(value: &Value, now: DateTime<Utc>) -> Result<RecurringTemplate, Rejection> {
    let fields = Fields::of(value)?;
    Ok(RecurringTemplate {
        id: fields.required_text("id")?,
        title: fields.required_text("title")?,
        memo: fields.text_or_empty("memo"),
        kind: fields.recurring_type("type"),
        gem: clamp_gem(fields.int_or_zero("gem")),
        created_at: fields.instant("createdAt").unwrap_or(now),
        updated_at: fields.instant("updatedAt").unwrap_or(now),
    })
}

fn parse_state(value: &Value) -> Result<RecurringState, Rejection> {
    let fields = Fields::of(value)?;
    let done = fields.flag("done");
    Ok(RecurringState {
        done,
        done_at: fields.instant("doneAt").filter(|_| done),
    })
}

/// Items from the legacy flat list. Rewards and memos did not exist yet, and the
/// completion instant was never recorded.
fn parse_legacy_task(value: &Value, now: DateTime<Utc>) -> Result<OneOffTask, Rejection> {
    let fields = Fields::of(value)?;
    Ok(OneOffTask {
        id: fields.required_text("id")?,
        title: fields.required_text("title")?,
        memo: String::new(),
        due_at: fields.instant("dueAt"),
        gem: 0,
        done: fields.flag("done"),
        created_at: fields.instant("createdAt").unwrap_or(now),
        updated_at: fields.instant("updatedAt").unwrap_or(now),
        done_at: None,
    })
}

/// Keeps the records that validate, logging how many were dropped.
fn collect_valid<T>(
    records: Option<&Value>,
    what: &str,
    parse: impl Fn(&Value) -> Result<T, Rejection>,
) -> Vec<T> {
    let Some(Value::Array(items)) = records else {
        return Vec::new();
    };

    let mut kept = Vec::with_capacity(items.len());
    for item in items {
        match parse(item) {
            Ok(record) => kept.push(record),
            Err(reason) => warn!(%reason, "dropping invalid {what} record"),
        }
    }
    kept
}

/// Validates a current-schema document. Returns `None` when the value is not an
/// object at all; individual bad records inside it are dropped.
#[must_use]
pub fn parse_app_data(value: &Value, now: DateTime<Utc>) -> Option<AppData> {
    let fields = Fields::of(value).ok()?;
    let root = fields.map;

    let mut recurring_states = BTreeMap::new();
    if let Some(Value::Object(states)) = root.get("recurringStates") {
        for (key, raw) in states {
            if key.is_empty() {
                continue;
            }
            match parse_state(raw) {
                Ok(state) => {
                    recurring_states.insert(key.clone(), state);
                }
                Err(reason) => warn!(%reason, key, "dropping invalid recurring state"),
            }
        }
    }

    Some(AppData {
        gems: fields.count("gems"),
        coins: fields.count("coins"),
        one_off_tasks: collect_valid(root.get("oneOffTasks"), "one-off task", |v| {
            parse_one_off(v, now)
        }),
        recurring_templates: collect_valid(
            root.get("recurringTemplates"),
            "recurring template",
            |v| parse_template(v, now),
        ),
        recurring_states,
        ..AppData::default()
    })
}

/// Converts the legacy flat task array into a fresh current-schema document.
/// Returns `None` when the value is not an array.
#[must_use]
pub fn parse_legacy(value: &Value, now: DateTime<Utc>) -> Option<AppData> {
    if !value.is_array() {
        return None;
    }
    Some(AppData {
        one_off_tasks: collect_valid(Some(value), "legacy task", |v| parse_legacy_task(v, now)),
        ..AppData::default()
    })
}

/// Decodes serialized current-schema text. Malformed JSON is logged and treated as
/// absent data.
#[must_use]
pub fn decode_current(raw: &str, now: DateTime<Utc>) -> Option<AppData> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => {
            let data = parse_app_data(&value, now);
            if data.is_none() {
                warn!("stored task data is not a JSON object; ignoring it");
            }
            data
        }
        Err(e) => {
            warn!(error = %e, "stored task data is not valid JSON; ignoring it");
            None
        }
    }
}

/// Decodes serialized legacy-list text. Malformed JSON is logged and treated as
/// absent data.
#[must_use]
pub fn decode_legacy(raw: &str, now: DateTime<Utc>) -> Option<AppData> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => {
            let data = parse_legacy(&value, now);
            if let Some(d) = &data {
                debug!(tasks = d.one_off_tasks.len(), "parsed legacy task list");
            }
            data
        }
        Err(e) => {
            warn!(error = %e, "legacy task list is not valid JSON; ignoring it");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::at_utc;
    use serde_json::json;

    #[test]
    fn test_lenient_int() {
        assert_eq!(lenient_int("42"), 42);
        assert_eq!(lenient_int("  17 gems"), 17);
        assert_eq!(lenient_int("-8"), -8);
        assert_eq!(lenient_int("+3"), 3);
        assert_eq!(lenient_int("abc"), 0);
        assert_eq!(lenient_int(""), 0);
        assert_eq!(lenient_int("-"), 0);
        assert_eq!(lenient_int("99999999999999999999999"), i64::MAX);
    }

    #[test]
    fn test_parse_app_data_coerces_fields() {
        let now = at_utc(2026, 3, 1, 9, 0);
        let raw = json!({
            "version": 2,
            "gems": "12",
            "coins": -4,
            "oneOffTasks": [{
                "id": "t1",
                "title": "Pay rent",
                "memo": 7,
                "dueAt": "tomorrow",
                "gem": 250,
                "done": 1,
                "doneAt": 1_700_000_000_000_i64
            }],
            "recurringTemplates": [{
                "id": "r1",
                "title": "Stretch",
                "type": "fortnight",
                "gem": -3,
                "createdAt": 1_700_000_000_000_i64
            }],
            "recurringStates": {
                "r1:2026-03-01": { "done": true, "doneAt": 1_700_000_000_000_i64 },
                "r1:2026-02-28": "garbage",
                "": { "done": true }
            }
        });

        let data = parse_app_data(&raw, now).unwrap();
        assert_eq!(data.version, 2);
        assert_eq!(data.gems, 12);
        assert_eq!(data.coins, 0);

        let task = &data.one_off_tasks[0];
        assert_eq!(task.memo, "");
        assert_eq!(task.due_at, None);
        assert_eq!(task.gem, 100);
        assert!(task.done);
        assert_eq!(task.done_at, DateTime::from_timestamp_millis(1_700_000_000_000));
        assert_eq!(task.created_at, now);
        assert_eq!(task.updated_at, now);

        let template = &data.recurring_templates[0];
        assert_eq!(template.kind, RecurringType::Day);
        assert_eq!(template.gem, 0);
        assert_eq!(template.created_at, DateTime::from_timestamp_millis(1_700_000_000_000).unwrap());
        assert_eq!(template.updated_at, now);

        assert_eq!(data.recurring_states.len(), 1);
        assert!(data.recurring_states["r1:2026-03-01"].done);
    }

    #[test]
    fn test_records_without_identity_are_dropped() {
        let now = at_utc(2026, 3, 1, 9, 0);
        let raw = json!({
            "oneOffTasks": [
                { "id": "ok", "title": "Keep me" },
                { "title": "No id" },
                { "id": 5, "title": "Numeric id" },
                { "id": "blank", "title": "   " },
                "not an object"
            ],
            "recurringTemplates": [ { "id": "r1" } ]
        });

        let data = parse_app_data(&raw, now).unwrap();
        assert_eq!(data.one_off_tasks.len(), 1);
        assert_eq!(data.one_off_tasks[0].id, "ok");
        assert!(data.recurring_templates.is_empty());
    }

    #[test]
    fn test_not_done_task_drops_stray_done_at() {
        let now = at_utc(2026, 3, 1, 9, 0);
        let raw = json!({
            "oneOffTasks": [{ "id": "a", "title": "A", "done": false, "doneAt": 5 }]
        });
        let data = parse_app_data(&raw, now).unwrap();
        assert_eq!(data.one_off_tasks[0].done_at, None);
    }

    #[test]
    fn test_non_object_documents_are_rejected() {
        let now = at_utc(2026, 3, 1, 9, 0);
        assert!(parse_app_data(&json!([1, 2]), now).is_none());
        assert!(parse_app_data(&json!(null), now).is_none());
        assert!(parse_app_data(&json!("text"), now).is_none());
    }

    #[test]
    fn test_legacy_item_migrates_with_defaults() {
        let now = at_utc(2026, 3, 1, 9, 0);
        let raw = r#"[{"id":"a","title":"X","done":true,"createdAt":1,"updatedAt":1,"dueAt":null}]"#;

        let data = decode_legacy(raw, now).unwrap();
        assert_eq!(data.version, 2);
        assert_eq!(data.one_off_tasks.len(), 1);

        let task = &data.one_off_tasks[0];
        assert_eq!(task.id, "a");
        assert_eq!(task.title, "X");
        assert_eq!(task.memo, "");
        assert_eq!(task.gem, 0);
        assert!(task.done);
        assert_eq!(task.done_at, None);
        assert_eq!(task.due_at, None);
        assert_eq!(task.created_at, DateTime::from_timestamp_millis(1).unwrap());
    }

    #[test]
    fn test_decoders_swallow_corruption() {
        let now = at_utc(2026, 3, 1, 9, 0);
        assert!(decode_current("{not json", now).is_none());
        assert!(decode_legacy("[{", now).is_none());
        assert!(decode_legacy(r#"{"id":"a"}"#, now).is_none());
    }
}
