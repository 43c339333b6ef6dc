//! Command execution - maps parsed commands onto task book operations.
//!
//! [`execute`] handles every one-shot command and returns the text to print, so the
//! whole surface is testable against a `MemoryStore` and a fixed clock. `watch` is
//! driven by [`watch`] because it needs the async runtime.

use super::{
    Cli, CoinsAction, Command, EditTaskArgs, EditTemplateArgs, NewTaskArgs, NewTemplateArgs,
    render::{render_header, render_list, render_pinned, render_templates},
};
use crate::{
    config::load_app_configuration,
    core::{TaskBook, TaskDraft, TemplateDraft, sanitize::lenient_int},
    entities::{ItemKind, RecurringType, View},
    errors::{Error, Result},
    store::{FileStore, KeyValueStore},
};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use std::{io::Write, time::Duration};
use tracing::{debug, error, info};

const LOCAL_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Parses a due time. Empty text and `none` mean "no due time"; RFC 3339 carries its
/// own offset; bare local date-times use the zone of `now`.
pub fn parse_due<Tz: TimeZone>(raw: &str, now: &DateTime<Tz>) -> Result<Option<DateTime<Utc>>> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("none") {
        return Ok(None);
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(instant.with_timezone(&Utc)));
    }

    LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .and_then(|naive| now.timezone().from_local_datetime(&naive).earliest())
        .map(|local| Some(local.with_timezone(&Utc)))
        .ok_or_else(|| Error::InvalidInput {
            message: format!("cannot read due time '{raw}'; use YYYY-MM-DDTHH:MM or RFC 3339"),
        })
}

fn resolve_view(requested: Option<&str>, default_view: View) -> View {
    requested.map_or(default_view, RecurringType::normalize)
}

fn add_task<S: KeyValueStore, Tz: TimeZone>(
    book: &mut TaskBook<S>,
    args: &NewTaskArgs,
    now: &DateTime<Tz>,
) -> Result<String> {
    let draft = TaskDraft {
        title: args.title.clone(),
        memo: args.memo.clone(),
        due_at: args.due.as_deref().map(|d| parse_due(d, now)).transpose()?.flatten(),
        gem: lenient_int(&args.gem),
    };
    let task = book.create_one_off(draft, now.with_timezone(&Utc))?;
    Ok(format!("Added task {} ({})", task.title, task.id))
}

fn add_template<S: KeyValueStore, Tz: TimeZone>(
    book: &mut TaskBook<S>,
    args: &NewTemplateArgs,
    now: &DateTime<Tz>,
) -> Result<String> {
    let draft = TemplateDraft {
        title: args.title.clone(),
        memo: args.memo.clone(),
        kind: RecurringType::normalize(&args.every),
        gem: lenient_int(&args.gem),
    };
    let template = book.create_template(draft, now.with_timezone(&Utc))?;
    Ok(format!(
        "Added recurring task {} <{}> ({})",
        template.title, template.kind, template.id
    ))
}

fn edit_task<S: KeyValueStore, Tz: TimeZone>(
    book: &mut TaskBook<S>,
    args: &EditTaskArgs,
    now: &DateTime<Tz>,
) -> Result<String> {
    let Some(current) = book.data().one_off(&args.id) else {
        return Ok(format!("No task with id {}", args.id));
    };

    let draft = TaskDraft {
        title: args.title.clone().unwrap_or_else(|| current.title.clone()),
        memo: args.memo.clone().unwrap_or_else(|| current.memo.clone()),
        due_at: match args.due.as_deref() {
            Some(raw) => parse_due(raw, now)?,
            None => current.due_at,
        },
        gem: args
            .gem
            .as_deref()
            .map_or_else(|| i64::from(current.gem), lenient_int),
    };

    book.edit_one_off(&args.id, draft, now.with_timezone(&Utc))?;
    Ok(format!("Updated task {}", args.id))
}

fn edit_template<S: KeyValueStore, Tz: TimeZone>(
    book: &mut TaskBook<S>,
    args: &EditTemplateArgs,
    now: &DateTime<Tz>,
) -> Result<String> {
    let Some(current) = book.data().template(&args.id) else {
        return Ok(format!("No recurring template with id {}", args.id));
    };

    let draft = TemplateDraft {
        title: args.title.clone().unwrap_or_else(|| current.title.clone()),
        memo: args.memo.clone().unwrap_or_else(|| current.memo.clone()),
        kind: args
            .every
            .as_deref()
            .map_or(current.kind, RecurringType::normalize),
        gem: args
            .gem
            .as_deref()
            .map_or_else(|| i64::from(current.gem), lenient_int),
    };

    book.edit_template(&args.id, draft, now.with_timezone(&Utc))?;
    Ok(format!("Updated recurring template {}", args.id))
}

fn toggle<S: KeyValueStore, Tz: TimeZone>(
    book: &mut TaskBook<S>,
    id: &str,
    now: &DateTime<Tz>,
) -> Result<String> {
    let Some(kind) = book.kind_of(id) else {
        return Ok(format!("No task or recurring template with id {id}"));
    };

    let message = match book.toggle_done(kind, id, now)? {
        Some(true) if kind == ItemKind::Recurring => "Done for this period",
        Some(true) => "Done",
        Some(false) => "Reopened",
        None => "Unchanged",
    };
    Ok(format!("{message}. {}", render_header(book.data())))
}

fn adjust_coins<S: KeyValueStore>(book: &mut TaskBook<S>, action: &CoinsAction) -> Result<String> {
    let current = i64::try_from(book.data().coins).unwrap_or(i64::MAX);
    let next = match action {
        CoinsAction::Set { value } => lenient_int(value),
        CoinsAction::Add { value } => current.saturating_add(lenient_int(value)),
        CoinsAction::Sub { value } => current.saturating_sub(lenient_int(value)).max(0),
    };
    let coins = book.set_coins(next)?;
    Ok(format!("coins: {coins}"))
}

fn status<S: KeyValueStore>(book: &TaskBook<S>) -> String {
    let data = book.data();
    let open = data.one_off_tasks.iter().filter(|t| !t.done).count();
    let mut out = format!(
        "{}\none-off tasks: {} ({open} open)\nrecurring templates: {}\nperiod records: {}",
        render_header(data),
        data.one_off_tasks.len(),
        data.recurring_templates.len(),
        data.recurring_states.len(),
    );
    if let Some(location) = book.store().location() {
        out.push_str(&format!("\nstored at: {location}"));
    }
    out
}

/// Renders the header, a view, and the pinned slot: the screen `list` and each
/// `watch` tick print.
pub fn render_screen<S: KeyValueStore, Tz: TimeZone>(
    book: &TaskBook<S>,
    view: View,
    now: &DateTime<Tz>,
) -> String {
    let at = now.with_timezone(&Utc);
    let pinned = book.pinned(now);
    let items = book.visible(view, now);
    format!(
        "{}\n{}\n{}",
        render_header(book.data()),
        render_pinned(pinned.as_ref(), at),
        render_list(view, &items, pinned.as_ref(), at)
    )
}

/// Executes a one-shot command and returns its output.
///
/// Unknown ids are reported in the output rather than as errors. `watch` is not a
/// one-shot command and yields [`Error::InvalidInput`]; drive it through [`watch`].
pub fn execute<S: KeyValueStore, Tz: TimeZone>(
    book: &mut TaskBook<S>,
    command: &Command,
    default_view: View,
    now: &DateTime<Tz>,
) -> Result<String> {
    debug!(?command, "executing command");
    match command {
        Command::List(args) => Ok(render_screen(
            book,
            resolve_view(args.view.as_deref(), default_view),
            now,
        )),
        Command::Pinned => Ok(render_pinned(
            book.pinned(now).as_ref(),
            now.with_timezone(&Utc),
        )),
        Command::Add(args) => add_task(book, args, now),
        Command::AddRecurring(args) => add_template(book, args, now),
        Command::Edit(args) => edit_task(book, args, now),
        Command::EditRecurring(args) => edit_template(book, args, now),
        Command::Toggle { id } => toggle(book, id, now),
        Command::Delete { id } => Ok(if book.delete_one_off(id)? {
            format!("Deleted task {id}. {}", render_header(book.data()))
        } else {
            format!("No task with id {id}")
        }),
        Command::DeleteRecurring { id } => Ok(if book.delete_template(id, now)? {
            format!("Deleted recurring template {id}. {}", render_header(book.data()))
        } else {
            format!("No recurring template with id {id}")
        }),
        Command::Templates => Ok(render_templates(&book.templates())),
        Command::Coins(action) => adjust_coins(book, action),
        Command::Status => Ok(status(book)),
        Command::Watch(_) => Err(Error::InvalidInput {
            message: "watch runs continuously and has no one-shot output".to_string(),
        }),
    }
}

/// Re-renders `view` every `tick` until Ctrl-C. Read-only: nothing is mutated or
/// written while watching.
pub async fn watch<S: KeyValueStore>(book: &TaskBook<S>, view: View, tick: Duration) -> Result<()> {
    let mut interval = tokio::time::interval(tick);
    let mut stdout = std::io::stdout();

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let screen = render_screen(book, view, &Local::now());
                // Clear the terminal and home the cursor before each frame
                write!(stdout, "\x1b[2J\x1b[H{screen}")?;
                stdout.flush()?;
            }
            result = tokio::signal::ctrl_c() => {
                result?;
                writeln!(stdout)?;
                return Ok(());
            }
        }
    }
}

/// Loads configuration and the stored task book, then runs `cli.command`.
pub async fn run(cli: Cli) -> Result<()> {
    let config = load_app_configuration(cli.config.as_deref(), cli.data_dir.clone())
        .inspect_err(|e| error!("Failed to load configuration: {e}"))?;
    let store = FileStore::open(&config.data_dir)
        .inspect_err(|e| error!("Failed to open data directory: {e}"))?;
    info!(data_dir = %config.data_dir.display(), "opened task store");

    let mut book = TaskBook::load(store, config.storage_keys(), Utc::now());

    match &cli.command {
        Command::Watch(args) => {
            let view = resolve_view(args.view.as_deref(), config.view());
            watch(&book, view, Duration::from_secs(config.tick_seconds)).await
        }
        command => {
            let output = execute(&mut book, command, config.view(), &Local::now())?;
            println!("{}", output.trim_end());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        cli::{Cli, ViewArgs},
        core::{StorageKeys, book::DEFAULT_STORAGE_KEY},
        store::MemoryStore,
        test_utils::{at_local, at_utc, book_with, empty_book, sample_one_off, sample_template},
    };
    use clap::Parser;

    fn run_args(book: &mut TaskBook<MemoryStore>, args: &[&str]) -> Result<String> {
        let mut argv = vec!["task-buddy"];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).unwrap();
        execute(book, &cli.command, View::Day, &at_local(2026, 2, 18, 12, 0))
    }

    #[test]
    fn test_parse_due_formats() {
        let now = at_local(2026, 2, 18, 12, 0);
        assert_eq!(parse_due("", &now).unwrap(), None);
        assert_eq!(parse_due("None", &now).unwrap(), None);
        assert_eq!(
            parse_due("2026-02-20T18:00", &now).unwrap(),
            Some(at_utc(2026, 2, 20, 9, 0))
        );
        assert_eq!(
            parse_due("2026-02-20 18:00", &now).unwrap(),
            Some(at_utc(2026, 2, 20, 9, 0))
        );
        assert_eq!(
            parse_due("2026-02-20T18:00:00Z", &now).unwrap(),
            Some(at_utc(2026, 2, 20, 18, 0))
        );
        assert!(matches!(
            parse_due("next friday", &now),
            Err(Error::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_add_coerces_gem_text() -> Result<()> {
        let mut book = empty_book();
        run_args(&mut book, &["add", "Read", "--gem", "abc"])?;
        run_args(&mut book, &["add", "Write", "--gem", "250"])?;
        run_args(&mut book, &["add", "Owe", "--gem", "-5"])?;

        let gems: Vec<u32> = book.data().one_off_tasks.iter().map(|t| t.gem).collect();
        assert_eq!(gems, vec![0, 100, 0]);
        Ok(())
    }

    #[test]
    fn test_add_recurring_and_toggle() -> Result<()> {
        let mut book = empty_book();
        run_args(&mut book, &["add-recurring", "Stretch", "--every", "week", "--gem", "4"])?;
        let id = book.data().recurring_templates[0].id.clone();
        assert_eq!(book.data().recurring_templates[0].kind, RecurringType::Week);

        let out = run_args(&mut book, &["toggle", &id])?;
        assert_eq!(out, "Done for this period. gems: 4  coins: 0");

        let out = run_args(&mut book, &["toggle", &id])?;
        assert_eq!(out, "Reopened. gems: 0  coins: 0");
        Ok(())
    }

    #[test]
    fn test_toggle_unknown_id_changes_nothing() -> Result<()> {
        let mut book = empty_book();
        let out = run_args(&mut book, &["toggle", "ghost"])?;
        assert_eq!(out, "No task or recurring template with id ghost");
        assert!(book.store().raw(DEFAULT_STORAGE_KEY).is_none());
        Ok(())
    }

    #[test]
    fn test_edit_keeps_unspecified_fields() -> Result<()> {
        let due = at_utc(2026, 2, 19, 0, 0);
        let mut book = book_with(|data| {
            let mut task = sample_one_off("t", Some(due), 6);
            task.memo = "keep me".to_string();
            data.one_off_tasks.push(task);
        });

        run_args(&mut book, &["edit", "t", "--title", "Renamed"])?;
        let task = book.data().one_off("t").unwrap();
        assert_eq!(task.title, "Renamed");
        assert_eq!(task.memo, "keep me");
        assert_eq!(task.due_at, Some(due));
        assert_eq!(task.gem, 6);

        run_args(&mut book, &["edit", "t", "--due", "none"])?;
        assert_eq!(book.data().one_off("t").unwrap().due_at, None);

        let out = run_args(&mut book, &["edit", "missing", "--title", "x"])?;
        assert_eq!(out, "No task with id missing");
        Ok(())
    }

    #[test]
    fn test_edit_recurring_changes_type() -> Result<()> {
        let mut book = book_with(|data| {
            data.recurring_templates.push(sample_template("r", RecurringType::Day, 2));
        });

        run_args(&mut book, &["edit-recurring", "r", "--every", "month"])?;
        let template = book.data().template("r").unwrap();
        assert_eq!(template.kind, RecurringType::Month);
        assert_eq!(template.gem, 2);
        Ok(())
    }

    #[test]
    fn test_delete_commands() -> Result<()> {
        let mut book = book_with(|data| {
            data.one_off_tasks.push(sample_one_off("t", None, 0));
            data.recurring_templates.push(sample_template("r", RecurringType::Day, 0));
        });

        assert_eq!(run_args(&mut book, &["delete", "t"])?, "Deleted task t. gems: 0  coins: 0");
        assert_eq!(run_args(&mut book, &["delete", "t"])?, "No task with id t");
        assert_eq!(
            run_args(&mut book, &["delete-recurring", "r"])?,
            "Deleted recurring template r. gems: 0  coins: 0"
        );
        Ok(())
    }

    #[test]
    fn test_coin_adjustments_clamp_at_zero() -> Result<()> {
        let mut book = empty_book();
        assert_eq!(run_args(&mut book, &["coins", "set", "50"])?, "coins: 50");
        assert_eq!(run_args(&mut book, &["coins", "add", "25"])?, "coins: 75");
        assert_eq!(run_args(&mut book, &["coins", "sub", "100"])?, "coins: 0");
        assert_eq!(run_args(&mut book, &["coins", "set", "-9"])?, "coins: 0");
        assert_eq!(run_args(&mut book, &["coins", "add", "lots"])?, "coins: 0");
        Ok(())
    }

    #[test]
    fn test_list_uses_requested_or_default_view() -> Result<()> {
        let mut book = book_with(|data| {
            data.recurring_templates.push(sample_template("w", RecurringType::Week, 0));
        });

        let day = run_args(&mut book, &["list"])?;
        assert!(day.contains("== DAY =="));
        assert!(day.contains("No tasks for this view."));

        let week = run_args(&mut book, &["list", "--view", "WEEK"])?;
        assert!(week.contains("== WEEK =="));
        assert!(week.contains("(w)"));

        let via_execute = execute(
            &mut book,
            &Command::List(ViewArgs::default()),
            View::Month,
            &at_local(2026, 2, 18, 12, 0),
        )?;
        assert!(via_execute.contains("== MONTH =="));
        Ok(())
    }

    #[test]
    fn test_watch_is_not_one_shot() {
        let mut book = empty_book();
        let result = run_args(&mut book, &["watch", "--view", "week"]);
        assert!(matches!(result, Err(Error::InvalidInput { .. })));
    }

    #[test]
    fn test_status_counts() -> Result<()> {
        let mut book = book_with(|data| {
            data.one_off_tasks.push(sample_one_off("a", None, 0));
            let mut done = sample_one_off("b", None, 0);
            done.done = true;
            data.one_off_tasks.push(done);
            data.gems = 3;
        });

        let out = run_args(&mut book, &["status"])?;
        assert_eq!(
            out,
            "gems: 3  coins: 0\none-off tasks: 2 (1 open)\nrecurring templates: 0\nperiod records: 0"
        );
        Ok(())
    }

    #[test]
    fn test_status_names_file_store_directory() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path())?;
        let mut book = TaskBook::load(store, StorageKeys::default(), at_utc(2026, 2, 18, 0, 0));

        let now = at_local(2026, 2, 18, 12, 0);
        let out = execute(&mut book, &Command::Status, View::Day, &now)?;
        assert!(out.ends_with(&format!("stored at: {}", dir.path().display())));
        Ok(())
    }
}
