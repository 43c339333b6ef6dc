//! Terminal front end - command-line surface, dispatch, and text rendering.
//!
//! This layer plays the renderer/event role around the task book: it turns user
//! commands into model mutations and re-queries the model to print the result.

/// Command execution against a task book
pub mod commands;
/// Plain-text rendering of items, the pinned slot, and templates
pub mod render;

pub use commands::{execute, run};

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Local task tracker with recurring tasks and gem rewards.
#[derive(Parser, Debug, Clone)]
#[command(name = "task-buddy", version)]
pub struct Cli {
    /// Configuration file (defaults to ./task-buddy.toml when present)
    #[arg(long, global = true, env = "TASK_BUDDY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Data directory, overriding the configuration file
    #[arg(long, global = true, env = "TASK_BUDDY_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the ordered task list of a view
    List(ViewArgs),
    /// Show the most urgent open item across all views
    Pinned,
    /// Add a one-off task
    Add(NewTaskArgs),
    /// Add a recurring task template
    AddRecurring(NewTemplateArgs),
    /// Edit a one-off task; omitted options keep their current value
    Edit(EditTaskArgs),
    /// Edit a recurring template; omitted options keep their current value
    EditRecurring(EditTemplateArgs),
    /// Toggle completion of a task, or of a template for the current period
    Toggle {
        /// Task or template id
        id: String,
    },
    /// Delete a one-off task
    Delete {
        /// Task id
        id: String,
    },
    /// Delete a recurring template and all of its period history
    DeleteRecurring {
        /// Template id
        id: String,
    },
    /// List recurring templates, most recently updated first
    Templates,
    /// Adjust the coin counter
    #[command(subcommand)]
    Coins(CoinsAction),
    /// Show balances and counts
    Status,
    /// Re-render a view and the pinned item on an interval until interrupted
    Watch(ViewArgs),
}

/// View selection shared by `list` and `watch`.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewArgs {
    /// day, week, or month (defaults to the configured view)
    #[arg(long)]
    pub view: Option<String>,
}

/// Arguments of `add`.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct NewTaskArgs {
    /// Task title
    pub title: String,
    /// Notes
    #[arg(long, default_value = "")]
    pub memo: String,
    /// Due time: RFC 3339, or local "YYYY-MM-DDTHH:MM"
    #[arg(long)]
    pub due: Option<String>,
    /// Gem reward (0-100)
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub gem: String,
}

/// Arguments of `add-recurring`.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct NewTemplateArgs {
    /// Template title
    pub title: String,
    /// Notes
    #[arg(long, default_value = "")]
    pub memo: String,
    /// Recurrence: day, week, or month
    #[arg(long, default_value = "day")]
    pub every: String,
    /// Gem reward per period (0-100)
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub gem: String,
}

/// Arguments of `edit`.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct EditTaskArgs {
    /// Task id
    pub id: String,
    /// New title
    #[arg(long)]
    pub title: Option<String>,
    /// New notes
    #[arg(long)]
    pub memo: Option<String>,
    /// New due time; "none" clears it
    #[arg(long)]
    pub due: Option<String>,
    /// New gem reward
    #[arg(long, allow_hyphen_values = true)]
    pub gem: Option<String>,
}

/// Arguments of `edit-recurring`.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct EditTemplateArgs {
    /// Template id
    pub id: String,
    /// New title
    #[arg(long)]
    pub title: Option<String>,
    /// New notes
    #[arg(long)]
    pub memo: Option<String>,
    /// New recurrence
    #[arg(long)]
    pub every: Option<String>,
    /// New gem reward
    #[arg(long, allow_hyphen_values = true)]
    pub gem: Option<String>,
}

/// Coin counter adjustments.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CoinsAction {
    /// Overwrite the counter
    Set {
        /// New value
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Add to the counter
    Add {
        /// Amount to add
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Subtract from the counter, stopping at zero
    Sub {
        /// Amount to subtract
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
}
