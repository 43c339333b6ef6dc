//! Core business logic - the task/period model, independent of any front end.
//!
//! [`book::TaskBook`] owns the data and performs every mutation. The sibling
//! modules are pure functions over `AppData` and explicit instants.

/// Owned model instance with load, queries, and mutations
pub mod book;
/// Visible-item assembly, ordering, and pinned selection
pub mod items;
/// Period keys and view windows
pub mod period;
/// Countdown badge for due times
pub mod remaining;
/// Parse-and-validate of persisted blobs and legacy migration
pub mod sanitize;

pub use book::{StorageKeys, TaskBook, TaskDraft, TemplateDraft};
pub use items::{Scope, VisibleItem};
pub use period::{PeriodWindow, period_key, view_window};
pub use remaining::Remaining;
