//! In-memory journal of committed transitions.
//!
//! Every committed state change is appended here, including the initial
//! commit made by `initiate` (recorded with no trigger and no source state).
//! The journal is a diagnostic record, not persistence: it lives and dies
//! with the machine.

use super::state::{State, Trigger};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single committed state change.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct JournalEntry<S: State, T: Trigger> {
    /// The trigger that caused the commit; `None` for the initiate commit.
    pub trigger: Option<T>,
    /// The state left behind; `None` for the initiate commit.
    pub from: Option<S>,
    /// The state committed.
    pub to: S,
    /// When the commit happened.
    pub at: DateTime<Utc>,
}

/// Ordered record of committed transitions.
///
/// The journal is immutable: `record` returns a new journal with the entry
/// appended, leaving the original untouched.
///
/// # Example
///
/// ```rust
/// use switchyard::core::{JournalEntry, TransitionJournal};
/// use switchyard::state_enum;
/// use chrono::Utc;
///
/// state_enum! {
///     enum Step { Start, End }
///     initial: [Start]
///     final: [End]
/// }
///
/// let journal: TransitionJournal<Step, String> = TransitionJournal::new();
/// let journal = journal.record(JournalEntry {
///     trigger: None,
///     from: None,
///     to: Step::Start,
///     at: Utc::now(),
/// });
///
/// assert_eq!(journal.len(), 1);
/// assert_eq!(journal.path(), vec![&Step::Start]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionJournal<S: State, T: Trigger> {
    entries: Vec<JournalEntry<S, T>>,
}

impl<S: State, T: Trigger> TransitionJournal<S, T> {
    /// Create an empty journal.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an entry, returning a new journal. The original is unchanged.
    pub fn record(&self, entry: JournalEntry<S, T>) -> Self {
        let mut entries = self.entries.clone();
        entries.push(entry);
        Self { entries }
    }

    /// The recorded entries, oldest first.
    pub fn entries(&self) -> &[JournalEntry<S, T>] {
        &self.entries
    }

    /// The sequence of committed states, oldest first.
    pub fn path(&self) -> Vec<&S> {
        self.entries.iter().map(|e| &e.to).collect()
    }

    /// The most recent entry, if any.
    pub fn last(&self) -> Option<&JournalEntry<S, T>> {
        self.entries.last()
    }

    /// Number of recorded commits.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been committed yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize the journal to a JSON string.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.entries)
    }
}

impl<S: State, T: Trigger> Default for TransitionJournal<S, T> {
    fn default() -> Self {
        Self::new()
    }
}
