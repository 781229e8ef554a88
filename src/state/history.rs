//! Browser-history abstraction for search-params mode.
//!
//! The controller never touches a real location bar. It reads the current
//! query string from a [`History`] and hands back fully rendered query strings
//! together with [`WriteOptions`] describing how the navigation should happen.

use serde::{Deserialize, Serialize};

/// Whether a URL write adds a history entry or rewrites the current one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryMode {
    /// Add a new entry (back button returns to the previous view).
    Push,
    /// Rewrite the current entry.
    #[default]
    Replace,
}

/// How a URL write is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WriteOptions {
    /// Push or replace.
    pub history: HistoryMode,
    /// Update the URL only, without a full navigation / server round-trip.
    pub shallow: bool,
    /// Scroll to the top after navigating.
    pub scroll: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            history: HistoryMode::Replace,
            shallow: true,
            scroll: false,
        }
    }
}

/// Source and sink of the current location's query string.
pub trait History {
    /// Current query string, e.g. `?page=2` (empty when there is none).
    fn query(&self) -> String;

    /// Navigate to `query` (already rendered, leading `?` or empty).
    fn write(&mut self, query: String, options: WriteOptions);
}

/// One recorded history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Rendered query string.
    pub query: String,
    /// Options of the write that produced it (`None` for the initial entry).
    pub options: Option<WriteOptions>,
}

/// In-memory history stack.
///
/// Used by the command-line front end and by tests; records every write so
/// push/replace, shallow and scroll behavior can be asserted.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<HistoryEntry>,
    writes: usize,
}

impl MemoryHistory {
    /// History positioned at `initial_query`.
    pub fn new(initial_query: impl Into<String>) -> Self {
        Self {
            entries: vec![HistoryEntry {
                query: initial_query.into(),
                options: None,
            }],
            writes: 0,
        }
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Most recent entry.
    pub fn current(&self) -> &HistoryEntry {
        // `new` seeds one entry and nothing removes entries.
        &self.entries[self.entries.len() - 1]
    }

    /// Number of writes performed (push and replace alike).
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("")
    }
}

impl History for MemoryHistory {
    fn query(&self) -> String {
        self.current().query.clone()
    }

    fn write(&mut self, query: String, options: WriteOptions) {
        self.writes += 1;
        let entry = HistoryEntry {
            query,
            options: Some(options),
        };
        match options.history {
            HistoryMode::Push => self.entries.push(entry),
            HistoryMode::Replace => {
                let last = self.entries.len() - 1;
                self.entries[last] = entry;
            }
        }
    }
}

// ===== Tests =====
