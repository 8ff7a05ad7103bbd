//! Bounded history of submitted inputs.

use std::collections::VecDeque;

use serde::Serialize;

/// Maximum number of entries kept.
pub const RECENT_SEARCHES_CAPACITY: usize = 5;

/// Most-recent-first list of submitted inputs, capped at
/// [`RECENT_SEARCHES_CAPACITY`]. The oldest entry is evicted on overflow.
/// Repeated inputs are kept as separate entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecentSearches {
    entries: VecDeque<String>,
}

impl RecentSearches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts `entry` at the front, dropping the oldest entry if full.
    pub(crate) fn push(&mut self, entry: impl Into<String>) {
        self.entries.push_front(entry.into());
        self.entries.truncate(RECENT_SEARCHES_CAPACITY);
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }
}
