use serde::{Deserialize, Serialize};

use crate::model::{HistoryItem, SearchMode};

pub const MAX_HISTORY_ITEMS: usize = 5;

/// The most recent distinct searches, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchHistory {
    items: Vec<HistoryItem>,
}

impl SearchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves `query` to the front, dropping any older entry with the same text.
    /// Blank queries are ignored and return `false`.
    pub fn record(&mut self, query: &str, mode: SearchMode) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return false;
        }
        self.items.retain(|item| item.query != query);
        self.items.insert(
            0,
            HistoryItem {
                query: query.to_string(),
                mode,
            },
        );
        self.items.truncate(MAX_HISTORY_ITEMS);
        true
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
