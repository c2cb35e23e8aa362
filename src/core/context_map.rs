//! Mapped diagnostic context storage

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Per-thread key/value annotations copied into every record
///
/// Keys are unordered. Use [`mdc`](super::mdc) to reach the calling thread's
/// map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextMap {
    entries: HashMap<String, String>,
}

impl ContextMap {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Set a value, returning the one it replaced
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Remove a key; absent keys are ignored
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    /// Copy of the current entries, independent of later mutation
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.entries.clone()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl fmt::Display for ContextMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_pairs(&self.entries))
    }
}

/// Render entries as `key=value` pairs sorted by key
pub(crate) fn format_pairs(entries: &HashMap<String, String>) -> String {
    let mut pairs: Vec<_> = entries.iter().collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(" ")
}
