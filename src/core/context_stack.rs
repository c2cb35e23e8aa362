//! Nested diagnostic context storage
//!
//! A `ContextStack` is a LIFO of string tags. Each thread owns exactly one,
//! reached through [`DiagnosticContext`](super::DiagnosticContext); the
//! [`ndc`](super::ndc) module is the usual way to touch it.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextStack {
    tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_depth: Option<usize>,
}

impl ContextStack {
    pub const fn new() -> Self {
        Self {
            tags: Vec::new(),
            max_depth: None,
        }
    }

    /// Push a tag on top of the stack
    pub fn push(&mut self, tag: impl Into<String>) {
        self.tags.push(tag.into());
    }

    /// Remove and return the most recently pushed tag
    ///
    /// Popping an empty stack is a no-op.
    pub fn pop(&mut self) -> Option<String> {
        self.tags.pop()
    }

    /// The most recently pushed tag
    pub fn peek(&self) -> Option<&str> {
        self.tags.last().map(String::as_str)
    }

    /// Snapshot of all tags, outermost first
    ///
    /// Honors the maximum depth: only the outermost `max_depth` tags are
    /// reported.
    pub fn peek_all(&self) -> Vec<String> {
        let visible = self.max_depth.unwrap_or(usize::MAX).min(self.tags.len());
        self.tags[..visible].to_vec()
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }

    /// Number of tags currently pushed
    pub fn depth(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Drop tags above `depth`; no-op when the stack is already shallower
    pub fn truncate(&mut self, depth: usize) {
        self.tags.truncate(depth);
    }

    /// Limit how many tags appear in snapshots (`None` = unlimited)
    pub fn set_max_depth(&mut self, max_depth: Option<usize>) {
        self.max_depth = max_depth;
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }
}

impl fmt::Display for ContextStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.peek_all().join(" "))
    }
}
