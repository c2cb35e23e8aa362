//! In-memory sink

use crate::core::{LogRecord, Result, Sink};
use parking_lot::Mutex;
use std::sync::Arc;

/// Keeps every delivered record, in delivery order
///
/// Meant for tests and for embedding applications that inspect records
/// themselves. Records are shared, not copied.
pub struct MemorySink {
    name: String,
    records: Mutex<Vec<Arc<LogRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::named("memory")
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn records(&self) -> Vec<Arc<LogRecord>> {
        self.records.lock().clone()
    }

    /// Messages only, in delivery order
    pub fn messages(&self) -> Vec<String> {
        self.records.lock().iter().map(|r| r.message.clone()).collect()
    }

    /// Remove and return everything captured so far
    pub fn drain(&self) -> Vec<Arc<LogRecord>> {
        std::mem::take(&mut *self.records.lock())
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for MemorySink {
    fn deliver(&self, record: Arc<LogRecord>) -> Result<()> {
        self.records.lock().push(record);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
