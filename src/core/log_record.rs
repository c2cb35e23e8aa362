//! Log record structure

use super::failure_chain::FailureChain;
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::panic::Location;

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
    static THREAD_NAME_CACHE: RefCell<Option<Option<String>>> = const { RefCell::new(None) };
}

/// Get cached thread ID, computing and caching it on first access
fn get_thread_id() -> String {
    THREAD_ID_CACHE
        .try_with(|cache| {
            cache
                .borrow_mut()
                .get_or_insert_with(|| format!("{:?}", std::thread::current().id()))
                .clone()
        })
        .unwrap_or_else(|_| format!("{:?}", std::thread::current().id()))
}

/// Get cached thread name, computing and caching it on first access
fn get_thread_name() -> Option<String> {
    THREAD_NAME_CACHE
        .try_with(|cache| {
            cache
                .borrow_mut()
                .get_or_insert_with(|| std::thread::current().name().map(String::from))
                .clone()
        })
        .unwrap_or_else(|_| std::thread::current().name().map(String::from))
}

/// Replace newlines, carriage returns and tabs with escape sequences, and any
/// other control character with `\u{..}`
///
/// Keeps every record on one line so a message cannot forge extra entries.
pub(crate) fn sanitize_message(message: &str) -> String {
    if !message.chars().any(char::is_control) {
        return message.to_string();
    }
    let mut escaped = String::with_capacity(message.len() + 8);
    for c in message.chars() {
        match c {
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if c.is_control() => escaped.extend(c.escape_unicode()),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Immutable snapshot taken at the moment of a logging call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub logger: String,
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub module_path: Option<String>,
    pub thread_id: String,
    pub thread_name: Option<String>,
    /// Nested diagnostic context, outermost tag first
    pub ndc: Vec<String>,
    /// Mapped diagnostic context
    pub mdc: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureChain>,
}

impl LogRecord {
    /// Record on the calling thread with empty diagnostic context
    pub fn new(logger: impl Into<String>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            logger: logger.into(),
            level,
            message: sanitize_message(&message.into()),
            timestamp: Utc::now(),
            file: None,
            line: None,
            module_path: None,
            thread_id: get_thread_id(),
            thread_name: get_thread_name(),
            ndc: Vec::new(),
            mdc: HashMap::new(),
            failure: None,
        }
    }

    pub fn with_location(mut self, file: &str, line: u32, module_path: Option<&str>) -> Self {
        self.file = Some(file.to_string());
        self.line = Some(line);
        self.module_path = module_path.map(String::from);
        self
    }

    pub(crate) fn with_caller(self, caller: &Location<'_>, module_path: Option<&str>) -> Self {
        self.with_location(caller.file(), caller.line(), module_path)
    }

    pub fn with_diagnostics(mut self, ndc: Vec<String>, mdc: HashMap<String, String>) -> Self {
        self.ndc = ndc;
        self.mdc = mdc;
        self
    }

    pub fn with_failure(mut self, failure: FailureChain) -> Self {
        self.failure = Some(failure);
        self
    }

    /// NDC tags joined by spaces
    pub fn ndc_string(&self) -> String {
        self.ndc.join(" ")
    }

    pub fn mdc_value(&self, key: &str) -> Option<&str> {
        self.mdc.get(key).map(String::as_str)
    }

    /// Thread name when set, otherwise the thread id
    pub fn thread_label(&self) -> &str {
        self.thread_name.as_deref().unwrap_or(&self.thread_id)
    }
}
