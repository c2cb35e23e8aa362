//! Fallback channel for faults inside the logging core
//!
//! Sink failures never reach the code that logged. They are handed to an
//! `ErrorHandler` instead; the default one writes to stderr.

use super::error::LoggerError;
use std::any::Any;
use std::sync::Arc;

/// Callback receiving faults the logging core swallowed
///
/// # Example
///
/// ```
/// use rust_diagnostic_logger::{ErrorHandler, LoggerError, LoggerRegistry};
/// use std::sync::Arc;
///
/// let handler: ErrorHandler = Arc::new(|err: &LoggerError| {
///     eprintln!("logging degraded: {}", err);
/// });
///
/// let registry = LoggerRegistry::builder().error_handler(handler).build()?;
/// # drop(registry);
/// # Ok::<(), LoggerError>(())
/// ```
pub type ErrorHandler = Arc<dyn Fn(&LoggerError) + Send + Sync>;

/// Handler that prints to stderr
pub fn stderr_handler() -> ErrorHandler {
    Arc::new(|err: &LoggerError| eprintln!("[LOGGER ERROR] {}", err))
}

/// Handler that discards everything
pub fn silent_handler() -> ErrorHandler {
    Arc::new(|_: &LoggerError| {})
}

/// Extract a printable message from a `catch_unwind` payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
