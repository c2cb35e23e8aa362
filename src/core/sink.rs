//! Sink trait for record consumers

use super::{error::Result, log_record::LogRecord};
use std::sync::Arc;

/// Consumer of log records
///
/// Sinks are shared between loggers and called concurrently from every
/// emitting thread, so implementations handle their own synchronization.
/// Errors and panics raised here are reported to the registry's error
/// handler and never reach the logging caller.
pub trait Sink: Send + Sync {
    /// Accept one record; the sink may keep the `Arc` or drop it
    fn deliver(&self, record: Arc<LogRecord>) -> Result<()>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}
