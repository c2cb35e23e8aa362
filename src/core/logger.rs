//! Logger handle: level gate, record construction and sink delivery

use super::{
    diagnostic_context::DiagnosticContext,
    error::{LoggerError, Result},
    error_handler::{panic_message, ErrorHandler},
    failure_chain::FailureChain,
    log_level::LogLevel,
    log_record::LogRecord,
    metrics::LoggerMetrics,
    sink::Sink,
};
use parking_lot::RwLock;
use std::error::Error;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe, Location};
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

/// State shared by every logger of one registry
pub(crate) struct SharedState {
    pub(crate) metrics: LoggerMetrics,
    pub(crate) error_handler: RwLock<ErrorHandler>,
    pub(crate) max_failure_depth: AtomicUsize,
}

impl SharedState {
    pub(crate) fn new(error_handler: ErrorHandler, max_failure_depth: usize) -> Self {
        Self {
            metrics: LoggerMetrics::new(),
            error_handler: RwLock::new(error_handler),
            max_failure_depth: AtomicUsize::new(max_failure_depth),
        }
    }

    /// Hand a swallowed fault to the error handler
    ///
    /// A panicking handler is contained as well; the fault is then lost.
    fn report(&self, err: LoggerError) {
        let handler = Arc::clone(&*self.error_handler.read());
        let _ = catch_unwind(AssertUnwindSafe(|| handler(&err)));
    }
}

/// Named logging handle obtained from a [`LoggerRegistry`](super::LoggerRegistry)
///
/// Loggers live as long as their registry and are shared as `Arc<Logger>`.
/// Emission methods never fail and never panic because of a sink.
///
/// # Example
///
/// ```
/// use rust_diagnostic_logger::prelude::*;
/// use std::sync::Arc;
///
/// let registry = LoggerRegistry::new();
/// let memory = Arc::new(MemorySink::new());
/// registry.root().add_sink(memory.clone());
///
/// let log = registry.get_logger("ConsoleApp.LoggingExample")?;
/// log.info("Application [ConsoleApp] Start");
/// log.debug("hidden: root level defaults to INFO");
///
/// assert_eq!(memory.len(), 1);
/// # Ok::<(), LoggerError>(())
/// ```
pub struct Logger {
    name: String,
    is_root: bool,
    effective_level: AtomicU8,
    additive: AtomicBool,
    parent: RwLock<Option<Arc<Logger>>>,
    sinks: RwLock<Vec<Arc<dyn Sink>>>,
    shared: Arc<SharedState>,
}

impl Logger {
    pub(crate) fn new(
        name: String,
        is_root: bool,
        level: LogLevel,
        parent: Option<Arc<Logger>>,
        shared: Arc<SharedState>,
    ) -> Self {
        Self {
            name,
            is_root,
            effective_level: AtomicU8::new(level as u8),
            additive: AtomicBool::new(true),
            parent: RwLock::new(parent),
            sinks: RwLock::new(Vec::new()),
            shared,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }

    /// Level currently enforced, inherited or explicit
    #[inline]
    pub fn effective_level(&self) -> LogLevel {
        LogLevel::from_u8(self.effective_level.load(Ordering::Acquire))
    }

    pub(crate) fn set_effective_level(&self, level: LogLevel) {
        self.effective_level.store(level as u8, Ordering::Release);
    }

    /// Level gate; a single atomic load
    #[inline]
    pub fn is_enabled_for(&self, level: LogLevel) -> bool {
        level as u8 >= self.effective_level.load(Ordering::Acquire)
    }

    /// Nearest existing ancestor; `None` only for the root
    pub fn parent(&self) -> Option<Arc<Logger>> {
        self.parent.read().clone()
    }

    pub(crate) fn set_parent(&self, parent: Arc<Logger>) {
        *self.parent.write() = Some(parent);
    }

    pub fn add_sink(&self, sink: Arc<dyn Sink>) {
        self.sinks.write().push(sink);
    }

    /// Detach every sink with the given name; returns whether any matched
    pub fn remove_sink(&self, name: &str) -> bool {
        let mut sinks = self.sinks.write();
        let before = sinks.len();
        sinks.retain(|sink| sink.name() != name);
        sinks.len() != before
    }

    pub fn clear_sinks(&self) {
        self.sinks.write().clear();
    }

    /// Sinks attached directly to this logger, in attachment order
    pub fn sinks(&self) -> Vec<Arc<dyn Sink>> {
        self.sinks.read().clone()
    }

    /// Whether records also flow to ancestor sinks
    pub fn is_additive(&self) -> bool {
        self.additive.load(Ordering::Acquire)
    }

    pub fn set_additive(&self, additive: bool) {
        self.additive.store(additive, Ordering::Release);
    }

    /// Flush sinks attached directly to this logger
    ///
    /// Every sink is flushed; the first error is returned.
    pub fn flush(&self) -> Result<()> {
        let mut first_error = None;
        for sink in self.sinks() {
            if let Err(e) = sink.flush() {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    #[track_caller]
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        if self.is_enabled_for(level) {
            self.emit(level, message.into(), None, Location::caller(), None);
        }
    }

    /// Log with a message built only when the level is enabled
    #[track_caller]
    pub fn log_with<S, F>(&self, level: LogLevel, message: F)
    where
        S: Into<String>,
        F: FnOnce() -> S,
    {
        if self.is_enabled_for(level) {
            self.emit(level, message().into(), None, Location::caller(), None);
        }
    }

    /// Log with a failure whose cause chain is captured into the record
    #[track_caller]
    pub fn log_failure(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        failure: &(dyn Error + 'static),
    ) {
        if self.is_enabled_for(level) {
            self.emit(level, message.into(), Some(failure), Location::caller(), None);
        }
    }

    /// Entry point for the logging macros, which check the gate first
    #[doc(hidden)]
    #[track_caller]
    pub fn log_at(
        &self,
        level: LogLevel,
        message: String,
        failure: Option<&(dyn Error + 'static)>,
        module_path: Option<&'static str>,
    ) {
        if self.is_enabled_for(level) {
            self.emit(level, message, failure, Location::caller(), module_path);
        }
    }

    #[inline]
    #[track_caller]
    pub fn trace(&self, message: impl Into<String>) {
        self.log(LogLevel::Trace, message);
    }

    #[inline]
    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    #[track_caller]
    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    #[inline]
    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    #[track_caller]
    pub fn fatal(&self, message: impl Into<String>) {
        self.log(LogLevel::Fatal, message);
    }

    #[inline]
    #[track_caller]
    pub fn trace_failure(&self, message: impl Into<String>, failure: &(dyn Error + 'static)) {
        self.log_failure(LogLevel::Trace, message, failure);
    }

    #[inline]
    #[track_caller]
    pub fn debug_failure(&self, message: impl Into<String>, failure: &(dyn Error + 'static)) {
        self.log_failure(LogLevel::Debug, message, failure);
    }

    #[inline]
    #[track_caller]
    pub fn info_failure(&self, message: impl Into<String>, failure: &(dyn Error + 'static)) {
        self.log_failure(LogLevel::Info, message, failure);
    }

    #[inline]
    #[track_caller]
    pub fn warn_failure(&self, message: impl Into<String>, failure: &(dyn Error + 'static)) {
        self.log_failure(LogLevel::Warn, message, failure);
    }

    #[inline]
    #[track_caller]
    pub fn error_failure(&self, message: impl Into<String>, failure: &(dyn Error + 'static)) {
        self.log_failure(LogLevel::Error, message, failure);
    }

    #[inline]
    #[track_caller]
    pub fn fatal_failure(&self, message: impl Into<String>, failure: &(dyn Error + 'static)) {
        self.log_failure(LogLevel::Fatal, message, failure);
    }

    /// Build the record for an enabled call and deliver it
    fn emit(
        &self,
        level: LogLevel,
        message: String,
        failure: Option<&(dyn Error + 'static)>,
        caller: &Location<'_>,
        module_path: Option<&str>,
    ) {
        let (ndc, mdc) = DiagnosticContext::snapshot_current();
        let mut record = LogRecord::new(self.name.as_str(), level, message)
            .with_caller(caller, module_path)
            .with_diagnostics(ndc, mdc);

        if let Some(failure) = failure {
            let depth = self.shared.max_failure_depth.load(Ordering::Relaxed);
            record = record.with_failure(FailureChain::capture_with_depth(failure, depth));
        }

        self.shared.metrics.record_emitted();
        self.dispatch(Arc::new(record));
    }

    /// Deliver to every reachable sink with per-sink failure isolation
    ///
    /// A sink that errors or panics is reported to the error handler and
    /// the remaining sinks still receive the record.
    fn dispatch(&self, record: Arc<LogRecord>) {
        let metrics = &self.shared.metrics;

        for sink in self.reachable_sinks() {
            let result = catch_unwind(AssertUnwindSafe(|| sink.deliver(Arc::clone(&record))));

            match result {
                Ok(Ok(())) => {
                    metrics.record_delivered();
                }
                Ok(Err(e)) => {
                    metrics.record_delivery_failure();
                    self.shared
                        .report(LoggerError::sink_delivery(sink.name(), e.to_string()));
                }
                Err(panic_info) => {
                    metrics.record_sink_panic();
                    self.shared.report(LoggerError::sink_delivery(
                        sink.name(),
                        format!("panicked: {}", panic_message(panic_info.as_ref())),
                    ));
                }
            }
        }
    }

    /// Own sinks, then ancestor sinks outward to the root while additive
    ///
    /// Collected into an owned list so no lock is held during delivery.
    fn reachable_sinks(&self) -> Vec<Arc<dyn Sink>> {
        let mut sinks = self.sinks();
        if !self.is_additive() {
            return sinks;
        }

        let mut next = self.parent();
        while let Some(ancestor) = next {
            sinks.extend(ancestor.sinks.read().iter().cloned());
            if !ancestor.is_additive() {
                break;
            }
            next = ancestor.parent();
        }
        sinks
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("effective_level", &self.effective_level())
            .field("additive", &self.is_additive())
            .field("sinks", &self.sinks.read().len())
            .finish()
    }
}
