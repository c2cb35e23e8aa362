//! # Rust Diagnostic Logger
//!
//! Hierarchical, named loggers with per-thread diagnostic context and
//! failure-chain capture.
//!
//! ## Features
//!
//! - **Named hierarchy**: dotted logger names inherit levels and sinks from
//!   their ancestors
//! - **Diagnostic context**: a per-thread tag stack (NDC) and key/value map
//!   (MDC) copied into every record
//! - **Failure chains**: `Error::source()` chains captured with cycle and
//!   depth protection
//! - **Isolated sinks**: a failing or panicking sink never reaches the caller
//!
//! ## Example
//!
//! ```
//! use rust_diagnostic_logger::prelude::*;
//! use rust_diagnostic_logger::{mdc, ndc, warn};
//! use std::sync::Arc;
//!
//! let registry = LoggerRegistry::new();
//! let memory = Arc::new(MemorySink::new());
//! registry.root().add_sink(memory.clone());
//!
//! let log = registry.get_logger("ConsoleApp.LoggingExample")?;
//! mdc::set("auth", "auth-none");
//! {
//!     let _ndc = ndc::push("NDC_Message");
//!     warn!(log, "Example of NDC");
//! }
//!
//! let record = &memory.records()[0];
//! assert_eq!(record.ndc, vec!["NDC_Message"]);
//! assert_eq!(record.mdc_value("auth"), Some("auth-none"));
//! # mdc::clear();
//! # Ok::<(), LoggerError>(())
//! ```

pub mod appenders;
pub mod core;
pub mod macros;

pub use core::{mdc, ndc};

pub mod prelude {
    pub use crate::appenders::{ConsoleSink, MemorySink};
    pub use crate::core::{
        mdc, ndc, DiagnosticContext, ErrorHandler, Failure, FailureChain, LevelConfig, LogLevel,
        LogRecord, Logger, LoggerError, LoggerMetrics, LoggerRegistry, OutputFormat,
        RegistryBuilder, Result, Sink, TimestampFormat,
    };
}

pub use appenders::{ConsoleSink, MemorySink};
pub use core::{
    silent_handler, stderr_handler, AttachGuard, ContextMap, ContextStack, DiagnosticContext,
    ErrorHandler, Failure, FailureChain, FailureFrame, LevelConfig, LogLevel, LogRecord, Logger,
    LoggerConfig, LoggerError, LoggerMetrics, LoggerRegistry, MdcGuard, NdcGuard, OutputFormat,
    RegistryBuilder, Result, Sink, TimestampFormat, DEFAULT_MAX_DEPTH, TRUNCATION_MARKER,
    UNPRINTABLE_ERROR,
};
