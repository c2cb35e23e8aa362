//! Core logger types and traits

pub mod config;
pub mod context_map;
pub mod context_stack;
pub mod diagnostic_context;
pub mod error;
pub mod error_handler;
pub mod failure_chain;
pub mod log_level;
pub mod log_record;
pub mod logger;
pub mod mdc;
pub mod metrics;
pub mod ndc;
pub mod output_format;
pub mod registry;
pub mod sink;
pub mod timestamp;

pub use config::{LevelConfig, LoggerConfig};
pub use context_map::ContextMap;
pub use context_stack::ContextStack;
pub use diagnostic_context::{AttachGuard, DiagnosticContext};
pub use error::{LoggerError, Result};
pub use error_handler::{silent_handler, stderr_handler, ErrorHandler};
pub use failure_chain::{
    Failure, FailureChain, FailureFrame, DEFAULT_MAX_DEPTH, TRUNCATION_MARKER, UNPRINTABLE_ERROR,
};
pub use log_level::LogLevel;
pub use log_record::LogRecord;
pub use logger::Logger;
pub use mdc::MdcGuard;
pub use metrics::LoggerMetrics;
pub use ndc::NdcGuard;
pub use output_format::OutputFormat;
pub use registry::{LoggerRegistry, RegistryBuilder, HIERARCHY_SEPARATOR, ROOT_LOGGER_NAME};
pub use sink::Sink;
pub use timestamp::TimestampFormat;
