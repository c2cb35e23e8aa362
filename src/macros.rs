//! Logging macros with `format!`-style arguments.
//!
//! The level gate is checked before the message is formatted, and the record
//! carries the caller's file, line and `module_path!()`. A failure can be
//! attached with a leading `failure = <expr>` argument.
//!
//! # Examples
//!
//! ```
//! use rust_diagnostic_logger::prelude::*;
//! use rust_diagnostic_logger::{error, info};
//!
//! let registry = LoggerRegistry::new();
//! let log = registry.get_logger("ConsoleApp.LoggingExample")?;
//!
//! let port = 8080;
//! info!(log, "Server listening on port {}", port);
//!
//! let err = Failure::new("connection refused");
//! error!(log, failure = &err, "upstream {} unavailable", "db");
//! # Ok::<(), LoggerError>(())
//! ```

/// Log at an explicit level.
///
/// ```
/// # use rust_diagnostic_logger::prelude::*;
/// use rust_diagnostic_logger::log;
/// # let registry = LoggerRegistry::new();
/// # let logger = registry.root();
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, failure = $failure:expr, $($arg:tt)+) => {{
        let __logger = &$logger;
        let __level = $level;
        if __logger.is_enabled_for(__level) {
            __logger.log_at(
                __level,
                format!($($arg)+),
                Some($failure as &(dyn ::std::error::Error + 'static)),
                Some(module_path!()),
            );
        }
    }};
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let __logger = &$logger;
        let __level = $level;
        if __logger.is_enabled_for(__level) {
            __logger.log_at(__level, format!($($arg)+), None, Some(module_path!()));
        }
    }};
}

#[macro_export]
macro_rules! trace {
    ($logger:expr, failure = $failure:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, failure = $failure, $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, failure = $failure:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, failure = $failure, $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, failure = $failure:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, failure = $failure, $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! warn {
    ($logger:expr, failure = $failure:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, failure = $failure, $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message, optionally with a failure chain.
///
/// ```
/// # use rust_diagnostic_logger::prelude::*;
/// use rust_diagnostic_logger::error;
/// # let registry = LoggerRegistry::new();
/// # let logger = registry.root();
/// let cause = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
/// error!(logger, failure = &cause, "could not persist {}", "session");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, failure = $failure:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, failure = $failure, $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

#[macro_export]
macro_rules! fatal {
    ($logger:expr, failure = $failure:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, failure = $failure, $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::appenders::MemorySink;
    use crate::core::{Failure, LogLevel, LoggerRegistry};
    use std::sync::Arc;

    fn setup(level: LogLevel) -> (LoggerRegistry, Arc<MemorySink>) {
        let registry = LoggerRegistry::new();
        registry.set_root_level(level);
        let memory = Arc::new(MemorySink::new());
        registry.root().add_sink(memory.clone());
        (registry, memory)
    }

    #[test]
    fn test_log_macro() {
        let (registry, memory) = setup(LogLevel::Trace);
        let logger = registry.get_logger("macros").unwrap();

        log!(logger, LogLevel::Info, "Value: {}", 42);

        let record = &memory.records()[0];
        assert_eq!(record.message, "Value: 42");
        assert_eq!(record.level, LogLevel::Info);
        assert_eq!(record.module_path.as_deref(), Some(module_path!()));
        assert!(record.file.as_deref().unwrap().ends_with("macros.rs"));
    }

    #[test]
    fn test_level_macros() {
        let (registry, memory) = setup(LogLevel::Trace);
        let logger = registry.get_logger("macros").unwrap();

        trace!(logger, "t {}", 1);
        debug!(logger, "d {}", 2);
        info!(logger, "i {}", 3);
        warn!(logger, "w {}", 4);
        error!(logger, "e {}", 5);
        fatal!(logger, "f {}", 6);

        let levels: Vec<_> = memory.records().iter().map(|r| r.level).collect();
        assert_eq!(levels, LogLevel::ALL.to_vec());
        assert_eq!(memory.messages()[5], "f 6");
    }

    #[test]
    fn test_disabled_level_skips_formatting() {
        let (registry, memory) = setup(LogLevel::Warn);
        let logger = registry.get_logger("macros").unwrap();
        let mut evaluated = false;

        debug!(logger, "{}", {
            evaluated = true;
            "never"
        });

        assert!(!evaluated);
        assert!(memory.is_empty());
    }

    #[test]
    fn test_failure_argument() {
        let (registry, memory) = setup(LogLevel::Info);
        let logger = registry.get_logger("macros").unwrap();
        let failure = Failure::caused_by("Exception thrown from method Bar", Failure::new("inner"));

        error!(logger, failure = &failure, "Exception thrown from method {}", "Foo");

        let record = &memory.records()[0];
        assert_eq!(record.message, "Exception thrown from method Foo");
        assert_eq!(record.failure.as_ref().map(|c| c.len()), Some(2));
    }
}
