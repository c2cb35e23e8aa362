//! Error types for the logger system

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Logger name rejected by the registry
    #[error("Invalid logger name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// A sink failed to accept a record
    ///
    /// Never returned to a logging caller; only handed to the registry's
    /// error handler.
    #[error("Sink '{sink}' failed to deliver record: {message}")]
    SinkDelivery { sink: String, message: String },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an invalid logger name error
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        LoggerError::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a sink delivery error
    pub fn sink_delivery(sink: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::SinkDelivery {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::invalid_name("", "name must not be empty");
        assert!(matches!(err, LoggerError::InvalidName { .. }));

        let err = LoggerError::config("LevelConfig", "unknown level");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerError::sink_delivery("console", "broken pipe");
        assert!(matches!(err, LoggerError::SinkDelivery { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::invalid_name("A..B", "empty segment");
        assert_eq!(err.to_string(), "Invalid logger name 'A..B': empty segment");

        let err = LoggerError::sink_delivery("memory", "capacity reached");
        assert_eq!(
            err.to_string(),
            "Sink 'memory' failed to deliver record: capacity reached"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: LoggerError = io_err.into();

        assert!(matches!(err, LoggerError::IoError(_)));
        assert!(err.to_string().contains("pipe closed"));
    }
}
