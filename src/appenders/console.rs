//! Console sink

use crate::core::output_format::render_text;
use crate::core::{LogLevel, LogRecord, OutputFormat, Result, Sink, TimestampFormat};
use std::io::Write;
use std::sync::Arc;

/// Writes each record as one line; Error and Fatal go to stderr
pub struct ConsoleSink {
    #[cfg_attr(not(feature = "console"), allow(dead_code))]
    use_colors: bool,
    timestamp_format: TimestampFormat,
    output_format: OutputFormat,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::with_colors(cfg!(feature = "console"))
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            timestamp_format: TimestampFormat::default(),
            output_format: OutputFormat::default(),
        }
    }

    /// Set the output format for this sink
    ///
    /// # Example
    ///
    /// ```
    /// use rust_diagnostic_logger::appenders::ConsoleSink;
    /// use rust_diagnostic_logger::OutputFormat;
    ///
    /// let sink = ConsoleSink::new().with_output_format(OutputFormat::Json);
    /// ```
    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Line exactly as it would be printed
    pub fn render(&self, record: &LogRecord) -> String {
        match self.output_format {
            OutputFormat::Text => {
                render_text(record, &self.timestamp_format, &self.level_column(record.level))
            }
            OutputFormat::Json => self.output_format.format(record, &self.timestamp_format),
        }
    }

    #[cfg(feature = "console")]
    fn level_column(&self, level: LogLevel) -> String {
        use colored::Colorize;

        let padded = format!("{:5}", level.to_str());
        if self.use_colors {
            padded.color(level.color_code()).to_string()
        } else {
            padded
        }
    }

    #[cfg(not(feature = "console"))]
    fn level_column(&self, level: LogLevel) -> String {
        format!("{:5}", level.to_str())
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn deliver(&self, record: Arc<LogRecord>) -> Result<()> {
        let output = self.render(&record);

        match record.level {
            LogLevel::Error | LogLevel::Fatal => writeln!(std::io::stderr().lock(), "{}", output)?,
            _ => writeln!(std::io::stdout().lock(), "{}", output)?,
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_render_matches_text_format() {
        let sink = ConsoleSink::with_colors(false);
        let record = LogRecord::new("ConsoleApp", LogLevel::Info, "Application [ConsoleApp] Start");

        assert_eq!(
            sink.render(&record),
            OutputFormat::Text.format(&record, &TimestampFormat::Iso8601)
        );
    }

    #[test]
    fn test_json_render() {
        let sink = ConsoleSink::with_colors(true).with_output_format(OutputFormat::Json);
        let record = LogRecord::new("ConsoleApp", LogLevel::Error, "boom");

        let parsed: serde_json::Value = serde_json::from_str(&sink.render(&record)).unwrap();
        assert_eq!(parsed["level"], "ERROR");
    }

    #[test]
    fn test_deliver_succeeds() {
        let sink = ConsoleSink::with_colors(false);
        let record = Arc::new(LogRecord::new("ConsoleApp", LogLevel::Warn, "to stdout"));

        assert!(sink.deliver(record).is_ok());
        assert!(sink.flush().is_ok());
        assert_eq!(sink.name(), "console");
    }
}
