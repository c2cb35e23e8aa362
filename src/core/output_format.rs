//! Record rendering
//!
//! - Text: one human-readable line, followed by the failure chain if any
//! - Json: one object per record, diagnostic context and failure included

use super::context_map::format_pairs;
use super::log_record::{sanitize_message, LogRecord};
use super::timestamp::TimestampFormat;
use serde_json::{Map, Value};

/// Output format for log records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    ///
    /// Example:
    /// `[2025-01-08T10:30:45.123Z] [WARN ] main ConsoleApp.LoggingExample [NDC_Message] - Example of NDC auth=auth-none`
    #[default]
    Text,

    /// JSON format for machine processing
    Json,
}

impl OutputFormat {
    pub fn format(&self, record: &LogRecord, timestamp_format: &TimestampFormat) -> String {
        match self {
            OutputFormat::Text => {
                render_text(record, timestamp_format, &format!("{:5}", record.level.to_str()))
            }
            OutputFormat::Json => format_json(record, timestamp_format),
        }
    }
}

/// Text layout with the level column supplied by the caller (padded or colored)
///
/// Logger name, thread label and context pieces are escaped like the message,
/// so only an attached failure chain can add lines.
pub(crate) fn render_text(
    record: &LogRecord,
    timestamp_format: &TimestampFormat,
    level: &str,
) -> String {
    let mut line = format!(
        "[{}] [{}] {} {}",
        timestamp_format.format(&record.timestamp),
        level,
        sanitize_message(record.thread_label()),
        sanitize_message(&record.logger),
    );

    if !record.ndc.is_empty() {
        line.push_str(" [");
        line.push_str(&sanitize_message(&record.ndc_string()));
        line.push(']');
    }

    line.push_str(" - ");
    line.push_str(&sanitize_message(&record.message));

    if !record.mdc.is_empty() {
        line.push(' ');
        line.push_str(&sanitize_message(&format_pairs(&record.mdc)));
    }

    if let Some(ref failure) = record.failure {
        line.push('\n');
        line.push_str(&failure.render());
    }

    line
}

fn format_json(record: &LogRecord, timestamp_format: &TimestampFormat) -> String {
    let mut obj = Map::new();

    let timestamp = if timestamp_format.is_numeric() {
        Value::Number(record.timestamp.timestamp_millis().into())
    } else {
        Value::String(timestamp_format.format(&record.timestamp))
    };
    obj.insert("timestamp".to_string(), timestamp);
    obj.insert("level".to_string(), Value::String(record.level.to_str().to_string()));
    obj.insert("logger".to_string(), Value::String(record.logger.clone()));
    obj.insert("message".to_string(), Value::String(record.message.clone()));
    obj.insert("thread_id".to_string(), Value::String(record.thread_id.clone()));
    if let Some(ref name) = record.thread_name {
        obj.insert("thread_name".to_string(), Value::String(name.clone()));
    }

    if let Some(ref file) = record.file {
        obj.insert("file".to_string(), Value::String(file.clone()));
    }
    if let Some(line) = record.line {
        obj.insert("line".to_string(), Value::Number(line.into()));
    }
    if let Some(ref module_path) = record.module_path {
        obj.insert("module_path".to_string(), Value::String(module_path.clone()));
    }

    obj.insert(
        "ndc".to_string(),
        Value::Array(record.ndc.iter().cloned().map(Value::String).collect()),
    );
    obj.insert(
        "mdc".to_string(),
        Value::Object(
            record
                .mdc
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        ),
    );

    if let Some(ref failure) = record.failure {
        if let Ok(value) = serde_json::to_value(failure) {
            obj.insert("failure".to_string(), value);
        }
    }

    serde_json::to_string(&Value::Object(obj)).unwrap_or_default()
}
