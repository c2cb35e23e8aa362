//! Level configuration applied to a registry
//!
//! `LevelConfig` is plain data: where it comes from (a file, the
//! environment, a remote service) and how changes are detected is up to the
//! caller. Applying it goes through [`LoggerRegistry::configure`].
//!
//! [`LoggerRegistry::configure`]: super::LoggerRegistry::configure

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::registry::validate_name;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-logger settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Explicit level; `None` inherits from the nearest configured ancestor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<LogLevel>,

    /// Additivity override; `None` leaves the logger's flag untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additive: Option<bool>,
}

/// Root level plus per-name overrides
///
/// # Example
///
/// ```
/// use rust_diagnostic_logger::{LevelConfig, LogLevel, LoggerRegistry};
///
/// let config = LevelConfig::new(LogLevel::Info)
///     .with_level("ConsoleApp", LogLevel::Debug)
///     .with_level("ConsoleApp.Noisy", LogLevel::Error)
///     .with_additivity("ConsoleApp.Audit", false);
///
/// let registry = LoggerRegistry::new();
/// registry.configure(&config)?;
///
/// let log = registry.get_logger("ConsoleApp.LoggingExample")?;
/// assert_eq!(log.effective_level(), LogLevel::Debug);
/// # Ok::<(), rust_diagnostic_logger::LoggerError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    #[serde(default)]
    pub root_level: LogLevel,

    #[serde(default)]
    pub loggers: BTreeMap<String, LoggerConfig>,
}

impl LevelConfig {
    pub fn new(root_level: LogLevel) -> Self {
        Self {
            root_level,
            loggers: BTreeMap::new(),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_level(mut self, name: impl Into<String>, level: LogLevel) -> Self {
        self.loggers.entry(name.into()).or_default().level = Some(level);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_additivity(mut self, name: impl Into<String>, additive: bool) -> Self {
        self.loggers.entry(name.into()).or_default().additive = Some(additive);
        self
    }

    /// Explicit level configured for exactly `name`
    pub fn level_for(&self, name: &str) -> Option<LogLevel> {
        self.loggers.get(name).and_then(|entry| entry.level)
    }

    /// Parse and validate a JSON document
    ///
    /// Missing `root_level` defaults to `Info`; missing `loggers` to none.
    ///
    /// ```
    /// use rust_diagnostic_logger::{LevelConfig, LogLevel};
    ///
    /// let config = LevelConfig::from_json(r#"{"root_level":"Warn","loggers":{"db":{"level":"Debug"}}}"#)?;
    /// assert_eq!(config.root_level, LogLevel::Warn);
    /// assert_eq!(config.level_for("db"), Some(LogLevel::Debug));
    /// # Ok::<(), rust_diagnostic_logger::LoggerError>(())
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LevelConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every logger name, and that every entry sets something
    pub fn validate(&self) -> Result<()> {
        for (name, entry) in &self.loggers {
            validate_name(name)?;
            if entry.level.is_none() && entry.additive.is_none() {
                return Err(LoggerError::config(
                    format!("logger '{}'", name),
                    "entry sets neither level nor additive",
                ));
            }
        }
        Ok(())
    }

    /// Explicit levels only, in name order
    pub(crate) fn levels(&self) -> impl Iterator<Item = (&str, LogLevel)> {
        self.loggers
            .iter()
            .filter_map(|(name, entry)| entry.level.map(|level| (name.as_str(), level)))
    }

    /// Additivity overrides only, in name order
    pub(crate) fn additivity(&self) -> impl Iterator<Item = (&str, bool)> {
        self.loggers
            .iter()
            .filter_map(|(name, entry)| entry.additive.map(|additive| (name.as_str(), additive)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_merges_entries() {
        let config = LevelConfig::new(LogLevel::Warn)
            .with_level("A", LogLevel::Debug)
            .with_additivity("A", false);

        assert_eq!(config.loggers.len(), 1);
        assert_eq!(config.level_for("A"), Some(LogLevel::Debug));
        assert_eq!(config.loggers["A"].additive, Some(false));
        assert_eq!(config.level_for("B"), None);
    }

    #[test]
    fn test_validate_rejects_bad_names() {
        let config = LevelConfig::default().with_level("A..B", LogLevel::Info);
        assert!(matches!(
            config.validate(),
            Err(LoggerError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_entry() {
        let mut config = LevelConfig::new(LogLevel::Info);
        config.loggers.insert("ConsoleApp".to_string(), LoggerConfig::default());

        let err = config.validate().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
        assert!(err.to_string().contains("logger 'ConsoleApp'"));
    }

    #[test]
    fn test_from_json_parses_and_validates() {
        let config = LevelConfig::from_json(
            r#"{"root_level":"Error","loggers":{"ConsoleApp":{"level":"Debug","additive":false}}}"#,
        )
        .unwrap();
        assert_eq!(config.root_level, LogLevel::Error);
        assert_eq!(config.level_for("ConsoleApp"), Some(LogLevel::Debug));
        assert_eq!(config.loggers["ConsoleApp"].additive, Some(false));

        assert!(matches!(
            LevelConfig::from_json(r#"{"root_level":"#),
            Err(LoggerError::JsonError(_))
        ));
        assert!(matches!(
            LevelConfig::from_json(r#"{"loggers":{"A..B":{"level":"Info"}}}"#),
            Err(LoggerError::InvalidName { .. })
        ));
        assert!(matches!(
            LevelConfig::from_json(r#"{"loggers":{"A":{}}}"#),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{"loggers":{"ConsoleApp":{"level":"Debug"},"ConsoleApp.Audit":{"additive":false}}}"#;
        let config: LevelConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.root_level, LogLevel::Info);
        assert_eq!(config.level_for("ConsoleApp"), Some(LogLevel::Debug));
        assert_eq!(config.level_for("ConsoleApp.Audit"), None);
        assert_eq!(config.additivity().collect::<Vec<_>>(), vec![("ConsoleApp.Audit", false)]);
    }
}
