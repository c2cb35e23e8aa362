//! Hierarchical logger registry
//!
//! Loggers are named with dotted paths (`"ConsoleApp.LoggingExample"`). A
//! logger without an explicit level inherits the level of its nearest
//! configured ancestor name, falling back to the root level, and by default
//! also delivers to the sinks of every ancestor logger up to the root.

use super::{
    config::LevelConfig,
    error::{LoggerError, Result},
    error_handler::{stderr_handler, ErrorHandler},
    failure_chain::DEFAULT_MAX_DEPTH,
    log_level::LogLevel,
    logger::{Logger, SharedState},
    metrics::LoggerMetrics,
    sink::Sink,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::{Arc, OnceLock};

/// Separator between levels of a logger name
pub const HIERARCHY_SEPARATOR: char = '.';

/// Name reported by the root logger
pub const ROOT_LOGGER_NAME: &str = "root";

static GLOBAL: OnceLock<LoggerRegistry> = OnceLock::new();

/// Reject empty names, names with empty segments and control characters
pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(LoggerError::invalid_name(name, "name must not be empty"));
    }
    if name.chars().any(char::is_control) {
        return Err(LoggerError::invalid_name(name, "name contains a control character"));
    }
    if name.split(HIERARCHY_SEPARATOR).any(|segment| segment.trim().is_empty()) {
        return Err(LoggerError::invalid_name(name, "name contains an empty segment"));
    }
    Ok(())
}

/// Proper ancestors of `name`, nearest first: `"A.B.C"` yields `"A.B"`, `"A"`
fn ancestors(name: &str) -> impl Iterator<Item = &str> {
    let mut current = name;
    std::iter::from_fn(move || {
        let idx = current.rfind(HIERARCHY_SEPARATOR)?;
        current = &current[..idx];
        Some(current)
    })
}

/// `name` equals `scope` or sits below it
fn is_within(name: &str, scope: &str) -> bool {
    name == scope
        || (name.len() > scope.len()
            && name.starts_with(scope)
            && name[scope.len()..].starts_with(HIERARCHY_SEPARATOR))
}

struct RegistryState {
    loggers: HashMap<String, Arc<Logger>>,
    levels: HashMap<String, LogLevel>,
    root_level: LogLevel,
}

impl RegistryState {
    /// Nearest explicit level on `name` or an ancestor, else the root level
    fn resolve(&self, name: &str) -> LogLevel {
        std::iter::once(name)
            .chain(ancestors(name))
            .find_map(|candidate| self.levels.get(candidate).copied())
            .unwrap_or(self.root_level)
    }

    /// Recompute effective levels of loggers inside `scope` (all when `None`)
    fn refresh(&self, root: &Logger, scope: Option<&str>) {
        if scope.is_none() {
            root.set_effective_level(self.root_level);
        }
        for logger in self.loggers.values() {
            if scope.is_none_or(|scope| is_within(logger.name(), scope)) {
                logger.set_effective_level(self.resolve(logger.name()));
            }
        }
    }
}

/// Process-wide map from name to logger
///
/// Lookups of existing loggers take a shared lock; creation and level
/// changes take the exclusive lock, so concurrent `get_logger` calls for one
/// name always agree on a single instance and every thread observes the same
/// effective levels.
///
/// # Example
///
/// ```
/// use rust_diagnostic_logger::{LogLevel, LoggerRegistry};
/// use std::sync::Arc;
///
/// let registry = LoggerRegistry::new();
/// registry.set_level("A", LogLevel::Warn)?;
///
/// let logger = registry.get_logger("A.B.C")?;
/// assert_eq!(logger.effective_level(), LogLevel::Warn);
/// assert!(Arc::ptr_eq(&logger, &registry.get_logger("A.B.C")?));
/// # Ok::<(), rust_diagnostic_logger::LoggerError>(())
/// ```
pub struct LoggerRegistry {
    state: RwLock<RegistryState>,
    root: Arc<Logger>,
    shared: Arc<SharedState>,
}

impl LoggerRegistry {
    /// Registry with root level INFO, no sinks and the stderr error handler
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(LogLevel::default(), stderr_handler(), DEFAULT_MAX_DEPTH)
    }

    fn with_settings(root_level: LogLevel, handler: ErrorHandler, max_depth: usize) -> Self {
        let shared = Arc::new(SharedState::new(handler, max_depth));
        let root = Arc::new(Logger::new(
            ROOT_LOGGER_NAME.to_string(),
            true,
            root_level,
            None,
            Arc::clone(&shared),
        ));

        Self {
            state: RwLock::new(RegistryState {
                loggers: HashMap::new(),
                levels: HashMap::new(),
                root_level,
            }),
            root,
            shared,
        }
    }

    /// The process-wide registry, created with defaults on first use
    pub fn global() -> &'static LoggerRegistry {
        GLOBAL.get_or_init(LoggerRegistry::new)
    }

    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn root(&self) -> &Arc<Logger> {
        &self.root
    }

    /// Existing logger for `name`, or a new one registered under it
    pub fn get_logger(&self, name: &str) -> Result<Arc<Logger>> {
        validate_name(name)?;

        if let Some(logger) = self.state.read().loggers.get(name) {
            return Ok(Arc::clone(logger));
        }

        let mut state = self.state.write();
        Ok(self.get_or_create(&mut state, name))
    }

    /// Creation path; the caller holds the write lock and validated `name`
    fn get_or_create(&self, state: &mut RegistryState, name: &str) -> Arc<Logger> {
        if let Some(logger) = state.loggers.get(name) {
            return Arc::clone(logger);
        }

        let parent = ancestors(name)
            .find_map(|ancestor| state.loggers.get(ancestor).cloned())
            .unwrap_or_else(|| Arc::clone(&self.root));

        let logger = Arc::new(Logger::new(
            name.to_string(),
            false,
            state.resolve(name),
            Some(parent),
            Arc::clone(&self.shared),
        ));

        // Adopt descendants whose nearest ancestor used to sit above `name`
        for existing in state.loggers.values() {
            if !is_within(existing.name(), name) {
                continue;
            }
            let adopt = existing
                .parent()
                .is_none_or(|current| current.is_root() || current.name().len() < name.len());
            if adopt {
                existing.set_parent(Arc::clone(&logger));
            }
        }

        state.loggers.insert(name.to_string(), Arc::clone(&logger));
        logger
    }

    /// Logger named after a type: `my_app::net::Client` becomes `my_app.net.Client`
    ///
    /// Generic arguments are dropped.
    pub fn logger_for<T: ?Sized>(&self) -> Result<Arc<Logger>> {
        let type_name = std::any::type_name::<T>();
        let path = type_name.split('<').next().unwrap_or(type_name);
        self.get_logger(&path.replace("::", "."))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.state.read().loggers.contains_key(name)
    }

    /// Every logger created so far, excluding the root
    pub fn current_loggers(&self) -> Vec<Arc<Logger>> {
        let mut loggers: Vec<_> = self.state.read().loggers.values().cloned().collect();
        loggers.sort_by(|a, b| a.name().cmp(b.name()));
        loggers
    }

    /// Set an explicit level for `name` and re-resolve its subtree
    pub fn set_level(&self, name: &str, level: LogLevel) -> Result<()> {
        validate_name(name)?;

        let mut state = self.state.write();
        state.levels.insert(name.to_string(), level);
        state.refresh(&self.root, Some(name));
        Ok(())
    }

    /// Remove the explicit level for `name`; its subtree inherits again
    pub fn clear_level(&self, name: &str) -> Result<()> {
        validate_name(name)?;

        let mut state = self.state.write();
        if state.levels.remove(name).is_some() {
            state.refresh(&self.root, Some(name));
        }
        Ok(())
    }

    /// Explicit level set for exactly `name`
    pub fn level_of(&self, name: &str) -> Option<LogLevel> {
        self.state.read().levels.get(name).copied()
    }

    pub fn set_root_level(&self, level: LogLevel) {
        let mut state = self.state.write();
        state.root_level = level;
        state.refresh(&self.root, None);
    }

    pub fn root_level(&self) -> LogLevel {
        self.state.read().root_level
    }

    /// Replace every explicit level with the ones in `config`
    ///
    /// Invalid names reject the whole config before anything changes.
    /// Additivity entries are applied to the named loggers, creating them if
    /// needed; loggers not mentioned keep their flag.
    pub fn configure(&self, config: &LevelConfig) -> Result<()> {
        config.validate()?;

        let mut state = self.state.write();
        state.root_level = config.root_level;
        state.levels = config
            .levels()
            .map(|(name, level)| (name.to_string(), level))
            .collect();
        state.refresh(&self.root, None);

        for (name, additive) in config.additivity() {
            self.get_or_create(&mut state, name).set_additive(additive);
        }
        Ok(())
    }

    /// Drop explicit levels, sinks and additivity overrides
    ///
    /// Logger identities survive: handles obtained earlier stay valid.
    pub fn reset(&self) {
        let mut state = self.state.write();
        state.levels.clear();
        state.root_level = LogLevel::default();
        state.refresh(&self.root, None);

        for logger in std::iter::once(&self.root).chain(state.loggers.values()) {
            logger.clear_sinks();
            logger.set_additive(true);
        }
    }

    /// Flush every distinct sink attached anywhere in the hierarchy
    ///
    /// All sinks are flushed; the first error is returned.
    pub fn flush(&self) -> Result<()> {
        let mut seen: Vec<Arc<dyn Sink>> = Vec::new();
        {
            let state = self.state.read();
            for logger in std::iter::once(&self.root).chain(state.loggers.values()) {
                for sink in logger.sinks() {
                    if !seen.iter().any(|known| Arc::ptr_eq(known, &sink)) {
                        seen.push(sink);
                    }
                }
            }
        }

        let mut first_error = None;
        for sink in seen {
            if let Err(e) = sink.flush() {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Delivery counters shared by every logger of this registry
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.shared.metrics
    }

    pub fn set_error_handler(&self, handler: ErrorHandler) {
        *self.shared.error_handler.write() = handler;
    }

    /// Bound on frames captured per failure chain
    pub fn set_max_failure_depth(&self, depth: usize) {
        self.shared.max_failure_depth.store(depth.max(1), Ordering::Relaxed);
    }

    pub fn max_failure_depth(&self) -> usize {
        self.shared.max_failure_depth.load(Ordering::Relaxed)
    }
}

impl Default for LoggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing a LoggerRegistry with a fluent API
///
/// # Example
/// ```
/// use rust_diagnostic_logger::prelude::*;
///
/// let registry = LoggerRegistry::builder()
///     .root_level(LogLevel::Debug)
///     .root_sink(ConsoleSink::new())
///     .level("ConsoleApp.Noisy", LogLevel::Error)
///     .max_failure_depth(8)
///     .build()?;
///
/// assert_eq!(registry.get_logger("ConsoleApp")?.effective_level(), LogLevel::Debug);
/// # Ok::<(), LoggerError>(())
/// ```
pub struct RegistryBuilder {
    config: LevelConfig,
    root_sinks: Vec<Arc<dyn Sink>>,
    error_handler: Option<ErrorHandler>,
    max_failure_depth: usize,
}

impl RegistryBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: LevelConfig::default(),
            root_sinks: Vec::new(),
            error_handler: None,
            max_failure_depth: DEFAULT_MAX_DEPTH,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn root_level(mut self, level: LogLevel) -> Self {
        self.config.root_level = level;
        self
    }

    /// Attach a sink to the root logger
    #[must_use = "builder methods return a new value"]
    pub fn root_sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.root_sinks.push(Arc::new(sink));
        self
    }

    /// Attach a sink the caller keeps a handle to
    #[must_use = "builder methods return a new value"]
    pub fn shared_root_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.root_sinks.push(sink);
        self
    }

    /// Explicit level for one logger name
    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, name: impl Into<String>, level: LogLevel) -> Self {
        self.config = self.config.with_level(name, level);
        self
    }

    /// Start from a full level configuration
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: LevelConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn error_handler(mut self, handler: ErrorHandler) -> Self {
        self.error_handler = Some(handler);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_failure_depth(mut self, depth: usize) -> Self {
        self.max_failure_depth = depth.max(1);
        self
    }

    /// Build the registry; fails on an invalid logger name
    pub fn build(self) -> Result<LoggerRegistry> {
        let registry = LoggerRegistry::with_settings(
            self.config.root_level,
            self.error_handler.unwrap_or_else(stderr_handler),
            self.max_failure_depth,
        );

        registry.configure(&self.config)?;
        for sink in self.root_sinks {
            registry.root.add_sink(sink);
        }

        Ok(registry)
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("ConsoleApp.LoggingExample").is_ok());
        assert!(validate_name("single").is_ok());

        for bad in ["", ".", "A.", ".A", "A..B", "A. .B", "A\nB", "A.B\r", "A\u{1b}[31m"] {
            assert!(
                matches!(validate_name(bad), Err(LoggerError::InvalidName { .. })),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_ancestors_nearest_first() {
        assert_eq!(ancestors("A.B.C").collect::<Vec<_>>(), vec!["A.B", "A"]);
        assert_eq!(ancestors("A").count(), 0);
    }

    #[test]
    fn test_is_within() {
        assert!(is_within("A.B", "A"));
        assert!(is_within("A", "A"));
        assert!(!is_within("AB", "A"));
        assert!(!is_within("A", "A.B"));
    }

    #[test]
    fn test_get_logger_invalid_name() {
        let registry = LoggerRegistry::new();
        assert!(matches!(
            registry.get_logger(""),
            Err(LoggerError::InvalidName { .. })
        ));
        assert!(matches!(
            registry.set_level("A..B", LogLevel::Warn),
            Err(LoggerError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_same_instance_per_name() {
        let registry = LoggerRegistry::new();
        let first = registry.get_logger("A.B").unwrap();
        let second = registry.get_logger("A.B").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(registry.exists("A.B"));
        assert!(!registry.exists("A"));
    }

    #[test]
    fn test_inherits_from_nearest_ancestor() {
        let registry = LoggerRegistry::new();
        registry.set_level("A", LogLevel::Warn).unwrap();
        assert_eq!(registry.get_logger("A.B.C").unwrap().effective_level(), LogLevel::Warn);

        registry.set_level("A.B", LogLevel::Debug).unwrap();
        assert_eq!(registry.get_logger("A.B.C").unwrap().effective_level(), LogLevel::Debug);
        assert_eq!(registry.get_logger("A.X").unwrap().effective_level(), LogLevel::Warn);
    }

    #[test]
    fn test_set_level_updates_existing_descendants_only() {
        let registry = LoggerRegistry::new();
        let child = registry.get_logger("A.B").unwrap();
        let sibling = registry.get_logger("AB").unwrap();

        registry.set_level("A", LogLevel::Error).unwrap();
        assert_eq!(child.effective_level(), LogLevel::Error);
        assert_eq!(sibling.effective_level(), LogLevel::Info);
    }

    #[test]
    fn test_explicit_descendant_override_survives_ancestor_change() {
        let registry = LoggerRegistry::new();
        registry.set_level("A.B", LogLevel::Trace).unwrap();
        let child = registry.get_logger("A.B.C").unwrap();

        registry.set_level("A", LogLevel::Fatal).unwrap();
        assert_eq!(child.effective_level(), LogLevel::Trace);
    }

    #[test]
    fn test_clear_level_restores_inheritance() {
        let registry = LoggerRegistry::new();
        registry.set_level("A", LogLevel::Error).unwrap();
        let logger = registry.get_logger("A.B").unwrap();

        registry.clear_level("A").unwrap();
        assert_eq!(logger.effective_level(), LogLevel::Info);
        assert_eq!(registry.level_of("A"), None);
    }

    #[test]
    fn test_root_level_change_reaches_all() {
        let registry = LoggerRegistry::new();
        let logger = registry.get_logger("X.Y").unwrap();

        registry.set_root_level(LogLevel::Error);
        assert_eq!(logger.effective_level(), LogLevel::Error);
        assert_eq!(registry.root().effective_level(), LogLevel::Error);
    }

    #[test]
    fn test_parent_links_follow_creation_order() {
        let registry = LoggerRegistry::new();
        let leaf = registry.get_logger("A.B.C").unwrap();
        assert!(leaf.parent().unwrap().is_root());

        let top = registry.get_logger("A").unwrap();
        assert!(Arc::ptr_eq(&leaf.parent().unwrap(), &top));

        let middle = registry.get_logger("A.B").unwrap();
        assert!(Arc::ptr_eq(&leaf.parent().unwrap(), &middle));
        assert!(Arc::ptr_eq(&middle.parent().unwrap(), &top));
    }

    #[test]
    fn test_configure_replaces_levels() {
        let registry = LoggerRegistry::new();
        registry.set_level("Old", LogLevel::Fatal).unwrap();
        let old = registry.get_logger("Old.Child").unwrap();

        let config = LevelConfig::new(LogLevel::Warn)
            .with_level("New", LogLevel::Debug)
            .with_additivity("New.Quiet", false);
        registry.configure(&config).unwrap();

        assert_eq!(old.effective_level(), LogLevel::Warn);
        assert_eq!(registry.get_logger("New.X").unwrap().effective_level(), LogLevel::Debug);
        assert!(!registry.get_logger("New.Quiet").unwrap().is_additive());
        assert_eq!(registry.level_of("Old"), None);
    }

    #[test]
    fn test_configure_rejects_invalid_names_atomically() {
        let registry = LoggerRegistry::new();
        registry.set_level("Keep", LogLevel::Error).unwrap();

        let config = LevelConfig::new(LogLevel::Trace).with_level("bad..name", LogLevel::Debug);
        assert!(registry.configure(&config).is_err());
        assert_eq!(registry.level_of("Keep"), Some(LogLevel::Error));
        assert_eq!(registry.root_level(), LogLevel::Info);
    }

    #[test]
    fn test_builder_applies_levels() {
        let registry = LoggerRegistry::builder()
            .root_level(LogLevel::Error)
            .level("App", LogLevel::Debug)
            .max_failure_depth(0)
            .build()
            .unwrap();

        assert_eq!(registry.root_level(), LogLevel::Error);
        assert_eq!(registry.get_logger("App.Db").unwrap().effective_level(), LogLevel::Debug);
        assert_eq!(registry.max_failure_depth(), 1);
    }

    #[test]
    fn test_builder_rejects_invalid_name() {
        let result = LoggerRegistry::builder().level("", LogLevel::Debug).build();
        assert!(result.is_err());
    }

    struct Client;

    #[test]
    fn test_logger_for_type() {
        let registry = LoggerRegistry::new();
        let logger = registry.logger_for::<Client>().unwrap();
        assert!(logger.name().ends_with("registry.tests.Client"));
        assert!(!logger.name().contains("::"));

        let generic = registry.logger_for::<Vec<u8>>().unwrap();
        assert!(generic.name().ends_with("vec.Vec"));
    }

    #[test]
    fn test_global_is_single_instance() {
        let a = LoggerRegistry::global() as *const LoggerRegistry;
        let b = LoggerRegistry::global() as *const LoggerRegistry;
        assert_eq!(a, b);
    }
}
