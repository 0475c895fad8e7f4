//! Registry from logger names to loggers
//!
//! A [`LoggerProvider`] creates loggers on demand, assigns identities, and
//! owns the runtime arena the loggers read their settings from.

use crate::core::config::ProviderConfig;
use crate::core::error::Result;
use crate::core::logger::Logger;
use crate::core::metrics::LoggerMetrics;
#[cfg(feature = "deferred")]
use crate::core::pending::Deferral;
use crate::core::runtime::{LoggerId, LoggerName, RuntimeArena, RuntimeSettings, SettingsUpdate};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry key: plain logger names and category paths never collide
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum LoggerKey {
    Name(LoggerName),
    Path(String),
}

struct ProviderState {
    defaults: RuntimeSettings,
    loggers: HashMap<LoggerKey, Arc<Logger>>,
    next_seq: u64,
    arena: Arc<RuntimeArena>,
}

impl ProviderState {
    fn fresh(config: &ProviderConfig) -> Self {
        Self {
            defaults: config.runtime_settings(),
            loggers: HashMap::new(),
            next_seq: 0,
            arena: Arc::new(RuntimeArena::new()),
        }
    }
}

/// Creates and owns loggers for one namespace.
///
/// # Example
/// ```
/// use rust_category_logging::prelude::*;
///
/// let buffer = MessageBufferChannel::new();
/// let provider = LoggerProvider::new(
///     "app",
///     ProviderConfig::builder()
///         .channel(LogChannel::formatted(buffer.clone()))
///         .build(),
/// );
///
/// let logger = provider.get_logger("service").unwrap();
/// logger.info("not shown, default threshold is Error");
///
/// provider.update_runtime_settings(&SettingsUpdate::new().level(LogLevel::Info));
/// logger.info("shown");
/// assert_eq!(buffer.len(), 1);
/// ```
pub struct LoggerProvider {
    name: Arc<str>,
    config: ProviderConfig,
    metrics: Arc<LoggerMetrics>,
    state: RwLock<ProviderState>,
}

impl LoggerProvider {
    pub fn new(name: impl Into<String>, config: ProviderConfig) -> Self {
        Self::with_metrics(name, config, Arc::new(LoggerMetrics::new()))
    }

    pub(crate) fn with_metrics(
        name: impl Into<String>,
        config: ProviderConfig,
        metrics: Arc<LoggerMetrics>,
    ) -> Self {
        let state = ProviderState::fresh(&config);
        Self {
            name: Arc::from(name.into()),
            config,
            metrics,
            state: RwLock::new(state),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuration the provider was constructed with
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Return the logger for `name`, creating it on first request.
    ///
    /// The same name always yields the same instance until [`clear`](Self::clear).
    pub fn get_logger(&self, name: impl Into<LoggerName>) -> Result<Arc<Logger>> {
        let name = name.into();
        name.validate()?;
        Ok(self.get_or_create(LoggerKey::Name(name.clone()), name, None))
    }

    /// Look up or create the logger for `key`.
    ///
    /// New loggers start from `settings` when given, otherwise from the
    /// provider's current defaults.
    pub(crate) fn get_or_create(
        &self,
        key: LoggerKey,
        name: LoggerName,
        settings: Option<RuntimeSettings>,
    ) -> Arc<Logger> {
        if let Some(logger) = self.state.read().loggers.get(&key) {
            return Arc::clone(logger);
        }

        let mut state = self.state.write();
        if let Some(logger) = state.loggers.get(&key) {
            return Arc::clone(logger);
        }

        state.next_seq += 1;
        let id = LoggerId::new(Arc::clone(&self.name), state.next_seq);
        let settings = settings.unwrap_or_else(|| state.defaults.clone());
        let runtime = state.arena.register(id, name, settings);

        let logger = Logger::new(runtime, Arc::clone(&self.metrics));
        #[cfg(feature = "deferred")]
        let logger = logger.with_deferral(self.config.stack_resolver.clone().map(Deferral::new));
        let logger = Arc::new(logger);

        tracing::trace!(provider = %self.name, logger = %logger.id(), "created logger");
        state.loggers.insert(key, Arc::clone(&logger));
        logger
    }

    /// Merge `update` into one logger's settings.
    ///
    /// Returns `false` when the logger is not registered with this provider.
    pub fn update_logger_runtime(&self, logger: &Logger, update: &SettingsUpdate) -> bool {
        let state = self.state.read();
        if !logger.id().belongs_to(&self.name) || !logger.runtime().in_arena(&state.arena) {
            return false;
        }
        logger.runtime().update(update);
        true
    }

    /// Merge `update` into the defaults for new loggers and into every
    /// registered logger
    pub fn update_runtime_settings(&self, update: &SettingsUpdate) {
        let mut state = self.state.write();
        update.apply_to(&mut state.defaults);
        state.arena.update_all(update);
    }

    /// Defaults new loggers are created with
    pub fn runtime_settings(&self) -> RuntimeSettings {
        self.state.read().defaults.clone()
    }

    pub fn logger_count(&self) -> usize {
        self.state.read().loggers.len()
    }

    /// Snapshot of all registered loggers, in creation order
    pub fn loggers(&self) -> Vec<Arc<Logger>> {
        let mut loggers: Vec<_> = self.state.read().loggers.values().cloned().collect();
        loggers.sort_by_key(|logger| logger.id().seq());
        loggers
    }

    /// Drop every logger and restore the construction-time defaults.
    ///
    /// Handles obtained earlier keep working with their last settings but
    /// are no longer updated by this provider.
    pub fn clear(&self) {
        *self.state.write() = ProviderState::fresh(&self.config);
        tracing::debug!(provider = %self.name, "cleared provider");
    }
}

impl std::fmt::Debug for LoggerProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerProvider")
            .field("name", &self.name)
            .field("loggers", &self.logger_count())
            .finish()
    }
}
