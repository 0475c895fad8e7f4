//! Live runtime settings of loggers
//!
//! Every logger reads its level, channel and formatters through a
//! [`LoggerRuntime`], which is an index into a provider-owned
//! [`RuntimeArena`]. Updating a slot in the arena is immediately visible to
//! every handle of that logger; handles never cache settings themselves.

use super::channel::LogChannel;
use super::error::{LoggerError, Result};
use super::formatting::{ArgumentFormatter, DateFormatter, MessageFormatter};
use super::log_level::LogLevel;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Character reserved for building hierarchical category keys
pub const PATH_SEPARATOR: char = '#';

/// Identity of a logger, unique within its owning provider
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoggerId {
    provider: Arc<str>,
    seq: u64,
}

impl LoggerId {
    pub(crate) fn new(provider: Arc<str>, seq: u64) -> Self {
        Self { provider, seq }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn belongs_to(&self, provider: &str) -> bool {
        &*self.provider == provider
    }
}

impl fmt::Display for LoggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.seq, self.provider)
    }
}

/// Logical name of a logger: one name, or several names for a message that
/// belongs to more than one logical source at once
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LoggerName {
    Single(String),
    Multi(Vec<String>),
}

impl LoggerName {
    pub fn parts(&self) -> Vec<&str> {
        match self {
            LoggerName::Single(name) => vec![name.as_str()],
            LoggerName::Multi(names) => names.iter().map(String::as_str).collect(),
        }
    }

    /// Text used for pattern matching: multi-names joined by `,`
    pub fn key_text(&self) -> String {
        self.parts().join(",")
    }

    /// Reject empty names and names containing [`PATH_SEPARATOR`]
    pub fn validate(&self) -> Result<()> {
        let parts = self.parts();
        if parts.is_empty() {
            return Err(LoggerError::invalid_name(
                "",
                "a multi-name needs at least one name",
            ));
        }
        for part in parts {
            if part.is_empty() {
                return Err(LoggerError::invalid_name(part, "names must not be empty"));
            }
            if part.contains(PATH_SEPARATOR) {
                return Err(LoggerError::invalid_name(
                    part,
                    format!("names must not contain '{}'", PATH_SEPARATOR),
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Display for LoggerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parts().join(", "))
    }
}

impl From<&str> for LoggerName {
    fn from(s: &str) -> Self {
        LoggerName::Single(s.to_string())
    }
}

impl From<String> for LoggerName {
    fn from(s: String) -> Self {
        LoggerName::Single(s)
    }
}

impl From<Vec<String>> for LoggerName {
    fn from(names: Vec<String>) -> Self {
        LoggerName::Multi(names)
    }
}

impl<const N: usize> From<[&str; N]> for LoggerName {
    fn from(names: [&str; N]) -> Self {
        LoggerName::Multi(names.iter().map(|s| s.to_string()).collect())
    }
}

impl From<&[&str]> for LoggerName {
    fn from(names: &[&str]) -> Self {
        LoggerName::Multi(names.iter().map(|s| s.to_string()).collect())
    }
}

/// The complete settings a logger runs with
#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    pub level: LogLevel,
    pub channel: LogChannel,
    pub argument_formatter: ArgumentFormatter,
    pub date_formatter: DateFormatter,
    pub message_formatter: MessageFormatter,
}

/// Partial settings: only present fields are merged
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub level: Option<LogLevel>,
    pub channel: Option<LogChannel>,
    pub argument_formatter: Option<ArgumentFormatter>,
    pub date_formatter: Option<DateFormatter>,
    pub message_formatter: Option<MessageFormatter>,
}

impl SettingsUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    #[must_use]
    pub fn channel(mut self, channel: LogChannel) -> Self {
        self.channel = Some(channel);
        self
    }

    #[must_use]
    pub fn argument_formatter(mut self, formatter: ArgumentFormatter) -> Self {
        self.argument_formatter = Some(formatter);
        self
    }

    #[must_use]
    pub fn date_formatter(mut self, formatter: DateFormatter) -> Self {
        self.date_formatter = Some(formatter);
        self
    }

    #[must_use]
    pub fn message_formatter(mut self, formatter: MessageFormatter) -> Self {
        self.message_formatter = Some(formatter);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.level.is_none()
            && self.channel.is_none()
            && self.argument_formatter.is_none()
            && self.date_formatter.is_none()
            && self.message_formatter.is_none()
    }

    pub fn apply_to(&self, settings: &mut RuntimeSettings) {
        if let Some(level) = self.level {
            settings.level = level;
        }
        if let Some(ref channel) = self.channel {
            settings.channel = channel.clone();
        }
        if let Some(ref formatter) = self.argument_formatter {
            settings.argument_formatter = formatter.clone();
        }
        if let Some(ref formatter) = self.date_formatter {
            settings.date_formatter = formatter.clone();
        }
        if let Some(ref formatter) = self.message_formatter {
            settings.message_formatter = formatter.clone();
        }
    }
}

impl From<LogLevel> for SettingsUpdate {
    fn from(level: LogLevel) -> Self {
        SettingsUpdate::new().level(level)
    }
}

/// Slot storage for the settings of every logger of one provider.
///
/// Slots are only ever appended; a provider that is cleared starts a new
/// arena, so old handles keep reading their last settings.
#[derive(Debug, Default)]
pub struct RuntimeArena {
    slots: RwLock<Vec<RuntimeSettings>>,
}

impl RuntimeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `settings` in a new slot and return the runtime reading it
    pub fn register(
        self: &Arc<Self>,
        id: LoggerId,
        name: LoggerName,
        settings: RuntimeSettings,
    ) -> LoggerRuntime {
        let slot = {
            let mut slots = self.slots.write();
            slots.push(settings);
            slots.len() - 1
        };
        LoggerRuntime {
            id,
            name,
            arena: Arc::clone(self),
            slot,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }

    fn snapshot(&self, slot: usize) -> RuntimeSettings {
        self.slots.read()[slot].clone()
    }

    fn level(&self, slot: usize) -> LogLevel {
        self.slots.read()[slot].level
    }

    fn update(&self, slot: usize, update: &SettingsUpdate) {
        update.apply_to(&mut self.slots.write()[slot]);
    }

    /// Merge `update` into every slot under one write lock
    pub fn update_all(&self, update: &SettingsUpdate) {
        let mut slots = self.slots.write();
        for settings in slots.iter_mut() {
            update.apply_to(settings);
        }
    }
}

/// A logger's view of its live settings
#[derive(Debug, Clone)]
pub struct LoggerRuntime {
    id: LoggerId,
    name: LoggerName,
    arena: Arc<RuntimeArena>,
    slot: usize,
}

impl LoggerRuntime {
    pub fn id(&self) -> &LoggerId {
        &self.id
    }

    pub fn name(&self) -> &LoggerName {
        &self.name
    }

    pub fn level(&self) -> LogLevel {
        self.arena.level(self.slot)
    }

    pub fn channel(&self) -> LogChannel {
        self.arena.snapshot(self.slot).channel
    }

    /// Copy of all current settings; the arena lock is released on return
    pub fn settings(&self) -> RuntimeSettings {
        self.arena.snapshot(self.slot)
    }

    pub(crate) fn update(&self, update: &SettingsUpdate) {
        self.arena.update(self.slot, update);
    }

    pub(crate) fn in_arena(&self, arena: &Arc<RuntimeArena>) -> bool {
        Arc::ptr_eq(&self.arena, arena)
    }
}
