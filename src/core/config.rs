//! Provider configuration
//!
//! [`ProviderConfig`] is the programmatic form, built with
//! [`ProviderConfigBuilder`]. [`ProviderOptions`] is a declarative form that
//! can be read from JSON and is merged onto a base configuration.

use super::channel::LogChannel;
use super::error::{LoggerError, Result};
use super::formatting::{ArgumentFormatter, DateFormatter, DateLayout, MessageFormatter};
use super::log_level::LogLevel;
#[cfg(feature = "deferred")]
use super::pending::StackResolver;
use super::runtime::RuntimeSettings;
use crate::channels::ConsoleChannel;
use crate::provider::group::{GroupProviderConfig, GroupRule};
use chrono::Local;
use serde::Deserialize;
use std::fmt;
#[cfg(feature = "deferred")]
use std::sync::Arc;

/// Threshold used when nothing else is configured
pub const DEFAULT_LEVEL: LogLevel = LogLevel::Error;

/// Whether channels may be set below the provider level, i.e. per category
/// subtree or per group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelOverride {
    #[default]
    Allowed,
    Forbidden,
}

/// Construction-time settings of a provider
#[derive(Clone)]
pub struct ProviderConfig {
    pub level: LogLevel,
    pub channel: LogChannel,
    pub argument_formatter: ArgumentFormatter,
    pub date_formatter: DateFormatter,
    pub message_formatter: MessageFormatter,
    /// Re-fetching an existing category name returns it instead of failing
    pub allow_same_category_name: bool,
    pub channel_override: ChannelOverride,
    #[cfg(feature = "deferred")]
    pub stack_resolver: Option<Arc<dyn StackResolver>>,
}

impl ProviderConfig {
    pub fn builder() -> ProviderConfigBuilder {
        ProviderConfigBuilder::new()
    }

    /// Settings given to a logger created from this configuration
    pub fn runtime_settings(&self) -> RuntimeSettings {
        RuntimeSettings {
            level: self.level,
            channel: self.channel.clone(),
            argument_formatter: self.argument_formatter.clone(),
            date_formatter: self.date_formatter.clone(),
            message_formatter: self.message_formatter.clone(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            channel: LogChannel::formatted(ConsoleChannel::new()),
            argument_formatter: ArgumentFormatter::default(),
            date_formatter: DateFormatter::default(),
            message_formatter: MessageFormatter::default(),
            allow_same_category_name: true,
            channel_override: ChannelOverride::Allowed,
            #[cfg(feature = "deferred")]
            stack_resolver: None,
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("level", &self.level)
            .field("channel", &self.channel)
            .field("allow_same_category_name", &self.allow_same_category_name)
            .field("channel_override", &self.channel_override)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ProviderConfig`]
///
/// # Example
/// ```
/// use rust_category_logging::prelude::*;
///
/// let config = ProviderConfig::builder()
///     .level(LogLevel::Debug)
///     .channel(LogChannel::formatted(MessageBufferChannel::new()))
///     .allow_same_category_name(false)
///     .build();
/// assert_eq!(config.level, LogLevel::Debug);
/// ```
#[derive(Debug, Default)]
pub struct ProviderConfigBuilder {
    config: ProviderConfig,
}

impl ProviderConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn channel(mut self, channel: LogChannel) -> Self {
        self.config.channel = channel;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn argument_formatter(mut self, formatter: ArgumentFormatter) -> Self {
        self.config.argument_formatter = formatter;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn date_formatter(mut self, formatter: DateFormatter) -> Self {
        self.config.date_formatter = formatter;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn message_formatter(mut self, formatter: MessageFormatter) -> Self {
        self.config.message_formatter = formatter;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn allow_same_category_name(mut self, allow: bool) -> Self {
        self.config.allow_same_category_name = allow;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn channel_override(mut self, policy: ChannelOverride) -> Self {
        self.config.channel_override = policy;
        self
    }

    /// Resolve error stacks asynchronously, keeping emission in call order
    #[cfg(feature = "deferred")]
    #[must_use = "builder methods return a new value"]
    pub fn stack_resolver(mut self, resolver: Arc<dyn StackResolver>) -> Self {
        self.config.stack_resolver = Some(resolver);
        self
    }

    pub fn build(self) -> ProviderConfig {
        self.config
    }
}

/// Declarative provider options, every field optional
///
/// ```
/// use rust_category_logging::core::ProviderOptions;
///
/// let options = ProviderOptions::from_json(
///     r#"{ "level": "info", "groups": [{ "expression": "model.+", "level": "debug" }] }"#,
/// ).unwrap();
/// let config = options.into_group_config(Default::default()).unwrap();
/// assert_eq!(config.groups.len(), 1);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProviderOptions {
    pub level: Option<String>,
    pub date_layout: Option<DateLayout>,
    pub allow_same_category_name: Option<bool>,
    pub groups: Option<Vec<GroupOptions>>,
}

/// Declarative group rule
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GroupOptions {
    /// Regular expression source matched against logger names
    pub expression: String,
    pub level: Option<String>,
    pub identifier: Option<String>,
}

fn parse_option_level(value: &str) -> Result<LogLevel> {
    LogLevel::parse(value)
        .ok_or_else(|| LoggerError::config("ProviderOptions", format!("unknown level '{}'", value)))
}

impl ProviderOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Merge onto `base`; absent fields keep the base values
    pub fn into_config(self, base: ProviderConfig) -> Result<ProviderConfig> {
        let mut config = base;
        if let Some(ref level) = self.level {
            config.level = parse_option_level(level)?;
        }
        if let Some(layout) = self.date_layout {
            config.date_formatter = DateFormatter::with_layout(Local, layout);
        }
        if let Some(allow) = self.allow_same_category_name {
            config.allow_same_category_name = allow;
        }
        Ok(config)
    }

    /// Merge onto `base` and build the group rules; groups are required
    pub fn into_group_config(mut self, base: ProviderConfig) -> Result<GroupProviderConfig> {
        let groups = self.groups.take().unwrap_or_default();
        let base = self.into_config(base)?;

        let rules = groups
            .into_iter()
            .map(|group| -> Result<GroupRule> {
                let mut rule = GroupRule::new(&group.expression)?;
                if let Some(ref level) = group.level {
                    rule = rule.level(parse_option_level(level)?);
                }
                if let Some(identifier) = group.identifier {
                    rule = rule.identifier(identifier);
                }
                Ok(rule)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(GroupProviderConfig::with_base(base, rules))
    }
}
