//! Pattern-matched logger groups
//!
//! A [`GroupProvider`] has no hierarchy. Each logger is assigned to the
//! first group whose expression matches its name, or to the default group
//! when none does. Every group owns an independent [`LoggerProvider`], so
//! changing one group never affects another.

use super::logger_provider::LoggerProvider;
use crate::core::channel::LogChannel;
use crate::core::config::{ChannelOverride, ProviderConfig};
use crate::core::error::{LoggerError, Result};
use crate::core::formatting::{ArgumentFormatter, DateFormatter, MessageFormatter};
use crate::core::log_level::LogLevel;
use crate::core::logger::Logger;
use crate::core::metrics::LoggerMetrics;
use crate::core::runtime::{LoggerName, SettingsUpdate};
use regex::Regex;
use std::sync::Arc;

/// Identifier of the always-last group that matches every name
pub const DEFAULT_GROUP_IDENTIFIER: &str = "default";

/// A group rule; omitted fields inherit from the provider configuration
#[derive(Debug, Clone)]
pub struct GroupRule {
    expression: Regex,
    identifier: Option<String>,
    pub level: Option<LogLevel>,
    pub channel: Option<LogChannel>,
    pub argument_formatter: Option<ArgumentFormatter>,
    pub date_formatter: Option<DateFormatter>,
    pub message_formatter: Option<MessageFormatter>,
}

impl GroupRule {
    /// Rule from regular expression source
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self::from_regex(Regex::new(pattern)?))
    }

    pub fn from_regex(expression: Regex) -> Self {
        Self {
            expression,
            identifier: None,
            level: None,
            channel: None,
            argument_formatter: None,
            date_formatter: None,
            message_formatter: None,
        }
    }

    #[must_use]
    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
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

    pub fn expression(&self) -> &Regex {
        &self.expression
    }

    /// Explicit identifier, or the expression source
    pub fn display_identifier(&self) -> &str {
        self.identifier
            .as_deref()
            .unwrap_or_else(|| self.expression.as_str())
    }

    /// Unanchored search, like testing a pattern anywhere in the name
    pub fn matches(&self, name: &str) -> bool {
        self.expression.is_match(name)
    }

    fn merge_into(&self, base: &ProviderConfig) -> ProviderConfig {
        let mut config = base.clone();
        if let Some(level) = self.level {
            config.level = level;
        }
        if let Some(ref channel) = self.channel {
            config.channel = channel.clone();
        }
        if let Some(ref formatter) = self.argument_formatter {
            config.argument_formatter = formatter.clone();
        }
        if let Some(ref formatter) = self.date_formatter {
            config.date_formatter = formatter.clone();
        }
        if let Some(ref formatter) = self.message_formatter {
            config.message_formatter = formatter.clone();
        }
        config
    }
}

/// Configuration of a [`GroupProvider`]
#[derive(Debug, Clone)]
pub struct GroupProviderConfig {
    pub base: ProviderConfig,
    pub groups: Vec<GroupRule>,
}

impl GroupProviderConfig {
    /// Groups on top of the default configuration; per-group channels are
    /// not allowed unless the base says otherwise
    pub fn new(groups: Vec<GroupRule>) -> Self {
        Self::with_base(
            ProviderConfig::builder()
                .channel_override(ChannelOverride::Forbidden)
                .build(),
            groups,
        )
    }

    pub fn with_base(base: ProviderConfig, groups: Vec<GroupRule>) -> Self {
        Self { base, groups }
    }
}

struct Group {
    rule: GroupRule,
    provider: LoggerProvider,
}

/// Summary of a group for display and control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupInfo {
    pub index: usize,
    pub identifier: String,
    pub level: LogLevel,
}

/// Provider assigning loggers to groups by name
///
/// # Example
/// ```
/// use rust_category_logging::prelude::*;
///
/// let provider = GroupProvider::new(
///     "app",
///     GroupProviderConfig::new(vec![
///         GroupRule::new("model.+").unwrap().level(LogLevel::Debug),
///         GroupRule::new(".+").unwrap(),
///     ]),
/// )
/// .unwrap();
///
/// let model = provider.get_logger("model.User").unwrap();
/// assert_eq!(model.level(), LogLevel::Debug);
/// assert_eq!(provider.get_logger("http").unwrap().level(), LogLevel::Error);
/// ```
pub struct GroupProvider {
    name: String,
    config: ProviderConfig,
    groups: Vec<Group>,
    default: LoggerProvider,
    metrics: Arc<LoggerMetrics>,
}

impl GroupProvider {
    pub fn new(name: impl Into<String>, config: GroupProviderConfig) -> Result<Self> {
        let name = name.into();
        if config.groups.is_empty() {
            return Err(LoggerError::config(
                "GroupProvider",
                format!("provider '{}' needs at least one group", name),
            ));
        }

        let metrics = Arc::new(LoggerMetrics::new());
        let mut groups = Vec::with_capacity(config.groups.len());
        for (index, rule) in config.groups.into_iter().enumerate() {
            if rule.channel.is_some() && config.base.channel_override == ChannelOverride::Forbidden
            {
                return Err(LoggerError::config(
                    "GroupProvider",
                    format!(
                        "group '{}' sets a channel, but provider '{}' does not allow per-group channels",
                        rule.display_identifier(),
                        name
                    ),
                ));
            }
            let provider = LoggerProvider::with_metrics(
                format!("{}/{}", name, index),
                rule.merge_into(&config.base),
                Arc::clone(&metrics),
            );
            groups.push(Group { rule, provider });
        }

        let default = LoggerProvider::with_metrics(
            format!("{}/{}", name, DEFAULT_GROUP_IDENTIFIER),
            config.base.clone(),
            Arc::clone(&metrics),
        );

        Ok(Self {
            name,
            config: config.base,
            groups,
            default,
            metrics,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Metrics shared by every group
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Index of the first group matching `name`; `None` means the default group
    pub fn resolve_group(&self, name: &LoggerName) -> Option<usize> {
        let text = name.key_text();
        self.groups.iter().position(|group| group.rule.matches(&text))
    }

    pub fn get_logger(&self, name: impl Into<LoggerName>) -> Result<Arc<Logger>> {
        let name = name.into();
        name.validate()?;
        match self.resolve_group(&name) {
            Some(index) => self.groups[index].provider.get_logger(name),
            None => self.default.get_logger(name),
        }
    }

    /// Groups in declaration order followed by the default group
    pub fn groups(&self) -> Vec<GroupInfo> {
        self.groups
            .iter()
            .map(|group| (group.rule.display_identifier(), &group.provider))
            .chain(std::iter::once((DEFAULT_GROUP_IDENTIFIER, &self.default)))
            .enumerate()
            .map(|(index, (identifier, provider))| GroupInfo {
                index,
                identifier: identifier.to_string(),
                level: provider.runtime_settings().level,
            })
            .collect()
    }

    /// Number of groups including the default group
    pub fn group_count(&self) -> usize {
        self.groups.len() + 1
    }

    fn provider_at(&self, index: usize) -> Result<&LoggerProvider> {
        match index.cmp(&self.groups.len()) {
            std::cmp::Ordering::Less => Ok(&self.groups[index].provider),
            std::cmp::Ordering::Equal => Ok(&self.default),
            std::cmp::Ordering::Greater => {
                Err(LoggerError::index_out_of_range(index, self.group_count()))
            }
        }
    }

    fn index_of(&self, identifier: &str) -> Result<usize> {
        self.groups()
            .into_iter()
            .find(|group| group.identifier == identifier)
            .map(|group| group.index)
            .ok_or_else(|| LoggerError::unknown_identifier(identifier))
    }

    fn check_channel(&self, update: &SettingsUpdate) -> Result<()> {
        if update.channel.is_some() && self.config.channel_override == ChannelOverride::Forbidden {
            return Err(LoggerError::config(
                "GroupProvider",
                format!(
                    "provider '{}' does not allow setting a channel per group",
                    self.name
                ),
            ));
        }
        Ok(())
    }

    /// Update the group at `index`; the default group is the last index
    pub fn update_group_at(&self, index: usize, update: &SettingsUpdate) -> Result<()> {
        self.check_channel(update)?;
        self.provider_at(index)?.update_runtime_settings(update);
        Ok(())
    }

    /// Update the group with `identifier`
    pub fn update_group(&self, identifier: &str, update: &SettingsUpdate) -> Result<()> {
        let index = self.index_of(identifier)?;
        self.update_group_at(index, update)
    }

    /// Update every group, including the default group
    pub fn update_runtime_settings(&self, update: &SettingsUpdate) {
        for group in &self.groups {
            group.provider.update_runtime_settings(update);
        }
        self.default.update_runtime_settings(update);
    }

    pub fn clear(&self) {
        for group in &self.groups {
            group.provider.clear();
        }
        self.default.clear();
    }
}

impl std::fmt::Debug for GroupProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupProvider")
            .field("name", &self.name)
            .field("groups", &self.groups())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::MessageBufferChannel;
    use crate::core::formatting::DateFormatter;

    fn two_groups() -> GroupProvider {
        GroupProvider::new(
            "groups",
            GroupProviderConfig::new(vec![
                GroupRule::new("model.+").unwrap().level(LogLevel::Debug),
                GroupRule::new(".+").unwrap().identifier("rest"),
            ]),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_groups_rejected() {
        let err = GroupProvider::new("none", GroupProviderConfig::new(Vec::new())).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_first_match_wins() {
        let provider = two_groups();
        assert_eq!(provider.resolve_group(&"model.Foo".into()), Some(0));
        assert_eq!(provider.resolve_group(&"other".into()), Some(1));
        assert_eq!(provider.get_logger("model.Foo").unwrap().level(), LogLevel::Debug);
        assert_eq!(provider.get_logger("other").unwrap().level(), LogLevel::Error);
    }

    #[test]
    fn test_no_match_uses_default() {
        let provider = GroupProvider::new(
            "only-models",
            GroupProviderConfig::new(vec![GroupRule::new("^model").unwrap()]),
        )
        .unwrap();
        assert_eq!(provider.resolve_group(&"http".into()), None);

        let logger = provider.get_logger("http").unwrap();
        assert!(logger.id().belongs_to("only-models/default"));
    }

    #[test]
    fn test_group_updates_are_isolated() {
        let provider = two_groups();
        let model = provider.get_logger("model.A").unwrap();
        let other = provider.get_logger("x").unwrap();

        provider.update_group("rest", &LogLevel::Trace.into()).unwrap();
        assert_eq!(other.level(), LogLevel::Trace);
        assert_eq!(model.level(), LogLevel::Debug);

        provider.update_group("model.+", &LogLevel::Fatal.into()).unwrap();
        assert_eq!(model.level(), LogLevel::Fatal);
        assert_eq!(provider.get_logger("model.B").unwrap().level(), LogLevel::Fatal);
    }

    #[test]
    fn test_lookup_errors() {
        let provider = two_groups();
        assert!(matches!(
            provider.update_group_at(3, &LogLevel::Info.into()),
            Err(LoggerError::IndexOutOfRange { index: 3, len: 3 })
        ));
        assert!(provider.update_group_at(2, &LogLevel::Info.into()).is_ok());
        assert!(matches!(
            provider.update_group("missing", &LogLevel::Info.into()),
            Err(LoggerError::UnknownIdentifier { .. })
        ));
    }

    #[test]
    fn test_groups_listing() {
        let provider = two_groups();
        let groups = provider.groups();
        let identifiers: Vec<&str> = groups.iter().map(|g| g.identifier.as_str()).collect();
        assert_eq!(identifiers, vec!["model.+", "rest", "default"]);
        assert_eq!(groups[0].level, LogLevel::Debug);
    }

    #[test]
    fn test_per_group_channel_policy() {
        let buffer = MessageBufferChannel::new();
        let forbidden = GroupProvider::new(
            "strict",
            GroupProviderConfig::new(vec![GroupRule::new(".+")
                .unwrap()
                .channel(LogChannel::formatted(buffer.clone()))]),
        );
        assert!(forbidden.is_err());

        let allowed = GroupProvider::new(
            "open",
            GroupProviderConfig::with_base(
                ProviderConfig::builder()
                    .level(LogLevel::Info)
                    .date_formatter(DateFormatter::new(|_| "T".to_string()))
                    .build(),
                vec![GroupRule::new(".+")
                    .unwrap()
                    .channel(LogChannel::formatted(buffer.clone()))],
            ),
        )
        .unwrap();
        allowed.get_logger("svc").unwrap().info("hello");
        assert_eq!(buffer.messages(), vec!["T [svc] hello"]);
    }

    #[test]
    fn test_multi_name_matches_joined_text() {
        let provider = two_groups();
        assert_eq!(provider.resolve_group(&LoggerName::from(["model.A", "x"])), Some(0));
    }
}
