//! Level control over the entries of a provider

use crate::core::{LogLevel, LoggerError, Result, SettingsUpdate};
use crate::provider::{CategoryProvider, GroupProvider};

/// One controllable entry: a category or a group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlEntry {
    /// Durable identifier: category path or group identifier
    pub identifier: String,
    pub level: LogLevel,
    /// Nesting depth, zero for groups and root categories
    pub depth: usize,
}

/// A provider whose levels can be listed and changed by index or identifier
///
/// Indices are positions in [`control_entries`](Self::control_entries).
pub trait ControlTarget: Send + Sync {
    fn provider_name(&self) -> &str;

    /// Word used for the entries in help and listings
    fn entry_kind(&self) -> &'static str;

    fn control_entries(&self) -> Vec<ControlEntry>;

    /// Set the level of the entry at `index`; categories cascade to children
    fn set_level_at(&self, index: usize, level: LogLevel) -> Result<()>;

    /// Set the level of the entry named `identifier`; categories cascade
    fn set_level_of(&self, identifier: &str, level: LogLevel) -> Result<()>;

    /// Set the level of exactly one entry, without cascading
    fn set_level_exact(&self, identifier: &str, level: LogLevel) -> Result<()>;

    fn set_level_all(&self, level: LogLevel);
}

impl ControlTarget for CategoryProvider {
    fn provider_name(&self) -> &str {
        self.name()
    }

    fn entry_kind(&self) -> &'static str {
        "category"
    }

    fn control_entries(&self) -> Vec<ControlEntry> {
        self.all_categories()
            .iter()
            .map(|category| ControlEntry {
                identifier: category.path().to_string(),
                level: category.level(),
                depth: category.depth(),
            })
            .collect()
    }

    fn set_level_at(&self, index: usize, level: LogLevel) -> Result<()> {
        let categories = self.all_categories();
        let category = categories
            .get(index)
            .ok_or_else(|| LoggerError::index_out_of_range(index, categories.len()))?;
        self.update_runtime_settings_category(category, &SettingsUpdate::from(level), false)
    }

    fn set_level_of(&self, identifier: &str, level: LogLevel) -> Result<()> {
        let category = self
            .get_category_by_path(identifier)
            .ok_or_else(|| LoggerError::unknown_identifier(identifier))?;
        self.update_runtime_settings_category(&category, &SettingsUpdate::from(level), false)
    }

    fn set_level_exact(&self, identifier: &str, level: LogLevel) -> Result<()> {
        let category = self
            .get_category_by_path(identifier)
            .ok_or_else(|| LoggerError::unknown_identifier(identifier))?;
        self.update_runtime_settings_category(&category, &SettingsUpdate::from(level), true)
    }

    fn set_level_all(&self, level: LogLevel) {
        self.update_runtime_settings(&SettingsUpdate::from(level));
    }
}

impl ControlTarget for GroupProvider {
    fn provider_name(&self) -> &str {
        self.name()
    }

    fn entry_kind(&self) -> &'static str {
        "group"
    }

    fn control_entries(&self) -> Vec<ControlEntry> {
        self.groups()
            .into_iter()
            .map(|group| ControlEntry {
                identifier: group.identifier,
                level: group.level,
                depth: 0,
            })
            .collect()
    }

    fn set_level_at(&self, index: usize, level: LogLevel) -> Result<()> {
        self.update_group_at(index, &SettingsUpdate::from(level))
    }

    fn set_level_of(&self, identifier: &str, level: LogLevel) -> Result<()> {
        self.update_group(identifier, &SettingsUpdate::from(level))
    }

    fn set_level_exact(&self, identifier: &str, level: LogLevel) -> Result<()> {
        self.set_level_of(identifier, level)
    }

    fn set_level_all(&self, level: LogLevel) {
        self.update_runtime_settings(&SettingsUpdate::from(level));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ProviderConfig;
    use crate::provider::{GroupProviderConfig, GroupRule};

    #[test]
    fn test_category_entries_in_tree_order() {
        let provider = CategoryProvider::new("tree", ProviderConfig::default());
        let a = provider.get_category("a", None).unwrap();
        provider.get_category("b", None).unwrap();
        provider.get_category("a1", Some(&a)).unwrap();

        let entries = provider.control_entries();
        let ids: Vec<(&str, usize)> = entries
            .iter()
            .map(|e| (e.identifier.as_str(), e.depth))
            .collect();
        assert_eq!(ids, vec![("a", 0), ("a#a1", 1), ("b", 0)]);
    }

    #[test]
    fn test_category_index_cascades_exact_does_not() {
        let provider = CategoryProvider::new("tree", ProviderConfig::default());
        let a = provider.get_category("a", None).unwrap();
        let child = provider.get_category("c", Some(&a)).unwrap();

        provider.set_level_at(0, LogLevel::Info).unwrap();
        assert_eq!(child.level(), LogLevel::Info);

        provider.set_level_exact("a", LogLevel::Warn).unwrap();
        assert_eq!(a.level(), LogLevel::Warn);
        assert_eq!(child.level(), LogLevel::Info);

        assert!(matches!(
            provider.set_level_at(5, LogLevel::Info),
            Err(LoggerError::IndexOutOfRange { index: 5, len: 2 })
        ));
    }

    #[test]
    fn test_group_entries_include_default() {
        let provider = GroupProvider::new(
            "groups",
            GroupProviderConfig::new(vec![GroupRule::new("db").unwrap()]),
        )
        .unwrap();
        provider.set_level_of("default", LogLevel::Debug).unwrap();

        let entries = provider.control_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].identifier, "default");
        assert_eq!(entries[1].level, LogLevel::Debug);
        assert_eq!(entries[0].level, LogLevel::Error);
    }
}
