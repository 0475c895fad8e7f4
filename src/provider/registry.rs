//! Explicit registry of named providers

use super::category::CategoryProvider;
use super::group::{GroupProvider, GroupProviderConfig};
use crate::control::{ControlId, ControlOutput, ControlTarget, ProviderControl, SettingsStore};
use crate::core::{LoggerError, ProviderConfig, Result};
use indexmap::map::Entry;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// A provider held by a [`ProviderRegistry`]
#[derive(Debug, Clone)]
pub enum RegisteredProvider {
    Category(Arc<CategoryProvider>),
    Group(Arc<GroupProvider>),
}

impl RegisteredProvider {
    pub fn name(&self) -> &str {
        match self {
            RegisteredProvider::Category(p) => p.name(),
            RegisteredProvider::Group(p) => p.name(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RegisteredProvider::Category(_) => "category",
            RegisteredProvider::Group(_) => "group",
        }
    }

    pub fn control_target(&self) -> Arc<dyn ControlTarget> {
        match self {
            RegisteredProvider::Category(p) => Arc::clone(p) as Arc<dyn ControlTarget>,
            RegisteredProvider::Group(p) => Arc::clone(p) as Arc<dyn ControlTarget>,
        }
    }

    fn clear(&self) {
        match self {
            RegisteredProvider::Category(p) => p.clear(),
            RegisteredProvider::Group(p) => p.clear(),
        }
    }
}

/// One name, one provider, across both provider kinds.
///
/// Registries are ordinary values; tests create their own and drop or
/// [`clear`](Self::clear) them.
///
/// # Example
/// ```
/// use rust_category_logging::prelude::*;
///
/// let registry = ProviderRegistry::new();
/// let provider = registry
///     .create_category_provider("app", ProviderConfig::default())
///     .unwrap();
/// assert!(registry
///     .create_category_provider("app", ProviderConfig::default())
///     .is_err());
/// assert!(std::sync::Arc::ptr_eq(
///     &provider,
///     &registry.category_provider("app").unwrap()
/// ));
/// ```
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: RwLock<IndexMap<String, RegisteredProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and register a provider under `name`.
    ///
    /// The name is claimed under the write lock before `build` runs, so a
    /// taken name never costs a provider construction.
    fn register<P>(
        &self,
        name: String,
        build: impl FnOnce(String) -> Result<Arc<P>>,
        wrap: impl FnOnce(Arc<P>) -> RegisteredProvider,
    ) -> Result<Arc<P>> {
        if name.trim().is_empty() {
            return Err(LoggerError::invalid_name(name, "provider names cannot be empty"));
        }

        let mut providers = self.providers.write();
        let slot = match providers.entry(name) {
            Entry::Occupied(taken) => {
                return Err(LoggerError::duplicate("Provider", taken.key().as_str()))
            }
            Entry::Vacant(slot) => slot,
        };
        let provider = build(slot.key().clone())?;
        let registered = wrap(Arc::clone(&provider));
        tracing::debug!(provider = %slot.key(), kind = registered.kind(), "registered provider");
        slot.insert(registered);
        Ok(provider)
    }

    pub fn create_category_provider(
        &self,
        name: impl Into<String>,
        config: ProviderConfig,
    ) -> Result<Arc<CategoryProvider>> {
        self.register(
            name.into(),
            |name| Ok(Arc::new(CategoryProvider::new(name, config))),
            RegisteredProvider::Category,
        )
    }

    pub fn create_group_provider(
        &self,
        name: impl Into<String>,
        config: GroupProviderConfig,
    ) -> Result<Arc<GroupProvider>> {
        self.register(
            name.into(),
            |name| Ok(Arc::new(GroupProvider::new(name, config)?)),
            RegisteredProvider::Group,
        )
    }

    pub fn get(&self, name: &str) -> Option<RegisteredProvider> {
        self.providers.read().get(name).cloned()
    }

    pub fn category_provider(&self, name: &str) -> Option<Arc<CategoryProvider>> {
        match self.get(name)? {
            RegisteredProvider::Category(p) => Some(p),
            RegisteredProvider::Group(_) => None,
        }
    }

    pub fn group_provider(&self, name: &str) -> Option<Arc<GroupProvider>> {
        match self.get(name)? {
            RegisteredProvider::Group(p) => Some(p),
            RegisteredProvider::Category(_) => None,
        }
    }

    /// Names in registration order
    pub fn names(&self) -> Vec<String> {
        self.providers.read().keys().cloned().collect()
    }

    pub fn providers(&self) -> Vec<RegisteredProvider> {
        self.providers.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.providers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.read().is_empty()
    }

    /// Unregister `name`; later providers keep their relative order
    pub fn remove(&self, name: &str) -> Option<RegisteredProvider> {
        self.providers.write().shift_remove(name)
    }

    /// Clear every provider and forget them all
    pub fn clear(&self) {
        let providers = std::mem::take(&mut *self.providers.write());
        for provider in providers.values() {
            provider.clear();
        }
    }

    pub fn control(&self) -> RegistryControl<'_> {
        RegistryControl {
            registry: self,
            store: None,
            output: ControlOutput::default(),
        }
    }
}

/// Lists the registered providers and hands out a [`ProviderControl`] for each
pub struct RegistryControl<'a> {
    registry: &'a ProviderRegistry,
    store: Option<Arc<dyn SettingsStore>>,
    output: ControlOutput,
}

impl<'a> RegistryControl<'a> {
    /// Store given to every control handed out
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn with_output(mut self, output: ControlOutput) -> Self {
        self.output = output;
        self
    }

    pub fn providers_text(&self) -> String {
        let mut lines = vec!["Registered providers:".to_string()];
        for (index, provider) in self.registry.providers().iter().enumerate() {
            lines.push(format!(
                "  [{:>2}] {} ({})",
                index,
                provider.name(),
                provider.kind()
            ));
        }
        lines.join("\n")
    }

    pub fn show_providers(&self) {
        self.output.write(&self.providers_text());
    }

    /// Control for the provider at a listing index or with a name
    pub fn provider(&self, id: impl Into<ControlId>) -> Result<ProviderControl> {
        let registered = match id.into() {
            ControlId::Index(index) => {
                let providers = self.registry.providers();
                let len = providers.len();
                providers
                    .into_iter()
                    .nth(index)
                    .ok_or_else(|| LoggerError::index_out_of_range(index, len))?
            }
            ControlId::Identifier(name) => self
                .registry
                .get(&name)
                .ok_or_else(|| LoggerError::unknown_identifier(name))?,
        };

        let control =
            ProviderControl::new(registered.control_target()).with_output(self.output.clone());
        Ok(match self.store {
            Some(ref store) => control.with_store(Arc::clone(store)),
            None => control,
        })
    }
}

impl std::fmt::Debug for RegistryControl<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryControl")
            .field("providers", &self.registry.names())
            .field("has_store", &self.store.is_some())
            .finish()
    }
}
