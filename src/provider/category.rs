//! Hierarchical loggers
//!
//! A [`CategoryProvider`] keeps a tree of [`Category`] nodes. Children start
//! from their parent's settings at creation and settings applied to a node
//! cascade to its subtree unless recursion is disabled.

use super::logger_provider::{LoggerKey, LoggerProvider};
use crate::core::config::{ChannelOverride, ProviderConfig};
use crate::core::error::{LoggerError, Result};
use crate::core::logger::Logger;
use crate::core::metrics::LoggerMetrics;
use crate::core::runtime::{LoggerId, LoggerName, SettingsUpdate, PATH_SEPARATOR};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::ops::Deref;
use std::sync::{Arc, Weak};

/// A node in a category tree; logs through its own logger
pub struct Category {
    name: String,
    path: String,
    parent: Option<Weak<Category>>,
    children: RwLock<Vec<Arc<Category>>>,
    logger: Arc<Logger>,
}

impl Category {
    pub fn id(&self) -> &LoggerId {
        self.logger.id()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ancestor names down to this node, joined by `#`
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn parent(&self) -> Option<Arc<Category>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// Snapshot of the direct children in creation order
    pub fn children(&self) -> Vec<Arc<Category>> {
        self.children.read().clone()
    }

    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }

    /// Name of the provider this category was created by
    pub fn provider_name(&self) -> &str {
        self.logger.id().provider()
    }

    /// Zero for roots
    pub fn depth(&self) -> usize {
        self.path.matches(PATH_SEPARATOR).count()
    }
}

impl Deref for Category {
    type Target = Logger;

    fn deref(&self) -> &Logger {
        &self.logger
    }
}

impl std::fmt::Debug for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Category")
            .field("id", self.id())
            .field("path", &self.path)
            .field("level", &self.logger.level())
            .field("children", &self.children.read().len())
            .finish()
    }
}

#[derive(Default)]
struct CategoryState {
    roots: Vec<Arc<Category>>,
    by_path: IndexMap<String, Arc<Category>>,
}

/// Owner of one category tree namespace
///
/// # Example
/// ```
/// use rust_category_logging::prelude::*;
///
/// let provider = CategoryProvider::new(
///     "app",
///     ProviderConfig::builder().level(LogLevel::Debug).build(),
/// );
/// let root = provider.get_category("service", None).unwrap();
/// let child = provider.get_category("db", Some(&root)).unwrap();
/// assert_eq!(child.path(), "service#db");
/// assert_eq!(child.level(), LogLevel::Debug);
///
/// provider
///     .update_runtime_settings_category(&root, &LogLevel::Warn.into(), false)
///     .unwrap();
/// assert_eq!(child.level(), LogLevel::Warn);
/// ```
pub struct CategoryProvider {
    provider: LoggerProvider,
    state: RwLock<CategoryState>,
}

impl CategoryProvider {
    pub fn new(name: impl Into<String>, config: ProviderConfig) -> Self {
        Self {
            provider: LoggerProvider::new(name, config),
            state: RwLock::new(CategoryState::default()),
        }
    }

    pub fn name(&self) -> &str {
        self.provider.name()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        self.provider.metrics()
    }

    /// The flat provider holding the categories' loggers
    pub fn logger_provider(&self) -> &LoggerProvider {
        &self.provider
    }

    /// Get or create the category `name` under `parent`, or a root when
    /// `parent` is `None`.
    ///
    /// A new child starts from its parent's current settings. Re-requesting
    /// an existing name returns the existing node, or fails when the
    /// provider does not allow the same category name twice.
    pub fn get_category(&self, name: &str, parent: Option<&Arc<Category>>) -> Result<Arc<Category>> {
        LoggerName::from(name).validate()?;

        let mut state = self.state.write();
        let (path, settings) = match parent {
            None => (name.to_string(), None),
            Some(parent) => {
                if !parent.id().belongs_to(self.name()) {
                    return Err(LoggerError::provider_mismatch(
                        parent.path(),
                        self.name(),
                        parent.provider_name(),
                    )
                    .with_child(name));
                }
                Self::ensure_registered(&state, parent).map_err(|e| e.with_child(name))?;
                (
                    format!("{}{}{}", parent.path(), PATH_SEPARATOR, name),
                    Some(parent.logger().runtime().settings()),
                )
            }
        };

        if let Some(existing) = state.by_path.get(&path) {
            return if self.provider.config().allow_same_category_name {
                Ok(Arc::clone(existing))
            } else {
                Err(LoggerError::duplicate("Category", path))
            };
        }

        let logger = self.provider.get_or_create(
            LoggerKey::Path(path.clone()),
            LoggerName::from(name),
            settings,
        );
        let category = Arc::new(Category {
            name: name.to_string(),
            path: path.clone(),
            parent: parent.map(Arc::downgrade),
            children: RwLock::new(Vec::new()),
            logger,
        });

        match parent {
            Some(parent) => parent.children.write().push(Arc::clone(&category)),
            None => state.roots.push(Arc::clone(&category)),
        }
        state.by_path.insert(path, Arc::clone(&category));
        Ok(category)
    }

    pub fn get_category_by_path(&self, path: &str) -> Option<Arc<Category>> {
        self.state.read().by_path.get(path).cloned()
    }

    pub fn root_categories(&self) -> Vec<Arc<Category>> {
        self.state.read().roots.clone()
    }

    /// Every category, depth-first with parents before children
    pub fn all_categories(&self) -> Vec<Arc<Category>> {
        fn walk(category: &Arc<Category>, out: &mut Vec<Arc<Category>>) {
            out.push(Arc::clone(category));
            for child in category.children() {
                walk(&child, out);
            }
        }

        let mut out = Vec::new();
        for root in self.root_categories() {
            walk(&root, &mut out);
        }
        out
    }

    /// Apply `update` to `category` and, unless `disable_recursion` is set,
    /// to its whole subtree with the same values
    pub fn update_runtime_settings_category(
        &self,
        category: &Arc<Category>,
        update: &SettingsUpdate,
        disable_recursion: bool,
    ) -> Result<()> {
        if !category.id().belongs_to(self.name()) {
            return Err(LoggerError::provider_mismatch(
                category.path(),
                self.name(),
                category.provider_name(),
            ));
        }
        Self::ensure_registered(&self.state.read(), category)?;
        if update.channel.is_some()
            && self.provider.config().channel_override == ChannelOverride::Forbidden
        {
            return Err(LoggerError::config(
                "CategoryProvider",
                format!(
                    "provider '{}' does not allow setting a channel per category",
                    self.name()
                ),
            ));
        }

        self.apply(category, update, disable_recursion);
        Ok(())
    }

    fn apply(&self, category: &Arc<Category>, update: &SettingsUpdate, disable_recursion: bool) {
        self.provider.update_logger_runtime(category.logger(), update);
        if !disable_recursion {
            for child in category.children() {
                self.apply(&child, update, false);
            }
        }
    }

    /// Apply `update` to every category and to the defaults of new roots
    pub fn update_runtime_settings(&self, update: &SettingsUpdate) {
        self.provider.update_runtime_settings(update);
    }

    /// Drop all categories and restore construction-time defaults
    pub fn clear(&self) {
        let mut state = self.state.write();
        *state = CategoryState::default();
        self.provider.clear();
    }

    fn ensure_registered(state: &CategoryState, category: &Arc<Category>) -> Result<()> {
        match state.by_path.get(category.path()) {
            Some(registered) if Arc::ptr_eq(registered, category) => Ok(()),
            _ => Err(LoggerError::unknown_category(category.path())),
        }
    }
}

impl std::fmt::Debug for CategoryProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryProvider")
            .field("name", &self.name())
            .field("categories", &self.state.read().by_path.len())
            .finish()
    }
}
