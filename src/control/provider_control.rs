//! Interactive control of one provider's levels

use super::store::SettingsStore;
use super::target::{ControlEntry, ControlTarget};
use crate::core::{LogLevel, LoggerError, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Prefix of the storage key; the provider name follows
pub const STORAGE_KEY_PREFIX: &str = "rust_category_logging:";

/// Entry selector for [`ProviderControl::update`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlId {
    Index(usize),
    Identifier(String),
}

impl From<usize> for ControlId {
    fn from(index: usize) -> Self {
        ControlId::Index(index)
    }
}

impl From<&str> for ControlId {
    fn from(identifier: &str) -> Self {
        ControlId::Identifier(identifier.to_string())
    }
}

impl From<String> for ControlId {
    fn from(identifier: String) -> Self {
        ControlId::Identifier(identifier)
    }
}

/// Where control feedback goes; stdout by default
#[derive(Clone)]
pub struct ControlOutput(Arc<dyn Fn(&str) + Send + Sync>);

impl ControlOutput {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn write(&self, text: &str) {
        (self.0)(text)
    }
}

impl Default for ControlOutput {
    fn default() -> Self {
        Self::new(|text| println!("{}", text))
    }
}

impl fmt::Debug for ControlOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ControlOutput(..)")
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SavedEntry {
    identifier: String,
    level: LogLevel,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SavedState {
    provider_name: String,
    entries: Vec<SavedEntry>,
}

/// Lists and changes the levels of a provider's categories or groups
///
/// The levels present when the control is created are kept as a snapshot
/// for [`reset`](Self::reset); a successful [`restore`](Self::restore)
/// replaces that snapshot.
///
/// # Example
/// ```
/// use rust_category_logging::prelude::*;
/// use std::sync::Arc;
///
/// let provider = Arc::new(CategoryProvider::new("app", ProviderConfig::default()));
/// let root = provider.get_category("service", None).unwrap();
///
/// let control = ProviderControl::new(provider.clone());
/// control.update("debug", Some(ControlId::Index(0))).unwrap();
/// assert_eq!(root.level(), LogLevel::Debug);
///
/// control.reset();
/// assert_eq!(root.level(), LogLevel::Error);
/// ```
pub struct ProviderControl {
    target: Arc<dyn ControlTarget>,
    store: Option<Arc<dyn SettingsStore>>,
    output: ControlOutput,
    snapshot: Mutex<Vec<ControlEntry>>,
}

impl ProviderControl {
    pub fn new(target: Arc<dyn ControlTarget>) -> Self {
        let snapshot = target.control_entries();
        Self {
            target,
            store: None,
            output: ControlOutput::default(),
            snapshot: Mutex::new(snapshot),
        }
    }

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

    pub fn provider_name(&self) -> &str {
        self.target.provider_name()
    }

    pub fn storage_key(&self) -> String {
        format!("{}{}", STORAGE_KEY_PREFIX, self.provider_name())
    }

    pub fn help_text(&self) -> String {
        let kind = self.target.entry_kind();
        [
            format!("Control for provider '{}'", self.provider_name()),
            "  help()                      show this help".to_string(),
            format!("  show_settings()             list every {} with its index and level", kind),
            format!(
                "  update(level, id)           set the level of the {} with that index or identifier",
                kind
            ),
            format!("  update(level)               set the level of every {}", kind),
            "  reset()                     restore the levels from when this control was created"
                .to_string(),
            "  save()                      store the current levels".to_string(),
            "  restore(log_failure)        apply the stored levels".to_string(),
            format!(
                "  levels: {}",
                LogLevel::EMITTABLE
                    .iter()
                    .chain(std::iter::once(&LogLevel::Off))
                    .map(LogLevel::to_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        ]
        .join("\n")
    }

    pub fn help(&self) {
        self.output.write(&self.help_text());
    }

    /// One line per entry: index, identifier indented by depth, level
    pub fn settings_text(&self) -> String {
        let entries = self.target.control_entries();
        let width = entries
            .iter()
            .map(|e| e.identifier.len() + e.depth * 2)
            .max()
            .unwrap_or(0);

        let mut lines = vec![format!("Settings of provider '{}':", self.provider_name())];
        for (index, entry) in entries.iter().enumerate() {
            let label = format!("{}{}", "  ".repeat(entry.depth), entry.identifier);
            lines.push(format!(
                "  [{:>2}] {:<width$}  {}",
                index,
                label,
                entry.level,
                width = width
            ));
        }
        lines.join("\n")
    }

    pub fn show_settings(&self) {
        self.output.write(&self.settings_text());
    }

    /// Set `level` on one entry, or on every entry when `target` is `None`
    pub fn update(&self, level: &str, target: Option<ControlId>) -> Result<()> {
        let level: LogLevel = level.parse()?;
        match target {
            None => {
                self.target.set_level_all(level);
                self.output.write(&format!(
                    "Set level {} for provider '{}'",
                    level,
                    self.provider_name()
                ));
            }
            Some(ControlId::Index(index)) => {
                self.target.set_level_at(index, level)?;
                self.output
                    .write(&format!("Set level {} for index {}", level, index));
            }
            Some(ControlId::Identifier(identifier)) => {
                self.target.set_level_of(&identifier, level)?;
                self.output
                    .write(&format!("Set level {} for '{}'", level, identifier));
            }
        }
        Ok(())
    }

    /// Restore the levels of the snapshot
    pub fn reset(&self) {
        let snapshot = self.snapshot.lock().clone();
        self.apply(&snapshot);
        self.output.write(&format!(
            "Reset levels of provider '{}'",
            self.provider_name()
        ));
    }

    fn apply(&self, entries: &[ControlEntry]) {
        for entry in entries {
            if let Err(e) = self.target.set_level_exact(&entry.identifier, entry.level) {
                tracing::debug!(identifier = %entry.identifier, error = %e, "entry no longer present");
            }
        }
    }

    /// Write the current levels to the store; `false` when nothing was saved
    pub fn save(&self) -> bool {
        let Some(ref store) = self.store else {
            self.output
                .write("Cannot save settings: no settings store is configured");
            return false;
        };

        let state = SavedState {
            provider_name: self.provider_name().to_string(),
            entries: self
                .target
                .control_entries()
                .into_iter()
                .map(|e| SavedEntry {
                    identifier: e.identifier,
                    level: e.level,
                })
                .collect(),
        };

        let key = self.storage_key();
        let result = serde_json::to_string(&state)
            .map_err(LoggerError::from)
            .and_then(|payload| store.set_item(&key, &payload));
        match result {
            Ok(()) => {
                self.output.write(&format!(
                    "Saved settings of provider '{}'",
                    self.provider_name()
                ));
                true
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "saving control settings failed");
                self.output.write(&format!("Cannot save settings: {}", e));
                false
            }
        }
    }

    /// Apply levels previously written by [`save`](Self::save).
    ///
    /// Missing, unreadable or foreign data leaves every level untouched and
    /// returns `false`; the reason is reported only when `log_failure` is set.
    pub fn restore(&self, log_failure: bool) -> bool {
        match self.load_saved() {
            Ok(entries) => {
                self.apply(&entries);
                *self.snapshot.lock() = self.target.control_entries();
                self.output.write(&format!(
                    "Restored settings of provider '{}'",
                    self.provider_name()
                ));
                true
            }
            Err(e) => {
                tracing::debug!(provider = %self.provider_name(), error = %e, "restore skipped");
                if log_failure {
                    self.output
                        .write(&format!("Cannot restore settings: {}", e));
                }
                false
            }
        }
    }

    fn load_saved(&self) -> Result<Vec<ControlEntry>> {
        let key = self.storage_key();
        let store = self
            .store
            .as_ref()
            .ok_or_else(|| LoggerError::persistence(&key, "no settings store is configured"))?;
        let payload = store
            .get_item(&key)
            .ok_or_else(|| LoggerError::persistence(&key, "nothing has been saved"))?;
        let state: SavedState = serde_json::from_str(&payload)
            .map_err(|e| LoggerError::persistence(&key, format!("unreadable data: {}", e)))?;

        if state.provider_name != self.provider_name() {
            return Err(LoggerError::persistence(
                &key,
                format!(
                    "saved for provider '{}', not '{}'",
                    state.provider_name,
                    self.provider_name()
                ),
            ));
        }

        Ok(state
            .entries
            .into_iter()
            .map(|saved| ControlEntry {
                identifier: saved.identifier,
                level: saved.level,
                depth: 0,
            })
            .collect())
    }
}

impl fmt::Debug for ProviderControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderControl")
            .field("provider", &self.provider_name())
            .field("has_store", &self.store.is_some())
            .finish()
    }
}
