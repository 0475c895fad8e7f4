//! Runtime control of provider levels
//!
//! A [`ProviderControl`] lists the categories or groups of one provider,
//! changes their levels by index or identifier, and can save the levels to
//! a [`SettingsStore`] and restore them later.

pub mod provider_control;
pub mod store;
pub mod target;

pub use provider_control::{ControlId, ControlOutput, ProviderControl, STORAGE_KEY_PREFIX};
pub use store::{FileStore, MemoryStore, SettingsStore};
pub use target::{ControlEntry, ControlTarget};
