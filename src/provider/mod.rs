//! Providers: registries that create loggers and own their settings

pub mod category;
pub mod group;
pub mod logger_provider;
pub mod registry;

pub use category::{Category, CategoryProvider};
pub use group::{GroupInfo, GroupProvider, GroupProviderConfig, GroupRule, DEFAULT_GROUP_IDENTIFIER};
pub use logger_provider::LoggerProvider;
pub use registry::{ProviderRegistry, RegisteredProvider, RegistryControl};
