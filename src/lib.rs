//! # Rust Category Logging
//!
//! A structured logging facade with live-updatable loggers.
//!
//! ## Features
//!
//! - **Live settings**: loggers read their level, channel and formatters on
//!   every call, so updates reach handles that were obtained earlier
//! - **Category trees**: hierarchical loggers inheriting from their parents
//! - **Group matching**: loggers bucketed by regular expressions on their names
//! - **Pluggable channels**: formatted text or raw structured records
//! - **Runtime control**: list, change, reset, save and restore levels
//! - **Ordered deferred output**: asynchronously resolved error stacks
//!   without reordering output (feature `deferred`)
//!
//! ## Example
//!
//! ```
//! use rust_category_logging::prelude::*;
//!
//! let buffer = MessageBufferChannel::new();
//! let provider = CategoryProvider::new(
//!     "app",
//!     ProviderConfig::builder()
//!         .level(LogLevel::Info)
//!         .channel(LogChannel::formatted(buffer.clone()))
//!         .build(),
//! );
//!
//! let service = provider.get_category("service", None).unwrap();
//! service.info("started");
//! service.info_with("listening", Detail::args([8080]));
//!
//! assert!(buffer.messages()[1].ends_with("[service] listening [8080]"));
//! ```

pub mod channels;
pub mod control;
pub mod core;
pub mod macros;
pub mod provider;

pub mod prelude {
    pub use crate::channels::{ConsoleChannel, JsonChannel, MessageBufferChannel, RawBufferChannel};
    pub use crate::control::{
        ControlId, ControlOutput, ControlTarget, FileStore, MemoryStore, ProviderControl,
        SettingsStore,
    };
    pub use crate::core::{
        ArgumentFormatter, ChannelOverride, DateFormatter, DateLayout, DateOrder, Detail,
        ErrorOrArgs, FormattedChannel, LogArg, LogChannel, LogError, LogLevel, LogMessage, Logger,
        LoggerError, LoggerMetrics, LoggerName, Message, MessageFormatter, ProviderConfig,
        ProviderOptions, RawChannel, RawLogMessage, Result, SettingsUpdate,
    };
    #[cfg(feature = "deferred")]
    pub use crate::core::StackResolver;
    pub use crate::provider::{
        Category, CategoryProvider, GroupProvider, GroupProviderConfig, GroupRule, LoggerProvider,
        ProviderRegistry,
    };
}

pub use channels::{ConsoleChannel, JsonChannel, MessageBufferChannel, RawBufferChannel};
pub use control::{ControlId, ProviderControl};
pub use self::core::{
    Detail, ErrorOrArgs, LogArg, LogChannel, LogError, LogLevel, Logger, LoggerError,
    LoggerMetrics, LoggerName, Message, ProviderConfig, Result, SettingsUpdate,
};
#[cfg(feature = "deferred")]
pub use self::core::{StackResolver, STACK_RESOLUTION_FAILED};
pub use provider::{CategoryProvider, GroupProvider, LoggerProvider, ProviderRegistry};
