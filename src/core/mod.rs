//! Core logger types and traits

pub mod argument;
pub mod call;
pub mod channel;
pub mod config;
pub mod error;
pub mod formatting;
pub mod log_level;
pub mod logger;
pub mod message;
pub mod metrics;
#[cfg(feature = "deferred")]
pub mod pending;
pub mod runtime;

pub use argument::{LogArg, LogError};
pub use call::{Deferred, Detail, ErrorOrArgs, Message, MessageContext};
pub use channel::{ChannelKind, FormattedChannel, LogChannel, RawChannel};
pub use config::{
    ChannelOverride, GroupOptions, ProviderConfig, ProviderConfigBuilder, ProviderOptions,
    DEFAULT_LEVEL,
};
pub use error::{LoggerError, Result};
pub use formatting::{
    argument_failure, format_argument, format_date, format_date_in, format_message,
    ArgumentFormatter, DateFormatter, DateLayout, DateOrder, FormattedMessage, MessageFormatter,
};
pub use log_level::{compare_level, LogLevel};
pub use logger::Logger;
pub use message::{LogMessage, RawLogMessage};
pub use metrics::LoggerMetrics;
#[cfg(feature = "deferred")]
pub use pending::{StackResolver, STACK_RESOLUTION_FAILED};
pub use runtime::{
    LoggerId, LoggerName, LoggerRuntime, RuntimeArena, RuntimeSettings, SettingsUpdate,
    PATH_SEPARATOR,
};
