//! Logging macros with `format!` syntax.
//!
//! The message is built lazily: `format!` only runs when the logger's
//! threshold lets the call through.
//!
//! # Examples
//!
//! ```
//! use rust_category_logging::prelude::*;
//! use rust_category_logging::{error, info};
//!
//! let provider = LoggerProvider::new("app", ProviderConfig::default());
//! let logger = provider.get_logger("server").unwrap();
//!
//! let port = 8080;
//! info!(logger, "listening on port {}", port);
//!
//! let failure = LogError::new("BindError", "address in use");
//! error!(logger, error = failure; "cannot listen on {}", port);
//! ```

/// Log at a given level.
///
/// An error can be attached with `error = <LogError>;` before the format
/// string.
///
/// ```
/// # use rust_category_logging::prelude::*;
/// # let provider = LoggerProvider::new("app", ProviderConfig::default());
/// # let logger = provider.get_logger("x").unwrap();
/// use rust_category_logging::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, error = $err:expr; $($arg:tt)+) => {
        $logger.log(
            $level,
            $crate::Message::lazy(|| format!($($arg)+)),
            $crate::Detail::lazy_error(|| $err),
        )
    };
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log(
            $level,
            $crate::Message::lazy(|| format!($($arg)+)),
            $crate::Detail::none(),
        )
    };
}

/// Log a trace-level message.
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// ```
/// # use rust_category_logging::prelude::*;
/// # let provider = LoggerProvider::new("app", ProviderConfig::default());
/// # let logger = provider.get_logger("x").unwrap();
/// use rust_category_logging::info;
/// info!(logger, "Application started");
/// info!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}
