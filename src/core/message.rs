//! Records handed to channels

use super::argument::{LogArg, LogError};
use super::log_level::LogLevel;
use super::runtime::LoggerName;
use serde::Serialize;

/// A fully rendered message, as received by formatted channels
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogMessage {
    pub level: LogLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The unrendered record received by raw channels.
///
/// Raw channels own the final rendering; the logger does no string
/// composition for them beyond resolving the message text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLogMessage {
    pub level: LogLevel,
    pub time_in_millis: i64,
    pub log_names: LoggerName,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<LogError>,
    /// `None` when the call carried no arguments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<LogArg>>,
}
