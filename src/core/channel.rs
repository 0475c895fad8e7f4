//! Channel traits for log output destinations

use super::error::Result;
use super::formatting::ArgumentFormatter;
use super::message::{LogMessage, RawLogMessage};
use std::fmt;
use std::sync::Arc;

/// Receives messages already rendered to text by the logger
pub trait FormattedChannel: Send + Sync {
    fn write(&self, message: &LogMessage) -> Result<()>;
    fn name(&self) -> &str;
}

/// Receives unrendered records together with the active argument formatter
pub trait RawChannel: Send + Sync {
    fn write(&self, message: &RawLogMessage, format_arg: &ArgumentFormatter) -> Result<()>;
    fn name(&self) -> &str;
}

/// Discriminant of a [`LogChannel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Formatted,
    Raw,
}

/// The output destination of a logger: exactly one shape at a time
#[derive(Clone)]
pub enum LogChannel {
    Formatted(Arc<dyn FormattedChannel>),
    Raw(Arc<dyn RawChannel>),
}

impl LogChannel {
    pub fn formatted<C: FormattedChannel + 'static>(channel: C) -> Self {
        LogChannel::Formatted(Arc::new(channel))
    }

    pub fn raw<C: RawChannel + 'static>(channel: C) -> Self {
        LogChannel::Raw(Arc::new(channel))
    }

    pub fn kind(&self) -> ChannelKind {
        match self {
            LogChannel::Formatted(_) => ChannelKind::Formatted,
            LogChannel::Raw(_) => ChannelKind::Raw,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            LogChannel::Formatted(c) => c.name(),
            LogChannel::Raw(c) => c.name(),
        }
    }

    /// Whether both handles point at the same channel instance
    pub fn same_as(&self, other: &LogChannel) -> bool {
        match (self, other) {
            (LogChannel::Formatted(a), LogChannel::Formatted(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            (LogChannel::Raw(a), LogChannel::Raw(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            _ => false,
        }
    }
}

impl fmt::Debug for LogChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogChannel")
            .field("kind", &self.kind())
            .field("name", &self.name())
            .finish()
    }
}
