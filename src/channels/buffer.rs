//! In-memory channels
//!
//! Both buffers are cheap to clone; clones share the same storage, so a
//! test can keep one handle and give another to a logger.

use crate::core::{
    ArgumentFormatter, FormattedChannel, LogMessage, RawChannel, RawLogMessage, Result,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Keeps rendered messages in memory, optionally bounded
///
/// When the limit is reached the oldest message is discarded.
#[derive(Clone, Default)]
pub struct MessageBufferChannel {
    messages: Arc<Mutex<VecDeque<LogMessage>>>,
    limit: Option<usize>,
}

impl MessageBufferChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            messages: Arc::new(Mutex::new(VecDeque::with_capacity(limit))),
            limit: Some(limit),
        }
    }

    /// Message texts in arrival order
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .iter()
            .map(|m| m.message.clone())
            .collect()
    }

    pub fn entries(&self) -> Vec<LogMessage> {
        self.messages.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }

    pub fn clear(&self) {
        self.messages.lock().clear();
    }
}

impl FormattedChannel for MessageBufferChannel {
    fn write(&self, message: &LogMessage) -> Result<()> {
        let mut messages = self.messages.lock();
        if let Some(limit) = self.limit {
            if limit == 0 {
                return Ok(());
            }
            while messages.len() >= limit {
                messages.pop_front();
            }
        }
        messages.push_back(message.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "message-buffer"
    }
}

/// A raw record together with its arguments as rendered at write time
#[derive(Debug, Clone, PartialEq)]
pub struct BufferedRecord {
    pub record: RawLogMessage,
    pub formatted_args: Vec<String>,
}

/// Keeps raw records in memory
#[derive(Clone, Default)]
pub struct RawBufferChannel {
    records: Arc<Mutex<Vec<BufferedRecord>>>,
}

impl RawBufferChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<RawLogMessage> {
        self.records
            .lock()
            .iter()
            .map(|buffered| buffered.record.clone())
            .collect()
    }

    /// Records with their arguments rendered by the logger's formatter
    pub fn buffered(&self) -> Vec<BufferedRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl RawChannel for RawBufferChannel {
    fn write(&self, message: &RawLogMessage, format_arg: &ArgumentFormatter) -> Result<()> {
        let formatted_args = message
            .args
            .iter()
            .flatten()
            .map(|arg| format_arg.render(arg))
            .collect();
        self.records.lock().push(BufferedRecord {
            record: message.clone(),
            formatted_args,
        });
        Ok(())
    }

    fn name(&self) -> &str {
        "raw-buffer"
    }
}
