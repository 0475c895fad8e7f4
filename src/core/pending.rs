//! Ordered emission of records whose error stack is resolved asynchronously
//!
//! A logger configured with a [`StackResolver`] does not block when a call
//! carries an error. The record is queued with a oneshot receiver for the
//! rendered stack and the resolution runs on the current tokio runtime.
//! Records without an error are queued already resolved. The queue is
//! drained from the head and stops at the first unresolved record, so
//! records reach the channel in call order whatever order resolutions
//! complete in. Without a runtime the resolver is driven to completion on
//! a private current-thread runtime before the record is queued.

use super::argument::LogError;
use super::error::Result;
use super::logger::{emit, PreparedRecord};
use super::metrics::LoggerMetrics;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot::{self, error::TryRecvError};

/// Stack text used when a resolver fails, panics or goes away
pub const STACK_RESOLUTION_FAILED: &str = "<<stack trace resolution failed>>";

/// Produces a human-readable stack for an error
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use rust_category_logging::{LogError, Result, StackResolver};
///
/// struct SourceLines;
///
/// #[async_trait]
/// impl StackResolver for SourceLines {
///     async fn resolve(&self, error: &LogError) -> Result<String> {
///         Ok(error.stack.clone().unwrap_or_else(|| "<no frames>".to_string()))
///     }
/// }
/// ```
#[async_trait]
pub trait StackResolver: Send + Sync {
    async fn resolve(&self, error: &LogError) -> Result<String>;
}

enum Readiness {
    Ready(Option<String>),
    Waiting(oneshot::Receiver<String>),
}

struct Pending {
    record: PreparedRecord,
    readiness: Readiness,
}

/// FIFO of records waiting to be emitted
pub(crate) struct PendingQueue {
    entries: Mutex<VecDeque<Pending>>,
    flushing: Mutex<()>,
    rerun: AtomicBool,
}

impl PendingQueue {
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            flushing: Mutex::new(()),
            rerun: AtomicBool::new(false),
        }
    }

    fn push(&self, record: PreparedRecord, readiness: Readiness) {
        self.entries.lock().push_back(Pending { record, readiness });
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Pop the head if it is resolved
    fn pop_ready(&self) -> Option<(PreparedRecord, Option<String>)> {
        let mut entries = self.entries.lock();
        let head = entries.front_mut()?;
        let stack = match head.readiness {
            Readiness::Ready(ref mut stack) => stack.take(),
            Readiness::Waiting(ref mut rx) => match rx.try_recv() {
                Ok(stack) => Some(stack),
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Closed) => Some(STACK_RESOLUTION_FAILED.to_string()),
            },
        };
        entries.pop_front().map(|pending| (pending.record, stack))
    }

    /// Emit from the head while records are resolved.
    ///
    /// Only one caller drains at a time; a caller that finds a drain in
    /// progress leaves a rerun request so the active drainer looks again.
    /// Channels may log re-entrantly while a drain is running.
    pub(crate) fn try_flush(&self, metrics: &LoggerMetrics) {
        self.rerun.store(true, Ordering::Release);
        loop {
            let Some(guard) = self.flushing.try_lock() else {
                return;
            };
            self.rerun.store(false, Ordering::Release);

            while let Some((record, stack)) = self.pop_ready() {
                emit(record, stack, metrics);
            }

            drop(guard);
            if !self.rerun.load(Ordering::Acquire) {
                break;
            }
        }
    }
}

/// Per-logger deferral state: the resolver and the logger's queue
#[derive(Clone)]
pub(crate) struct Deferral {
    resolver: Arc<dyn StackResolver>,
    queue: Arc<PendingQueue>,
}

impl Deferral {
    pub(crate) fn new(resolver: Arc<dyn StackResolver>) -> Self {
        Self {
            resolver,
            queue: Arc::new(PendingQueue::new()),
        }
    }

    pub(crate) fn pending_count(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn submit(&self, record: PreparedRecord, metrics: &Arc<LoggerMetrics>) {
        let error = match record.error {
            Some(ref error) => error.clone(),
            None => {
                self.queue.push(record, Readiness::Ready(None));
                self.queue.try_flush(metrics);
                return;
            }
        };

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            let stack = self.resolve_blocking(&error);
            self.queue.push(record, Readiness::Ready(Some(stack)));
            self.queue.try_flush(metrics);
            return;
        };

        let (tx, rx) = oneshot::channel();
        self.queue.push(record, Readiness::Waiting(rx));
        metrics.record_deferred();

        let resolver = Arc::clone(&self.resolver);
        let queue = Arc::clone(&self.queue);
        let metrics = Arc::clone(metrics);
        handle.spawn(async move {
            // Resolution runs in its own task so a panicking resolver still
            // releases the queue
            let outcome = tokio::spawn(async move { resolver.resolve(&error).await }).await;
            let stack = match outcome {
                Ok(resolved) => resolved_or_fallback(resolved),
                Err(join_error) => {
                    tracing::error!(error = %join_error, "stack resolver panicked");
                    STACK_RESOLUTION_FAILED.to_string()
                }
            };
            let _ = tx.send(stack);
            queue.try_flush(&metrics);
        });
    }

    /// Resolve on a throwaway current-thread runtime when the caller has none
    fn resolve_blocking(&self, error: &LogError) -> String {
        let runtime = match tokio::runtime::Builder::new_current_thread().build() {
            Ok(runtime) => runtime,
            Err(e) => {
                tracing::warn!(error = %e, "could not start a runtime for stack resolution");
                return STACK_RESOLUTION_FAILED.to_string();
            }
        };
        let resolver = Arc::clone(&self.resolver);
        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
            runtime.block_on(resolver.resolve(error))
        }));
        match outcome {
            Ok(resolved) => resolved_or_fallback(resolved),
            Err(_) => {
                tracing::error!("stack resolver panicked");
                STACK_RESOLUTION_FAILED.to_string()
            }
        }
    }
}

fn resolved_or_fallback(resolved: Result<String>) -> String {
    resolved.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "stack resolution failed");
        STACK_RESOLUTION_FAILED.to_string()
    })
}
