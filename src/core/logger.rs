//! Main logger implementation

use super::{
    argument::{LogArg, LogError},
    call::{Detail, Message, MessageContext},
    channel::LogChannel,
    log_level::LogLevel,
    message::{LogMessage, RawLogMessage},
    metrics::LoggerMetrics,
    runtime::{LoggerId, LoggerName, LoggerRuntime, RuntimeSettings},
};
#[cfg(feature = "deferred")]
use super::pending::Deferral;
use chrono::Utc;
use std::sync::Arc;

/// A named logger.
///
/// Loggers are handed out by providers as `Arc<Logger>` and never cache
/// their settings: level, channel and formatters are read from the
/// provider's runtime store on every call.
pub struct Logger {
    runtime: LoggerRuntime,
    metrics: Arc<LoggerMetrics>,
    #[cfg(feature = "deferred")]
    deferral: Option<Deferral>,
}

/// A log call that passed the level gate, with message, error and
/// arguments resolved and the settings it will be rendered with
#[derive(Debug)]
pub(crate) struct PreparedRecord {
    pub level: LogLevel,
    pub time_in_millis: i64,
    pub names: LoggerName,
    pub message: String,
    pub error: Option<LogError>,
    pub args: Vec<LogArg>,
    pub settings: RuntimeSettings,
}

impl Logger {
    pub(crate) fn new(runtime: LoggerRuntime, metrics: Arc<LoggerMetrics>) -> Self {
        Self {
            runtime,
            metrics,
            #[cfg(feature = "deferred")]
            deferral: None,
        }
    }

    #[cfg(feature = "deferred")]
    pub(crate) fn with_deferral(mut self, deferral: Option<Deferral>) -> Self {
        self.deferral = deferral;
        self
    }

    pub fn id(&self) -> &LoggerId {
        self.runtime.id()
    }

    pub fn name(&self) -> &LoggerName {
        self.runtime.name()
    }

    /// Current threshold
    pub fn level(&self) -> LogLevel {
        self.runtime.level()
    }

    /// Current channel
    pub fn channel(&self) -> LogChannel {
        self.runtime.channel()
    }

    pub fn runtime(&self) -> &LoggerRuntime {
        &self.runtime
    }

    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.runtime.level().allows(level)
    }

    /// Log at `level`.
    ///
    /// Nothing in `message` or `detail` is evaluated when the level is below
    /// the logger's threshold.
    pub fn log<'a>(&self, level: LogLevel, message: impl Into<Message<'a>>, detail: Detail<'a>) {
        if !self.is_enabled(level) {
            self.metrics.record_suppressed();
            return;
        }

        let settings = self.runtime.settings();
        let time_in_millis = Utc::now().timestamp_millis();

        let (text, leftover) = {
            let mut ctx =
                MessageContext::new(&settings.message_formatter, &settings.argument_formatter);
            let text = message.into().resolve(&mut ctx);
            (text, ctx.into_leftover())
        };

        let (error, explicit_args) = detail.resolve();
        let mut args = leftover;
        args.extend(explicit_args);

        let record = PreparedRecord {
            level,
            time_in_millis,
            names: self.runtime.name().clone(),
            message: text,
            error,
            args,
            settings,
        };

        #[cfg(feature = "deferred")]
        if let Some(ref deferral) = self.deferral {
            deferral.submit(record, &self.metrics);
            return;
        }

        emit(record, None, &self.metrics);
    }

    /// Records waiting for stack resolution
    pub fn pending_count(&self) -> usize {
        #[cfg(feature = "deferred")]
        if let Some(ref deferral) = self.deferral {
            return deferral.pending_count();
        }
        0
    }

    #[inline]
    pub fn trace<'a>(&self, message: impl Into<Message<'a>>) {
        self.log(LogLevel::Trace, message, Detail::none());
    }

    #[inline]
    pub fn debug<'a>(&self, message: impl Into<Message<'a>>) {
        self.log(LogLevel::Debug, message, Detail::none());
    }

    #[inline]
    pub fn info<'a>(&self, message: impl Into<Message<'a>>) {
        self.log(LogLevel::Info, message, Detail::none());
    }

    #[inline]
    pub fn warn<'a>(&self, message: impl Into<Message<'a>>) {
        self.log(LogLevel::Warn, message, Detail::none());
    }

    #[inline]
    pub fn error<'a>(&self, message: impl Into<Message<'a>>) {
        self.log(LogLevel::Error, message, Detail::none());
    }

    #[inline]
    pub fn fatal<'a>(&self, message: impl Into<Message<'a>>) {
        self.log(LogLevel::Fatal, message, Detail::none());
    }

    #[inline]
    pub fn trace_with<'a>(&self, message: impl Into<Message<'a>>, detail: impl Into<Detail<'a>>) {
        self.log(LogLevel::Trace, message, detail.into());
    }

    #[inline]
    pub fn debug_with<'a>(&self, message: impl Into<Message<'a>>, detail: impl Into<Detail<'a>>) {
        self.log(LogLevel::Debug, message, detail.into());
    }

    #[inline]
    pub fn info_with<'a>(&self, message: impl Into<Message<'a>>, detail: impl Into<Detail<'a>>) {
        self.log(LogLevel::Info, message, detail.into());
    }

    #[inline]
    pub fn warn_with<'a>(&self, message: impl Into<Message<'a>>, detail: impl Into<Detail<'a>>) {
        self.log(LogLevel::Warn, message, detail.into());
    }

    #[inline]
    pub fn error_with<'a>(&self, message: impl Into<Message<'a>>, detail: impl Into<Detail<'a>>) {
        self.log(LogLevel::Error, message, detail.into());
    }

    #[inline]
    pub fn fatal_with<'a>(&self, message: impl Into<Message<'a>>, detail: impl Into<Detail<'a>>) {
        self.log(LogLevel::Fatal, message, detail.into());
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("id", self.id())
            .field("name", self.name())
            .field("level", &self.level())
            .finish()
    }
}

/// Render `record` for its channel and write it.
///
/// `stack` replaces the error's own stack when a resolver produced one.
pub(crate) fn emit(record: PreparedRecord, stack: Option<String>, metrics: &LoggerMetrics) {
    let PreparedRecord {
        level,
        time_in_millis,
        names,
        message,
        error,
        args,
        settings,
    } = record;

    let outcome = match settings.channel {
        LogChannel::Raw(ref channel) => {
            let exception = error.map(|mut e| {
                if stack.is_some() {
                    e.stack = stack;
                }
                e
            });
            let raw = RawLogMessage {
                level,
                time_in_millis,
                log_names: names,
                message,
                exception,
                args: if args.is_empty() { None } else { Some(args) },
            };
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                channel.write(&raw, &settings.argument_formatter)
            }))
        }
        LogChannel::Formatted(ref channel) => {
            let mut text = format!(
                "{} [{}] {}",
                settings.date_formatter.format(time_in_millis),
                names,
                message
            );
            if !args.is_empty() {
                let rendered: Vec<String> = args
                    .iter()
                    .map(|arg| settings.argument_formatter.render(arg))
                    .collect();
                text.push_str(" [");
                text.push_str(&rendered.join(", "));
                text.push(']');
            }
            let error = error.map(|e| match stack {
                Some(ref resolved) => e.render_with_stack(Some(resolved)),
                None => e.render(),
            });
            let formatted = LogMessage {
                level,
                message: text,
                error,
            };
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                channel.write(&formatted)
            }))
        }
    };

    match outcome {
        Ok(Ok(())) => {
            metrics.record_logged();
        }
        Ok(Err(e)) => {
            tracing::error!(channel = settings.channel.name(), error = %e, "channel write failed");
            metrics.record_dropped();
        }
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            tracing::error!(
                channel = settings.channel.name(),
                panic = %panic_msg,
                "channel panicked while writing"
            );
            metrics.record_dropped();
        }
    }
}
