//! Call-site shapes of a log call
//!
//! A log call carries a message, then an optional error-or-arguments slot,
//! then optional arguments. Each part may be given eagerly or as a closure;
//! closures are only run after the level gate has passed.

use super::argument::{LogArg, LogError};
use super::formatting::{ArgumentFormatter, MessageFormatter};
use std::borrow::Cow;
use std::fmt;

type LazyText<'a> = Box<dyn FnOnce() -> String + 'a>;
type FormatterText<'a> = Box<dyn FnOnce(&mut MessageContext<'_>) -> String + 'a>;

/// The message of a log call
pub enum Message<'a> {
    /// Literal text
    Text(Cow<'a, str>),
    /// Text produced on demand
    Lazy(LazyText<'a>),
    /// Text produced by the caller using the logger's message formatter
    Formatted(FormatterText<'a>),
}

impl<'a> Message<'a> {
    pub fn lazy<F>(f: F) -> Self
    where
        F: FnOnce() -> String + 'a,
    {
        Message::Lazy(Box::new(f))
    }

    /// Build the text with the active message formatter.
    ///
    /// ```
    /// use rust_category_logging::{LogArg, Message};
    ///
    /// let user = "ada";
    /// let msg = Message::formatted(move |fmt| fmt.format("user {} logged in", &[LogArg::from(user)]));
    /// # let _ = msg;
    /// ```
    pub fn formatted<F>(f: F) -> Self
    where
        F: FnOnce(&mut MessageContext<'_>) -> String + 'a,
    {
        Message::Formatted(Box::new(f))
    }

    pub(crate) fn resolve(self, ctx: &mut MessageContext<'_>) -> String {
        match self {
            Message::Text(text) => text.into_owned(),
            Message::Lazy(f) => f(),
            Message::Formatted(f) => f(ctx),
        }
    }
}

impl<'a> From<&'a str> for Message<'a> {
    fn from(s: &'a str) -> Self {
        Message::Text(Cow::Borrowed(s))
    }
}

impl From<String> for Message<'_> {
    fn from(s: String) -> Self {
        Message::Text(Cow::Owned(s))
    }
}

impl<'a> From<&'a String> for Message<'a> {
    fn from(s: &'a String) -> Self {
        Message::Text(Cow::Borrowed(s.as_str()))
    }
}

impl fmt::Debug for Message<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Message::Lazy(_) => f.write_str("Lazy(..)"),
            Message::Formatted(_) => f.write_str("Formatted(..)"),
        }
    }
}

/// Formatting access handed to [`Message::Formatted`] closures.
///
/// Arguments not consumed by a placeholder are kept and appended to the
/// call's arguments.
pub struct MessageContext<'f> {
    message_formatter: &'f MessageFormatter,
    argument_formatter: &'f ArgumentFormatter,
    leftover: Vec<LogArg>,
}

impl<'f> MessageContext<'f> {
    pub(crate) fn new(
        message_formatter: &'f MessageFormatter,
        argument_formatter: &'f ArgumentFormatter,
    ) -> Self {
        Self {
            message_formatter,
            argument_formatter,
            leftover: Vec::new(),
        }
    }

    /// Substitute `{}` placeholders in `template` with `args`
    pub fn format(&mut self, template: &str, args: &[LogArg]) -> String {
        let formatted = self
            .message_formatter
            .format(template, args, self.argument_formatter);
        self.leftover.extend(formatted.leftover);
        formatted.text
    }

    /// Render a single argument with the active argument formatter
    pub fn format_argument(&self, arg: &LogArg) -> String {
        self.argument_formatter.render(arg)
    }

    pub(crate) fn into_leftover(self) -> Vec<LogArg> {
        self.leftover
    }
}

/// The second positional slot once resolved
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorOrArgs {
    Error(LogError),
    Args(Vec<LogArg>),
}

/// A value given directly or computed on demand
pub enum Deferred<'a, T> {
    Ready(T),
    Lazy(Box<dyn FnOnce() -> T + 'a>),
}

impl<T> Deferred<'_, T> {
    pub fn resolve(self) -> T {
        match self {
            Deferred::Ready(value) => value,
            Deferred::Lazy(f) => f(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Deferred<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deferred::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Deferred::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

/// Error and argument slots of a log call
#[derive(Debug, Default)]
pub struct Detail<'a> {
    first: Option<Deferred<'a, ErrorOrArgs>>,
    args: Option<Deferred<'a, Vec<LogArg>>>,
}

impl<'a> Detail<'a> {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn error(error: LogError) -> Self {
        Self {
            first: Some(Deferred::Ready(ErrorOrArgs::Error(error))),
            args: None,
        }
    }

    pub fn lazy_error<F>(f: F) -> Self
    where
        F: FnOnce() -> LogError + 'a,
    {
        Self::lazy(move || ErrorOrArgs::Error(f()))
    }

    pub fn args<I, A>(args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<LogArg>,
    {
        Self {
            first: Some(Deferred::Ready(ErrorOrArgs::Args(
                args.into_iter().map(Into::into).collect(),
            ))),
            args: None,
        }
    }

    pub fn lazy_args<F>(f: F) -> Self
    where
        F: FnOnce() -> Vec<LogArg> + 'a,
    {
        Self::lazy(move || ErrorOrArgs::Args(f()))
    }

    /// Second slot computed on demand; whether it is an error or arguments
    /// is only known once it has run
    pub fn lazy<F>(f: F) -> Self
    where
        F: FnOnce() -> ErrorOrArgs + 'a,
    {
        Self {
            first: Some(Deferred::Lazy(Box::new(f))),
            args: None,
        }
    }

    /// Arguments for the third slot, used when the second slot is an error
    pub fn with_args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<LogArg>,
    {
        self.args = Some(Deferred::Ready(args.into_iter().map(Into::into).collect()));
        self
    }

    pub fn with_lazy_args<F>(mut self, f: F) -> Self
    where
        F: FnOnce() -> Vec<LogArg> + 'a,
    {
        self.args = Some(Deferred::Lazy(Box::new(f)));
        self
    }

    /// Run any thunks and split into error and arguments.
    ///
    /// The third slot only counts when the second slot resolved to an error.
    pub(crate) fn resolve(self) -> (Option<LogError>, Vec<LogArg>) {
        match self.first.map(Deferred::resolve) {
            Some(ErrorOrArgs::Error(error)) => (
                Some(error),
                self.args.map(Deferred::resolve).unwrap_or_default(),
            ),
            Some(ErrorOrArgs::Args(args)) => (None, args),
            None => (None, Vec::new()),
        }
    }
}

impl From<LogError> for Detail<'_> {
    fn from(error: LogError) -> Self {
        Detail::error(error)
    }
}

impl From<Vec<LogArg>> for Detail<'_> {
    fn from(args: Vec<LogArg>) -> Self {
        Detail::args(args)
    }
}
