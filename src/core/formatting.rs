//! Date, argument and message formatting
//!
//! The pure functions in this module are the building blocks of the default
//! formatters installed on every provider. Providers accept replacements for
//! each of them through [`ArgumentFormatter`], [`DateFormatter`] and
//! [`MessageFormatter`].

use super::argument::LogArg;
use super::error::{LoggerError, Result};
use chrono::{Datelike, Local, TimeZone, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Order of the date components in a formatted timestamp
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateOrder {
    /// `2025-01-08`
    #[default]
    YearMonthDay,
    /// `2025-08-01`
    YearDayMonth,
    /// `01-08-2025`
    MonthDayYear,
    /// `08-01-2025`
    DayMonthYear,
}

/// Date component order and separator used by [`format_date_in`].
///
/// The time part is always `HH:mm:ss,SSS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateLayout {
    pub order: DateOrder,
    pub separator: String,
}

impl DateLayout {
    pub fn new(order: DateOrder, separator: impl Into<String>) -> Self {
        Self {
            order,
            separator: separator.into(),
        }
    }
}

impl Default for DateLayout {
    fn default() -> Self {
        Self::new(DateOrder::YearMonthDay, "-")
    }
}

/// Format epoch milliseconds as `YYYY-MM-DD HH:mm:ss,SSS` in local time.
pub fn format_date(epoch_millis: i64) -> String {
    format_date_in(epoch_millis, &Local, &DateLayout::default())
}

/// Format epoch milliseconds in the given time zone and layout.
///
/// Timestamps chrono cannot represent fall back to the raw millisecond count.
pub fn format_date_in<Tz: TimeZone>(epoch_millis: i64, tz: &Tz, layout: &DateLayout) -> String {
    let Some(dt) = tz.timestamp_millis_opt(epoch_millis).single() else {
        return epoch_millis.to_string();
    };

    let year = format!("{:04}", dt.year());
    let month = format!("{:02}", dt.month());
    let day = format!("{:02}", dt.day());
    let sep = &layout.separator;

    let date = match layout.order {
        DateOrder::YearMonthDay => format!("{year}{sep}{month}{sep}{day}"),
        DateOrder::YearDayMonth => format!("{year}{sep}{day}{sep}{month}"),
        DateOrder::MonthDayYear => format!("{month}{sep}{day}{sep}{year}"),
        DateOrder::DayMonthYear => format!("{day}{sep}{month}{sep}{year}"),
    };

    format!(
        "{} {:02}:{:02}:{:02},{:03}",
        date,
        dt.hour(),
        dt.minute(),
        dt.second(),
        dt.timestamp_subsec_millis()
    )
}

/// Default argument rendering.
///
/// `Undefined` becomes `undefined`, strings are used as-is and every other
/// value is rendered as compact JSON. Values that failed to serialize when
/// they were captured are reported as an error.
pub fn format_argument(arg: &LogArg) -> Result<String> {
    match arg {
        LogArg::Undefined => Ok("undefined".to_string()),
        LogArg::Value(serde_json::Value::String(s)) => Ok(s.clone()),
        LogArg::Value(v) => Ok(serde_json::to_string(v)?),
        LogArg::Unconvertible(debug) => Err(LoggerError::argument(debug.clone())),
    }
}

/// Diagnostic text used in place of an argument that could not be rendered
pub fn argument_failure(arg: &LogArg) -> String {
    let raw = match arg {
        LogArg::Undefined => "undefined".to_string(),
        LogArg::Value(v) => v.to_string(),
        LogArg::Unconvertible(debug) => debug.clone(),
    };
    format!(">>ARG CONVERT FAILED: '{}'<<", raw)
}

/// Result of placeholder substitution
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedMessage {
    pub text: String,
    /// Arguments not consumed by a placeholder, in their original order
    pub leftover: Vec<LogArg>,
}

/// Substitute each `{}` in `template` with the next argument, quoted.
///
/// Placeholders without a matching argument stay as literal `{}`. There is
/// no escape for a literal `{}` when arguments remain.
pub fn format_message(
    template: &str,
    args: &[LogArg],
    arg_formatter: &ArgumentFormatter,
) -> FormattedMessage {
    let mut text = String::with_capacity(template.len());
    let mut remaining = template;
    let mut next = 0;

    while let Some(pos) = remaining.find("{}") {
        text.push_str(&remaining[..pos]);
        match args.get(next) {
            Some(arg) => {
                text.push('\'');
                text.push_str(&arg_formatter.render(arg));
                text.push('\'');
                next += 1;
            }
            None => text.push_str("{}"),
        }
        remaining = &remaining[pos + 2..];
    }
    text.push_str(remaining);

    FormattedMessage {
        text,
        leftover: args.get(next..).map(<[LogArg]>::to_vec).unwrap_or_default(),
    }
}

type ArgumentFn = dyn Fn(&LogArg) -> Result<String> + Send + Sync;
type DateFn = dyn Fn(i64) -> String + Send + Sync;
type MessageFn = dyn Fn(&str, &[LogArg], &ArgumentFormatter) -> FormattedMessage + Send + Sync;

/// Renders a single argument; failures are replaced by a diagnostic
#[derive(Clone)]
pub struct ArgumentFormatter(Arc<ArgumentFn>);

impl ArgumentFormatter {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&LogArg) -> Result<String> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Run the formatter without catching failures
    pub fn try_format(&self, arg: &LogArg) -> Result<String> {
        (self.0)(arg)
    }

    /// Run the formatter, turning errors and panics into the diagnostic string
    pub fn render(&self, arg: &LogArg) -> String {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| (self.0)(arg)));
        match result {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "argument formatter failed");
                argument_failure(arg)
            }
            Err(_) => {
                tracing::warn!("argument formatter panicked");
                argument_failure(arg)
            }
        }
    }
}

impl Default for ArgumentFormatter {
    fn default() -> Self {
        Self::new(format_argument)
    }
}

impl fmt::Debug for ArgumentFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ArgumentFormatter(..)")
    }
}

/// Renders the timestamp prefix of formatted messages
#[derive(Clone)]
pub struct DateFormatter(Arc<DateFn>);

impl DateFormatter {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(i64) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Formatter using a fixed time zone and layout
    pub fn with_layout<Tz>(tz: Tz, layout: DateLayout) -> Self
    where
        Tz: TimeZone + Send + Sync + 'static,
    {
        Self::new(move |millis| format_date_in(millis, &tz, &layout))
    }

    pub fn format(&self, epoch_millis: i64) -> String {
        (self.0)(epoch_millis)
    }
}

impl Default for DateFormatter {
    fn default() -> Self {
        Self::new(format_date)
    }
}

impl fmt::Debug for DateFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DateFormatter(..)")
    }
}

/// Placeholder substitution used by caller-driven message formatting
#[derive(Clone)]
pub struct MessageFormatter(Arc<MessageFn>);

impl MessageFormatter {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str, &[LogArg], &ArgumentFormatter) -> FormattedMessage + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn format(
        &self,
        template: &str,
        args: &[LogArg],
        arg_formatter: &ArgumentFormatter,
    ) -> FormattedMessage {
        (self.0)(template, args, arg_formatter)
    }
}

impl Default for MessageFormatter {
    fn default() -> Self {
        Self::new(format_message)
    }
}

impl fmt::Debug for MessageFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MessageFormatter(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    // 2025-01-08 10:30:45.007 UTC
    const FIXED_MILLIS: i64 = 1_736_332_245_007;

    #[test]
    fn test_date_layouts() {
        let utc = Utc;
        assert_eq!(
            format_date_in(FIXED_MILLIS, &utc, &DateLayout::default()),
            "2025-01-08 10:30:45,007"
        );
        assert_eq!(
            format_date_in(FIXED_MILLIS, &utc, &DateLayout::new(DateOrder::DayMonthYear, "/")),
            "08/01/2025 10:30:45,007"
        );
        assert_eq!(
            format_date_in(FIXED_MILLIS, &utc, &DateLayout::new(DateOrder::MonthDayYear, ".")),
            "01.08.2025 10:30:45,007"
        );
        assert_eq!(
            format_date_in(FIXED_MILLIS, &utc, &DateLayout::new(DateOrder::YearDayMonth, "-")),
            "2025-08-01 10:30:45,007"
        );
    }

    #[test]
    fn test_date_respects_time_zone() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(
            format_date_in(FIXED_MILLIS, &plus_two, &DateLayout::default()),
            "2025-01-08 12:30:45,007"
        );
    }

    #[test]
    fn test_format_argument() {
        assert_eq!(format_argument(&LogArg::Undefined).unwrap(), "undefined");
        assert_eq!(format_argument(&LogArg::from("x")).unwrap(), "x");
        assert_eq!(format_argument(&LogArg::from(2)).unwrap(), "2");
        let obj = LogArg::from(serde_json::json!({"a": [1, 2]}));
        assert_eq!(format_argument(&obj).unwrap(), r#"{"a":[1,2]}"#);
        assert!(format_argument(&LogArg::Unconvertible("Cyclic".into())).is_err());
    }

    #[test]
    fn test_format_message_placeholders() {
        let args = vec![LogArg::from("x"), LogArg::from(2)];
        let out = format_message("a {} b {}", &args, &ArgumentFormatter::default());
        assert_eq!(out.text, "a 'x' b '2'");
        assert!(out.leftover.is_empty());
    }

    #[test]
    fn test_format_message_leftover_and_missing() {
        let formatter = ArgumentFormatter::default();

        let out = format_message("no placeholders", &[LogArg::from("unused")], &formatter);
        assert_eq!(out.text, "no placeholders");
        assert_eq!(out.leftover, vec![LogArg::from("unused")]);

        let out = format_message("{} and {}", &[LogArg::from(1)], &formatter);
        assert_eq!(out.text, "'1' and {}");
        assert!(out.leftover.is_empty());
    }

    #[test]
    fn test_failed_argument_is_replaced() {
        let args = vec![LogArg::Unconvertible("Node { next: .. }".into()), LogArg::from(1)];
        let out = format_message("{} {}", &args, &ArgumentFormatter::default());
        assert_eq!(out.text, "'>>ARG CONVERT FAILED: 'Node { next: .. }'<<' '1'");
    }

    #[test]
    fn test_panicking_formatter_is_contained() {
        let formatter = ArgumentFormatter::new(|_| panic!("formatter bug"));
        assert_eq!(
            formatter.render(&LogArg::from(5)),
            ">>ARG CONVERT FAILED: '5'<<"
        );
    }

    #[test]
    fn test_custom_date_formatter() {
        let formatter = DateFormatter::with_layout(Utc, DateLayout::new(DateOrder::DayMonthYear, "."));
        assert_eq!(formatter.format(FIXED_MILLIS), "08.01.2025 10:30:45,007");
    }
}
