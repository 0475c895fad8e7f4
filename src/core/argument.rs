//! Values that travel with a log call: positional arguments and errors

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// A positional log argument.
///
/// Arguments are captured as JSON values so that every channel can render or
/// forward them without knowing the caller's types.
#[derive(Debug, Clone, PartialEq)]
pub enum LogArg {
    /// An absent value, rendered as `undefined`
    Undefined,
    /// Any JSON-representable value
    Value(serde_json::Value),
    /// A value whose serialization failed; holds its debug rendering
    Unconvertible(String),
}

impl LogArg {
    /// Capture any serializable value.
    ///
    /// Serialization failures do not panic: the value is kept as
    /// [`LogArg::Unconvertible`] and rendered as a diagnostic later.
    pub fn json<T: Serialize + fmt::Debug + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(v) => LogArg::Value(v),
            Err(_) => LogArg::Unconvertible(format!("{:?}", value)),
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, LogArg::Undefined)
    }
}

impl Serialize for LogArg {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LogArg::Undefined => serializer.serialize_none(),
            LogArg::Value(v) => v.serialize(serializer),
            LogArg::Unconvertible(debug) => serializer.serialize_str(debug),
        }
    }
}

impl From<serde_json::Value> for LogArg {
    fn from(v: serde_json::Value) -> Self {
        LogArg::Value(v)
    }
}

impl From<&str> for LogArg {
    fn from(s: &str) -> Self {
        LogArg::Value(serde_json::Value::String(s.to_string()))
    }
}

impl From<String> for LogArg {
    fn from(s: String) -> Self {
        LogArg::Value(serde_json::Value::String(s))
    }
}

impl From<bool> for LogArg {
    fn from(b: bool) -> Self {
        LogArg::Value(serde_json::Value::Bool(b))
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for LogArg {
                fn from(n: $t) -> Self {
                    LogArg::Value(serde_json::Value::from(n))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl From<f64> for LogArg {
    fn from(f: f64) -> Self {
        // NaN and infinities have no JSON form
        serde_json::Number::from_f64(f)
            .map(|n| LogArg::Value(serde_json::Value::Number(n)))
            .unwrap_or_else(|| LogArg::Unconvertible(f.to_string()))
    }
}

impl<T: Into<LogArg>> From<Option<T>> for LogArg {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(LogArg::Undefined)
    }
}

/// An error attached to a log call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogError {
    pub name: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl LogError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            stack: None,
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Capture a Rust error: the short type name, its message, and the
    /// chain of sources as the stack.
    pub fn from_error<E: std::error::Error + 'static>(error: &E) -> Self {
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(format!("caused by: {}", cause));
            source = cause.source();
        }

        Self {
            name: short_type_name::<E>().to_string(),
            message: error.to_string(),
            stack: if causes.is_empty() {
                None
            } else {
                Some(causes.join("\n"))
            },
        }
    }

    /// `"{name}: {message}"`, followed by `"@\n{stack}"` when a stack exists
    pub fn render(&self) -> String {
        self.render_with_stack(self.stack.as_deref())
    }

    pub(crate) fn render_with_stack(&self, stack: Option<&str>) -> String {
        match stack {
            Some(stack) => format!("{}: {}@\n{}", self.name, self.message, stack),
            None => format!("{}: {}", self.name, self.message),
        }
    }
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
