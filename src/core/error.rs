//! Error types for the category logging runtime

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Logger or category name rejected at creation time
    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// A provider or category with this name already exists
    #[error("{kind} with name '{name}' already exists")]
    DuplicateName { kind: String, name: String },

    /// Category handed to a provider that did not create it
    #[error(
        "Category '{category}'{} belongs to provider '{actual}', it cannot be used with provider '{expected}'",
        requested_child(.child)
    )]
    ProviderMismatch {
        category: String,
        expected: String,
        actual: String,
        child: Option<String>,
    },

    /// Category is not registered with its provider (e.g. after a clear)
    #[error("Category '{path}'{} is not registered with this provider", requested_child(.child))]
    UnknownCategory { path: String, child: Option<String> },

    /// Positional lookup outside the registered range
    #[error("Index {index} is out of range, valid indices are 0..{len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Identifier lookup without match
    #[error("No entry found with identifier '{identifier}'")]
    UnknownIdentifier { identifier: String },

    /// Level text that does not name a level
    #[error("Invalid log level: '{value}'")]
    InvalidLevel { value: String },

    /// Settings store failure
    #[error("Persistence error for key '{key}': {message}")]
    Persistence { key: String, message: String },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Group expression that does not compile
    #[error("Invalid group expression: {0}")]
    Regex(#[from] regex::Error),

    /// Channel failed to accept a message
    #[error("Channel write error: {0}")]
    ChannelWrite(String),

    /// Argument could not be rendered
    #[error("Argument conversion failed: {0}")]
    ArgumentConversion(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create an invalid name error
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        LoggerError::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a duplicate name error
    pub fn duplicate(kind: impl Into<String>, name: impl Into<String>) -> Self {
        LoggerError::DuplicateName {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create a cross-provider error naming the category and both providers
    pub fn provider_mismatch(
        category: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        LoggerError::ProviderMismatch {
            category: category.into(),
            expected: expected.into(),
            actual: actual.into(),
            child: None,
        }
    }

    /// Name the child whose creation under a category failed
    pub fn with_child(mut self, name: impl Into<String>) -> Self {
        if let LoggerError::ProviderMismatch { ref mut child, .. }
        | LoggerError::UnknownCategory { ref mut child, .. } = self
        {
            *child = Some(name.into());
        }
        self
    }

    /// Create an unknown category error
    pub fn unknown_category(path: impl Into<String>) -> Self {
        LoggerError::UnknownCategory {
            path: path.into(),
            child: None,
        }
    }

    /// Create an index lookup error
    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        LoggerError::IndexOutOfRange { index, len }
    }

    /// Create an identifier lookup error
    pub fn unknown_identifier(identifier: impl Into<String>) -> Self {
        LoggerError::UnknownIdentifier {
            identifier: identifier.into(),
        }
    }

    /// Create an invalid level error
    pub fn invalid_level(value: impl Into<String>) -> Self {
        LoggerError::InvalidLevel {
            value: value.into(),
        }
    }

    /// Create a persistence error
    pub fn persistence(key: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::Persistence {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a channel write error
    pub fn channel<S: Into<String>>(msg: S) -> Self {
        LoggerError::ChannelWrite(msg.into())
    }

    /// Create an argument conversion error
    pub fn argument<S: Into<String>>(msg: S) -> Self {
        LoggerError::ArgumentConversion(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// Whether this error is a caller-fixable configuration mistake
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            LoggerError::InvalidConfiguration { .. }
                | LoggerError::InvalidName { .. }
                | LoggerError::DuplicateName { .. }
                | LoggerError::ProviderMismatch { .. }
                | LoggerError::UnknownCategory { .. }
                | LoggerError::Regex(_)
        )
    }
}

fn requested_child(child: &Option<String>) -> String {
    match child {
        Some(name) => format!(" (requested as parent of '{}')", name),
        None => String::new(),
    }
}
