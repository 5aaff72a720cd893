//! Shared error type used across `nvisy-core` modules.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

/// Type alias for boxed dynamic errors that can be sent across threads.
///
/// This type is commonly used as a source error in structured error types,
/// providing a way to wrap any error that implements the standard `Error`
/// trait while maintaining Send and Sync bounds for multi-threaded contexts.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Result type alias used throughout `nvisy-core`.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Broad categories of failure produced by `nvisy-core` utilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller passed data that does not satisfy a precondition.
    InvalidInput,
    /// Encoding or decoding content (UTF-8, JSON, ...) failed.
    Serialization,
    /// The referenced item does not exist.
    NotFound,
    /// An internal invariant was violated.
    InternalError,
}

impl ErrorKind {
    /// Returns the error kind as a string for categorization.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::Serialization => "serialization",
            Self::NotFound => "not_found",
            Self::InternalError => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error with a category, human-readable message, and optional source.
#[derive(Debug, thiserror::Error)]
#[error("{kind}{}", message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct Error {
    kind: ErrorKind,
    message: Option<Cow<'static, str>>,
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error of the given kind with no message or source.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Attaches a human-readable message, replacing any previous one.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attaches a source error, enabling error chain tracking.
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the attached message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_appended_to_display() {
        let err = Error::new(ErrorKind::InvalidInput).with_message("bad mime type");
        assert_eq!(err.to_string(), "invalid_input: bad mime type");
    }

    #[test]
    fn bare_error_displays_kind_only() {
        let err = Error::new(ErrorKind::NotFound);
        assert_eq!(err.to_string(), "not_found");
    }

    #[test]
    fn source_is_chained() {
        let io_err = std::io::Error::other("boom");
        let err = Error::new(ErrorKind::InternalError).with_source(io_err);
        assert!(StdError::source(&err).is_some());
    }
}
