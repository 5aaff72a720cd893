//! Error types for data I/O operations.

use std::borrow::Cow;

/// Result type alias for data I/O operations.
pub type DataResult<T> = std::result::Result<T, DataError>;

/// Category of a [`DataError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataErrorKind {
    /// The requested path does not exist.
    NotFound,
    /// The underlying storage backend reported a failure.
    Backend,
    /// The caller-supplied arguments were invalid.
    InvalidInput,
}

/// Error type returned by [`crate::DataInput`] and [`crate::DataOutput`] implementations.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind:?}: {message}")]
pub struct DataError {
    kind: DataErrorKind,
    message: Cow<'static, str>,
}

impl DataError {
    /// Creates a new error of the given kind.
    pub fn new(kind: DataErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for a [`DataErrorKind::NotFound`] error.
    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(DataErrorKind::NotFound, message)
    }

    /// Shorthand for a [`DataErrorKind::Backend`] error wrapping a backend's message.
    pub fn backend(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(DataErrorKind::Backend, message)
    }

    /// Shorthand for a [`DataErrorKind::InvalidInput`] error.
    pub fn invalid_input(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(DataErrorKind::InvalidInput, message)
    }

    /// Returns the error kind.
    pub fn kind(&self) -> DataErrorKind {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_carries_kind() {
        let err = DataError::backend("connection reset");
        assert_eq!(err.kind(), DataErrorKind::Backend);
        assert!(err.to_string().contains("connection reset"));
    }
}
