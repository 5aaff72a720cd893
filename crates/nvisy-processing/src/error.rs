//! Errors raised by fetches and typed processors, with an explicit
//! permanent/retryable tag a producer attaches itself rather than leaving to
//! message-sniffing.

use nvisy_queue::{ClassifiedError, HandlerError, ProcessorFailure};

/// An error raised by a fetch or typed processor, already classified by the
/// code that raised it.
///
/// Processors know more about their own failure modes than a generic
/// classifier could infer from a message string alone — "PDF magic bytes
/// don't match" is unambiguously permanent, "connection reset while
/// streaming" is unambiguously retryable. This type lets them say so
/// directly; [`ProcessingError::into_failure`] carries that tag through to
/// the queue's [`nvisy_queue::ErrorClassifier`] as an override.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProcessingError {
    #[error("{message}")]
    Permanent {
        message: String,
        code: Option<String>,
    },
    #[error("{message}")]
    Retryable {
        message: String,
        code: Option<String>,
    },
}

impl ProcessingError {
    pub fn permanent(message: impl Into<String>) -> Self {
        Self::Permanent {
            message: message.into(),
            code: None,
        }
    }

    pub fn permanent_with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Permanent {
            message: message.into(),
            code: Some(code.into()),
        }
    }

    pub fn retryable(message: impl Into<String>) -> Self {
        Self::Retryable {
            message: message.into(),
            code: None,
        }
    }

    pub fn retryable_with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Retryable {
            message: message.into(),
            code: Some(code.into()),
        }
    }

    pub fn into_failure(self) -> ProcessorFailure {
        let (message, code, tag) = match self {
            Self::Permanent { message, code } => (message, code, ClassifiedError::Permanent),
            Self::Retryable { message, code } => (message, code, ClassifiedError::Retryable),
        };
        ProcessorFailure {
            error: HandlerError {
                message,
                code,
                http_status: None,
            },
            tag: Some(tag),
        }
    }
}

impl From<nvisy_data::DataError> for ProcessingError {
    fn from(err: nvisy_data::DataError) -> Self {
        use nvisy_data::DataErrorKind;
        match err.kind() {
            DataErrorKind::NotFound | DataErrorKind::InvalidInput => Self::permanent(err.to_string()),
            DataErrorKind::Backend => Self::retryable(err.to_string()),
        }
    }
}

/// Classifies a `reqwest` error per the spec's fetch rules: connection reset
/// or timeout is retryable, everything else (bad URL, TLS failure, body
/// decode) is treated as permanent since retrying won't change the outcome.
impl From<reqwest::Error> for ProcessingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            Self::retryable_with_code(err.to_string(), "ETIMEDOUT")
        } else {
            Self::permanent(err.to_string())
        }
    }
}
