//! Classifies a handler-reported failure as permanent, retryable, or unknown.
//!
//! Rules are evaluated in order, first match wins:
//! 1. HTTP status: 4xx other than 408/429 is permanent; 408, 429, and 5xx
//!    are retryable.
//! 2. A known permanent error code.
//! 3. A known retryable error code.
//! 4. Case-insensitive substring match against the message — permanent
//!    phrases are checked first, so a message matching both lists classifies
//!    permanent.
//! 5. Otherwise, unknown.
//!
//! A producer may attach an explicit [`ClassifiedError`] tag to a
//! [`HandlerError`] to bypass all of the above.

/// A failure as reported by a handler, before classification.
#[derive(Debug, Clone, Default)]
pub struct HandlerError {
    pub message: String,
    pub code: Option<String>,
    pub http_status: Option<u16>,
}

/// An explicit override a producer can attach to a [`HandlerError`] to skip
/// the classifier's heuristics entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifiedError {
    Permanent,
    Retryable,
}

/// The three-way verdict [`ErrorClassifier::classify`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Permanent,
    Retryable,
    Unknown,
}

const PERMANENT_CODES: &[&str] = &[
    "ENOENT",
    "EACCES",
    "EPERM",
    "INVALID_FILE",
    "MALFORMED_DATA",
    "AUTHENTICATION_ERROR",
    "AUTHORIZATION_ERROR",
];

const RETRYABLE_CODES: &[&str] = &[
    "ECONNRESET",
    "ECONNREFUSED",
    "ETIMEDOUT",
    "ENOTFOUND",
    "EAI_AGAIN",
    "EPIPE",
    "NETWORK_ERROR",
    "TIMEOUT_ERROR",
    "SERVICE_UNAVAILABLE",
    "RATE_LIMITED",
    "TEMPORARY_FAILURE",
];

const PERMANENT_MESSAGE_SUBSTRINGS: &[&str] = &[
    "invalid",
    "unauthorized",
    "forbidden",
    "not found",
    "malformed",
    "corrupt",
    "unsupported",
    "exceeded quota",
];

const RETRYABLE_MESSAGE_SUBSTRINGS: &[&str] = &[
    "timeout",
    "network",
    "connection",
    "unavailable",
    "rate limit",
    "temporary",
    "transient",
    "socket hang up",
    "econnreset",
    "econnrefused",
    "etimedout",
];

/// Stateless, pure classifier for handler-reported failures.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorClassifier;

impl ErrorClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Applies the ordered rule set to `error`, independent of any producer tag.
    pub fn classify(&self, error: &HandlerError) -> Classification {
        if let Some(status) = error.http_status {
            if (400..500).contains(&status) && !matches!(status, 408 | 429) {
                return Classification::Permanent;
            }
            if matches!(status, 408 | 429) || status >= 500 {
                return Classification::Retryable;
            }
        }

        if let Some(code) = error.code.as_deref() {
            let upper = code.to_ascii_uppercase();
            if PERMANENT_CODES.contains(&upper.as_str()) {
                return Classification::Permanent;
            }
            if RETRYABLE_CODES.contains(&upper.as_str()) {
                return Classification::Retryable;
            }
        }

        let lower = error.message.to_ascii_lowercase();
        if PERMANENT_MESSAGE_SUBSTRINGS.iter().any(|s| lower.contains(s)) {
            return Classification::Permanent;
        }
        if RETRYABLE_MESSAGE_SUBSTRINGS.iter().any(|s| lower.contains(s)) {
            return Classification::Retryable;
        }

        Classification::Unknown
    }

    /// Whether the error should be retried, honoring an explicit producer tag
    /// first and otherwise treating `unknown` as retryable — the queue still
    /// enforces `max_attempts`, so an unclassified error can never retry
    /// forever.
    pub fn is_retryable(&self, error: &HandlerError, tag: Option<ClassifiedError>) -> bool {
        if let Some(tag) = tag {
            return tag == ClassifiedError::Retryable;
        }
        !matches!(self.classify(error), Classification::Permanent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn err(message: &str) -> HandlerError {
        HandlerError {
            message: message.to_string(),
            code: None,
            http_status: None,
        }
    }

    #[test]
    fn explicit_tag_overrides_everything() {
        let classifier = ErrorClassifier::new();
        let mut e = err("timeout while uploading");
        e.http_status = Some(400);
        assert!(!classifier.is_retryable(&e, Some(ClassifiedError::Permanent)));
        assert!(classifier.is_retryable(&e, Some(ClassifiedError::Retryable)));
    }

    #[test]
    fn http_4xx_is_permanent_except_408_429() {
        let classifier = ErrorClassifier::new();
        let mut e = err("bad request");
        e.http_status = Some(400);
        assert_eq!(classifier.classify(&e), Classification::Permanent);
        e.http_status = Some(408);
        assert_eq!(classifier.classify(&e), Classification::Retryable);
        e.http_status = Some(429);
        assert_eq!(classifier.classify(&e), Classification::Retryable);
        e.http_status = Some(503);
        assert_eq!(classifier.classify(&e), Classification::Retryable);
    }

    #[test]
    fn known_codes_are_checked_before_message() {
        let classifier = ErrorClassifier::new();
        let mut e = err("connection reset by peer");
        e.code = Some("invalid_file".to_string());
        assert_eq!(classifier.classify(&e), Classification::Permanent);
    }

    #[test]
    fn permanent_message_substring_wins_over_retryable() {
        let classifier = ErrorClassifier::new();
        let e = err("network timeout: file not found");
        assert_eq!(classifier.classify(&e), Classification::Permanent);
    }

    #[test]
    fn unknown_error_classifies_unknown_but_is_retryable() {
        let classifier = ErrorClassifier::new();
        let e = err("something went sideways");
        assert_eq!(classifier.classify(&e), Classification::Unknown);
        assert!(classifier.is_retryable(&e, None));
    }
}
