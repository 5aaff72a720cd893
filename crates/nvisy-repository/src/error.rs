//! Errors shared by every repository trait in this crate.

/// Result type alias for `nvisy-repository` operations.
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Errors a repository implementation can raise.
///
/// Intentionally thin: real backends (Postgres, a KV store) translate their
/// own errors down to one of these variants at the trait boundary.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} {id} already exists")]
    AlreadyExists { kind: &'static str, id: String },

    #[error("backend error: {0}")]
    Backend(String),

    #[error("quota exceeded for user {user_id}: requested {requested} bytes, {available} available")]
    QuotaExceeded {
        user_id: String,
        requested: u64,
        available: u64,
    },
}

impl RepositoryError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn already_exists(kind: &'static str, id: impl ToString) -> Self {
        Self::AlreadyExists {
            kind,
            id: id.to_string(),
        }
    }

    pub fn backend(err: impl ToString) -> Self {
        Self::Backend(err.to_string())
    }
}
