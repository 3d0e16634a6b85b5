use thiserror::Error;

/// Errors from repository operations (used by trait definitions in parley-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,
}

/// Errors surfaced by the session service.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Required fields missing or empty on a request.
    #[error("{0}")]
    BadRequest(String),

    /// The referenced session does not exist.
    #[error("session not found")]
    NotFound,

    /// A payload field failed validation.
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("storage error: {0}")]
    Storage(RepositoryError),
}

impl ChatError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        ChatError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<RepositoryError> for ChatError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => ChatError::NotFound,
            other => ChatError::Storage(other),
        }
    }
}
