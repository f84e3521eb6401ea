//! Error type for the persistence layer.

/// Errors surfaced by the store and its repositories.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Input rejected before reaching the database.
    #[error("validation failed: {0}")]
    Validation(String),
    /// The referenced row does not exist.
    #[error("record not found")]
    NotFound,
    /// Underlying database failure.
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

impl StoreError {
    /// Shorthand for a validation failure.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
