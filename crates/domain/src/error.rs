//! Error types shared across the domain layer.

/// Domain-level errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Input rejected before any state change.
    #[error("validation failed: {0}")]
    Validation(String),
    /// Impermanent loss is only defined for 50/50 two-asset pools here.
    #[error("unsupported pool shape: {0}")]
    UnsupportedPoolShape(String),
}

impl DomainError {
    /// Shorthand for a validation failure.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
