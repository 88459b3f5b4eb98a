use thiserror::Error;

/// Errors that can occur while building, numbering, or persisting invoices.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BijakError {
    /// One or more validation rules failed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Invoice number parsing or sequencing error.
    #[error("numbering error: {0}")]
    Numbering(String),

    /// Lookup by key found nothing where a record was required.
    #[error("not found: {0}")]
    NotFound(String),

    /// Underlying persistence failure, surfaced verbatim.
    #[cfg(feature = "store")]
    #[error(transparent)]
    Storage(#[from] crate::store::StoreError),
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "customer.phone").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Join field errors into a single [`BijakError::Validation`].
pub fn validation_failure(errors: &[ValidationError]) -> BijakError {
    let msg = errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    BijakError::Validation(msg)
}
