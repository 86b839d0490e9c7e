use thiserror::Error;

/// Result type for estimation operations
pub type EstimationResult<T> = Result<T, EstimationError>;

/// Errors that can occur in the estimation domain
///
/// A lookup that simply finds no matching catalog entry is NOT an error:
/// the engine returns `Ok(None)` for that case.
#[derive(Debug, Error)]
pub enum EstimationError {
    /// A request field failed validation. Carries the offending field and a
    /// machine-readable reason code; never retried.
    #[error("Invalid request field '{field}': {code}")]
    Rejected { field: String, code: String },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EstimationError {
    pub fn rejected(field: &str, code: &str) -> Self {
        Self::Rejected {
            field: field.to_string(),
            code: code.to_string(),
        }
    }
}
