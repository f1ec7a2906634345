//! Domain error types.

use thiserror::Error;

/// Errors raised while validating a signup request.
///
/// Validation runs before any resource is touched, so these errors
/// never require compensation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The email address is not plausibly well-formed.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),
}
