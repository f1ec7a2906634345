//! Saga error taxonomy.

use account_store::StoreError;
use domain::ValidationError;
use thiserror::Error;

use crate::compensation::CompensationOutcome;

/// Errors a provisioning attempt can surface to its caller.
///
/// Auxiliary failures (subscription/settings/branding) and compensation
/// failures are deliberately absent: those are absorbed locally and
/// observable through logs and [`CompensationOutcome`]; the caller only
/// ever sees the original fatal error.
#[derive(Debug, Error)]
pub enum SagaError {
    /// A required field is missing or malformed. Raised before any
    /// resource is touched.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The signup email already maps to an existing business profile.
    /// Advisory pre-check; the insert constraint is the backstop for
    /// the race this check cannot close.
    #[error("email {0} is already registered to a business")]
    EmailAlreadyRegistered(String),

    /// The identity provider rejected the signup. Nothing was created,
    /// so there is nothing to compensate.
    #[error("identity creation failed: {0}")]
    IdentityCreation(StoreError),

    /// Business profile creation failed (after the single slug-conflict
    /// retry, where applicable). The identity created earlier in this
    /// run has been compensated; the outcome records how that went.
    #[error("business profile creation failed: {source}")]
    BusinessCreation {
        source: StoreError,
        compensation: CompensationOutcome,
    },
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;
