//! Saga pattern implementation for business account provisioning.
//!
//! Signup creates five independently-failing resources with no native
//! multi-resource transaction: identity, business profile (with a
//! globally-unique slug), subscription, settings, and branding. This
//! crate orchestrates that sequence as a saga:
//!
//! 1. Create identity
//! 2. Allocate a unique slug and create the business profile
//!    (one retry on a slug-specific uniqueness conflict)
//! 3. Create subscription, settings, branding (best-effort)
//!
//! A failure in step 1 or 2 is fatal: previously completed steps are
//! compensated in reverse order so that a partially created account
//! never survives. Step 3 failures are logged and tolerated.

pub mod allocator;
pub mod compensation;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod instance;
pub mod provisioning;
pub mod state;

pub use allocator::SlugAllocator;
pub use compensation::{CompensationFailure, CompensationOutcome, CompensationRunner};
pub use coordinator::{ProvisioningResult, ProvisioningSaga};
pub use error::SagaError;
pub use events::ProvisioningEvent;
pub use instance::ProvisioningInstance;
pub use state::SagaState;
