//! Shared types used across the provisioning workspace.

mod types;

pub use types::{BusinessId, IdentityId};
