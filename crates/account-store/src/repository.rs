//! The account repository capability set.

use async_trait::async_trait;
use common::{BusinessId, IdentityId};
use domain::{BrandingConfig, BusinessProfile, NewIdentity, Settings, Subscription};
use uuid::Uuid;

use crate::error::Result;

/// Capability set for creating, inspecting, and deleting the five
/// resource kinds touched by account provisioning.
///
/// No multi-resource transaction is offered: each call commits (or
/// fails) independently, which is exactly why the saga carries its own
/// compensation list. `slug_exists` answers are advisory; the unique
/// constraints behind `create_business_profile` are the source of truth
/// under concurrent signups.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Creates an identity record; the anchor all other records
    /// reference.
    async fn create_identity(&self, identity: NewIdentity) -> Result<IdentityId>;

    /// Deletes an identity. Only invoked as compensation.
    async fn delete_identity(&self, id: IdentityId) -> Result<()>;

    /// Returns whether a slug is already taken.
    async fn slug_exists(&self, slug: &str) -> Result<bool>;

    /// Returns whether an email already maps to a business profile.
    async fn email_has_business(&self, email: &str) -> Result<bool>;

    /// Inserts a business profile. Fails with
    /// [`StoreError::UniquenessConflict`](crate::StoreError::UniquenessConflict)
    /// when the slug or email is taken.
    async fn create_business_profile(&self, profile: BusinessProfile) -> Result<BusinessId>;

    /// Deletes a business profile and its dependent records. Only
    /// invoked as compensation.
    async fn delete_business_profile(&self, id: BusinessId) -> Result<()>;

    /// Inserts a subscription row for a business.
    async fn create_subscription(&self, subscription: Subscription) -> Result<Uuid>;

    /// Inserts the settings row for a business.
    async fn create_settings(&self, settings: Settings) -> Result<Uuid>;

    /// Inserts the branding row for a business.
    async fn create_branding(&self, branding: BrandingConfig) -> Result<Uuid>;
}
