//! In-memory account repository for testing.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{BusinessId, IdentityId};
use domain::{BrandingConfig, BusinessProfile, Identity, NewIdentity, Settings, Subscription};
use uuid::Uuid;

use crate::error::{ConflictField, Result, StoreError};
use crate::repository::AccountRepository;

/// An injected failure for the next `create_business_profile` call.
///
/// Queued failures are consumed one per call, so a test can make the
/// first insert conflict and let the retry succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusinessWriteFailure {
    SlugConflict,
    EmailConflict,
    Generic,
}

impl BusinessWriteFailure {
    fn into_error(self) -> StoreError {
        match self {
            BusinessWriteFailure::SlugConflict => StoreError::UniquenessConflict {
                field: ConflictField::Slug,
            },
            BusinessWriteFailure::EmailConflict => StoreError::UniquenessConflict {
                field: ConflictField::Email,
            },
            BusinessWriteFailure::Generic => {
                StoreError::WriteFailed("injected write failure".to_string())
            }
        }
    }
}

#[derive(Debug, Default)]
struct State {
    identities: HashMap<IdentityId, Identity>,
    businesses: HashMap<BusinessId, BusinessProfile>,
    subscriptions: HashMap<Uuid, Subscription>,
    settings: HashMap<Uuid, Settings>,
    branding: HashMap<Uuid, BrandingConfig>,
    // Slugs registered without a full profile; test seeding only.
    seeded_slugs: HashSet<String>,
    calls: u32,
    fail_on_create_identity: bool,
    fail_on_delete_identity: bool,
    fail_on_slug_lookup: bool,
    fail_on_create_subscription: bool,
    fail_on_create_settings: bool,
    fail_on_create_branding: bool,
    business_failures: VecDeque<BusinessWriteFailure>,
}

impl State {
    fn slug_taken(&self, slug: &str) -> bool {
        self.seeded_slugs.contains(slug) || self.businesses.values().any(|b| b.slug == slug)
    }
}

/// In-memory account repository with real uniqueness enforcement on
/// slug and email, plus failure injection for saga tests.
///
/// Provides the same interface as the PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryAccountRepository {
    state: Arc<RwLock<State>>,
}

impl InMemoryAccountRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the next `create_identity` call to fail.
    pub fn set_fail_on_create_identity(&self, fail: bool) {
        self.state.write().unwrap().fail_on_create_identity = fail;
    }

    /// Configures `delete_identity` calls to fail.
    pub fn set_fail_on_delete_identity(&self, fail: bool) {
        self.state.write().unwrap().fail_on_delete_identity = fail;
    }

    /// Configures `slug_exists` calls to return an error.
    pub fn set_fail_on_slug_lookup(&self, fail: bool) {
        self.state.write().unwrap().fail_on_slug_lookup = fail;
    }

    /// Configures `create_subscription` calls to fail.
    pub fn set_fail_on_create_subscription(&self, fail: bool) {
        self.state.write().unwrap().fail_on_create_subscription = fail;
    }

    /// Configures `create_settings` calls to fail.
    pub fn set_fail_on_create_settings(&self, fail: bool) {
        self.state.write().unwrap().fail_on_create_settings = fail;
    }

    /// Configures `create_branding` calls to fail.
    pub fn set_fail_on_create_branding(&self, fail: bool) {
        self.state.write().unwrap().fail_on_create_branding = fail;
    }

    /// Queues a failure for an upcoming `create_business_profile` call.
    pub fn push_business_failure(&self, failure: BusinessWriteFailure) {
        self.state.write().unwrap().business_failures.push_back(failure);
    }

    /// Registers a slug as taken without creating a profile.
    pub fn seed_slug(&self, slug: &str) {
        self.state.write().unwrap().seeded_slugs.insert(slug.to_string());
    }

    /// Total number of repository calls made.
    pub fn call_count(&self) -> u32 {
        self.state.read().unwrap().calls
    }

    /// Number of stored identities.
    pub fn identity_count(&self) -> usize {
        self.state.read().unwrap().identities.len()
    }

    /// Number of stored business profiles.
    pub fn business_count(&self) -> usize {
        self.state.read().unwrap().businesses.len()
    }

    /// Number of stored subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.state.read().unwrap().subscriptions.len()
    }

    /// Number of stored settings rows.
    pub fn settings_count(&self) -> usize {
        self.state.read().unwrap().settings.len()
    }

    /// Number of stored branding rows.
    pub fn branding_count(&self) -> usize {
        self.state.read().unwrap().branding.len()
    }

    /// True if an identity exists with the given id.
    pub fn has_identity(&self, id: IdentityId) -> bool {
        self.state.read().unwrap().identities.contains_key(&id)
    }

    /// Returns the stored profile for a business id.
    pub fn business(&self, id: BusinessId) -> Option<BusinessProfile> {
        self.state.read().unwrap().businesses.get(&id).cloned()
    }

    /// Returns the subscription attached to a business, if any.
    pub fn subscription_for(&self, business_id: BusinessId) -> Option<Subscription> {
        self.state
            .read()
            .unwrap()
            .subscriptions
            .values()
            .find(|s| s.business_id == business_id)
            .cloned()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn create_identity(&self, identity: NewIdentity) -> Result<IdentityId> {
        let mut state = self.state.write().unwrap();
        state.calls += 1;

        if state.fail_on_create_identity {
            return Err(StoreError::IdentityRejected(
                "identity provider unavailable".to_string(),
            ));
        }
        if state.identities.values().any(|i| i.email == identity.email) {
            return Err(StoreError::IdentityRejected(format!(
                "email {} already registered",
                identity.email
            )));
        }

        let id = IdentityId::new();
        state.identities.insert(
            id,
            Identity {
                id,
                email: identity.email,
                display_name: identity.display_name,
            },
        );
        Ok(id)
    }

    async fn delete_identity(&self, id: IdentityId) -> Result<()> {
        let mut state = self.state.write().unwrap();
        state.calls += 1;

        if state.fail_on_delete_identity {
            return Err(StoreError::WriteFailed(
                "injected delete failure".to_string(),
            ));
        }
        state.identities.remove(&id);
        Ok(())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let mut state = self.state.write().unwrap();
        state.calls += 1;

        if state.fail_on_slug_lookup {
            return Err(StoreError::WriteFailed(
                "slug lookup unavailable".to_string(),
            ));
        }
        Ok(state.slug_taken(slug))
    }

    async fn email_has_business(&self, email: &str) -> Result<bool> {
        let mut state = self.state.write().unwrap();
        state.calls += 1;
        Ok(state.businesses.values().any(|b| b.email == email))
    }

    async fn create_business_profile(&self, profile: BusinessProfile) -> Result<BusinessId> {
        let mut state = self.state.write().unwrap();
        state.calls += 1;

        if let Some(failure) = state.business_failures.pop_front() {
            return Err(failure.into_error());
        }
        if state.slug_taken(&profile.slug) {
            return Err(StoreError::UniquenessConflict {
                field: ConflictField::Slug,
            });
        }
        if state.businesses.values().any(|b| b.email == profile.email) {
            return Err(StoreError::UniquenessConflict {
                field: ConflictField::Email,
            });
        }

        let id = profile.id;
        state.businesses.insert(id, profile);
        Ok(id)
    }

    async fn delete_business_profile(&self, id: BusinessId) -> Result<()> {
        let mut state = self.state.write().unwrap();
        state.calls += 1;

        state.businesses.remove(&id);
        state.subscriptions.retain(|_, s| s.business_id != id);
        state.settings.retain(|_, s| s.business_id != id);
        state.branding.retain(|_, b| b.business_id != id);
        Ok(())
    }

    async fn create_subscription(&self, subscription: Subscription) -> Result<Uuid> {
        let mut state = self.state.write().unwrap();
        state.calls += 1;

        if state.fail_on_create_subscription {
            return Err(StoreError::WriteFailed(
                "injected subscription failure".to_string(),
            ));
        }
        let id = subscription.id;
        state.subscriptions.insert(id, subscription);
        Ok(id)
    }

    async fn create_settings(&self, settings: Settings) -> Result<Uuid> {
        let mut state = self.state.write().unwrap();
        state.calls += 1;

        if state.fail_on_create_settings {
            return Err(StoreError::WriteFailed(
                "injected settings failure".to_string(),
            ));
        }
        let id = settings.id;
        state.settings.insert(id, settings);
        Ok(id)
    }

    async fn create_branding(&self, branding: BrandingConfig) -> Result<Uuid> {
        let mut state = self.state.write().unwrap();
        state.calls += 1;

        if state.fail_on_create_branding {
            return Err(StoreError::WriteFailed(
                "injected branding failure".to_string(),
            ));
        }
        let id = branding.id;
        state.branding.insert(id, branding);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::BusinessId;
    use domain::SignupRequest;

    fn request() -> SignupRequest {
        SignupRequest {
            business_name: "Joe's Pizza".to_string(),
            business_description: "Wood-fired pizza".to_string(),
            website_url: None,
            owner_name: "Joe".to_string(),
            email: "joe@x.com".to_string(),
            phone: None,
            password: "p@ssW0rd1".to_string(),
            category: "restaurant".to_string(),
            plan_id: "free".to_string(),
        }
    }

    fn profile(slug: &str, email: &str) -> BusinessProfile {
        let mut req = request();
        req.email = email.to_string();
        BusinessProfile::from_signup(
            BusinessId::new(),
            slug.to_string(),
            IdentityId::new(),
            &req,
        )
    }

    #[tokio::test]
    async fn create_and_delete_identity() {
        let repo = InMemoryAccountRepository::new();
        let id = repo
            .create_identity(NewIdentity::from_signup(&request()))
            .await
            .unwrap();

        assert!(repo.has_identity(id));
        repo.delete_identity(id).await.unwrap();
        assert!(!repo.has_identity(id));
    }

    #[tokio::test]
    async fn duplicate_identity_email_is_rejected() {
        let repo = InMemoryAccountRepository::new();
        let identity = NewIdentity::from_signup(&request());
        repo.create_identity(identity.clone()).await.unwrap();

        let err = repo.create_identity(identity).await.unwrap_err();
        assert!(matches!(err, StoreError::IdentityRejected(_)));
    }

    #[tokio::test]
    async fn slug_uniqueness_is_enforced() {
        let repo = InMemoryAccountRepository::new();
        repo.create_business_profile(profile("joes-pizza", "a@x.com"))
            .await
            .unwrap();

        assert!(repo.slug_exists("joes-pizza").await.unwrap());
        assert!(!repo.slug_exists("other").await.unwrap());

        let err = repo
            .create_business_profile(profile("joes-pizza", "b@x.com"))
            .await
            .unwrap_err();
        assert!(err.is_slug_conflict());
    }

    #[tokio::test]
    async fn email_uniqueness_is_enforced() {
        let repo = InMemoryAccountRepository::new();
        repo.create_business_profile(profile("joes-pizza", "joe@x.com"))
            .await
            .unwrap();

        assert!(repo.email_has_business("joe@x.com").await.unwrap());

        let err = repo
            .create_business_profile(profile("other", "joe@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::UniquenessConflict {
                field: ConflictField::Email
            }
        ));
    }

    #[tokio::test]
    async fn injected_failures_are_consumed_in_order() {
        let repo = InMemoryAccountRepository::new();
        repo.push_business_failure(BusinessWriteFailure::SlugConflict);

        let err = repo
            .create_business_profile(profile("joes-pizza", "joe@x.com"))
            .await
            .unwrap_err();
        assert!(err.is_slug_conflict());

        // Queue drained: the same insert now succeeds.
        repo.create_business_profile(profile("joes-pizza", "joe@x.com"))
            .await
            .unwrap();
        assert_eq!(repo.business_count(), 1);
    }

    #[tokio::test]
    async fn delete_business_cascades_to_dependents() {
        let repo = InMemoryAccountRepository::new();
        let p = profile("joes-pizza", "joe@x.com");
        let business_id = p.id;
        repo.create_business_profile(p).await.unwrap();
        repo.create_subscription(Subscription::for_plan(business_id, "free"))
            .await
            .unwrap();
        repo.create_settings(Settings::defaults(business_id))
            .await
            .unwrap();

        repo.delete_business_profile(business_id).await.unwrap();
        assert_eq!(repo.business_count(), 0);
        assert_eq!(repo.subscription_count(), 0);
        assert_eq!(repo.settings_count(), 0);
    }

    #[tokio::test]
    async fn call_count_tracks_every_capability() {
        let repo = InMemoryAccountRepository::new();
        assert_eq!(repo.call_count(), 0);

        repo.slug_exists("joes-pizza").await.unwrap();
        repo.email_has_business("joe@x.com").await.unwrap();
        assert_eq!(repo.call_count(), 2);
    }
}
