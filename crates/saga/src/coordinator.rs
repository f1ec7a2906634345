//! Saga coordinator orchestrating account provisioning.

use account_store::AccountRepository;
use chrono::Utc;
use common::{BusinessId, IdentityId};
use domain::{BrandingConfig, BusinessProfile, NewIdentity, Settings, SignupRequest, Subscription};
use serde::Serialize;
use uuid::Uuid;

use crate::allocator::SlugAllocator;
use crate::compensation::CompensationRunner;
use crate::error::SagaError;
use crate::events::ProvisioningEvent;
use crate::instance::ProvisioningInstance;
use crate::provisioning;

/// Successful provisioning outcome.
#[derive(Debug, Clone, Serialize)]
pub struct ProvisioningResult {
    /// The created identity id.
    pub identity_id: IdentityId,
    /// The created business profile id.
    pub business_id: BusinessId,
    /// The slug the profile was created under.
    pub slug: String,
}

/// Orchestrates the provisioning of a business account.
///
/// One `run` is a sequential chain of repository calls on the calling
/// task; all saga state is local to the invocation. Identity and
/// business-profile creation are required steps with compensation on
/// failure; subscription, settings, and branding are best-effort.
pub struct ProvisioningSaga<R: AccountRepository> {
    repo: R,
}

impl<R: AccountRepository> ProvisioningSaga<R> {
    /// Creates a new saga over the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Executes one provisioning attempt.
    ///
    /// Either returns a fully provisioned account (possibly missing
    /// cosmetic defaults) or an error with no account remaining.
    #[tracing::instrument(skip(self, request), fields(saga_type = provisioning::SAGA_TYPE))]
    pub async fn run(&self, request: SignupRequest) -> Result<ProvisioningResult, SagaError> {
        metrics::counter!("provisioning_runs_total").increment(1);
        let saga_start = std::time::Instant::now();

        // 1. Validate before any side effect: nothing to compensate.
        request.validate()?;

        // 2. Advisory duplicate-email pre-check. A race is still
        // possible; the profile insert's unique constraint is the
        // actual arbiter and surfaces as a named conflict there.
        if self.email_in_use(&request.email).await {
            return Err(SagaError::EmailAlreadyRegistered(request.email));
        }

        let saga_id = Uuid::new_v4();
        let mut instance = ProvisioningInstance::default();
        instance.apply(ProvisioningEvent::saga_started(
            saga_id,
            &request.email,
            provisioning::SAGA_TYPE,
        ));

        // 3. Create identity. Fatal on failure, nothing created yet.
        tracing::info!(step = provisioning::STEP_CREATE_IDENTITY, "saga step started");
        instance.apply(ProvisioningEvent::step_started(
            provisioning::STEP_CREATE_IDENTITY,
        ));
        let identity_id = match self
            .repo
            .create_identity(NewIdentity::from_signup(&request))
            .await
        {
            Ok(id) => {
                instance.apply(ProvisioningEvent::step_completed(
                    provisioning::STEP_CREATE_IDENTITY,
                    Some(id),
                    None,
                ));
                id
            }
            Err(e) => {
                instance.apply(ProvisioningEvent::step_failed(
                    provisioning::STEP_CREATE_IDENTITY,
                    e.to_string(),
                ));
                instance.apply(ProvisioningEvent::saga_failed(e.to_string()));
                metrics::counter!("provisioning_failed").increment(1);
                tracing::warn!(%saga_id, error = %e, "identity creation failed");
                return Err(SagaError::IdentityCreation(e));
            }
        };

        // 4. Allocate a slug against a pre-generated business id so
        // dependent records can reference the id consistently.
        let business_id = BusinessId::new();
        let allocator = SlugAllocator::new(&self.repo);
        let slug = allocator
            .allocate(&request.business_name, Some(business_id))
            .await;
        instance.apply(ProvisioningEvent::slug_allocated(&slug, business_id));

        // 5. Create the business profile; one retry on a slug-specific
        // conflict, keyed on the error kind, never on message text.
        tracing::info!(step = provisioning::STEP_CREATE_BUSINESS, "saga step started");
        instance.apply(ProvisioningEvent::step_started(
            provisioning::STEP_CREATE_BUSINESS,
        ));
        let insert = self
            .repo
            .create_business_profile(BusinessProfile::from_signup(
                business_id,
                slug.clone(),
                identity_id,
                &request,
            ))
            .await;
        let insert = match insert {
            Err(e) if e.is_slug_conflict() => {
                metrics::counter!("provisioning_slug_retries_total").increment(1);
                tracing::warn!(%saga_id, slug, "slug conflict on insert, retrying with salted slug");

                // Salting the name with the current time gives the
                // allocator a candidate with negligible collision odds.
                let salted = format!("{}-{}", request.business_name, Utc::now().timestamp_millis());
                let retry_slug = allocator.allocate(&salted, Some(business_id)).await;
                instance.apply(ProvisioningEvent::slug_allocated(&retry_slug, business_id));

                self.repo
                    .create_business_profile(BusinessProfile::from_signup(
                        business_id,
                        retry_slug,
                        identity_id,
                        &request,
                    ))
                    .await
            }
            other => other,
        };

        match insert {
            Ok(_) => {
                instance.apply(ProvisioningEvent::step_completed(
                    provisioning::STEP_CREATE_BUSINESS,
                    None,
                    Some(business_id),
                ));
            }
            Err(source) => {
                instance.apply(ProvisioningEvent::step_failed(
                    provisioning::STEP_CREATE_BUSINESS,
                    source.to_string(),
                ));

                let compensation = CompensationRunner::new(&self.repo)
                    .compensate(&mut instance)
                    .await;
                instance.apply(ProvisioningEvent::saga_failed(source.to_string()));

                metrics::counter!("provisioning_failed").increment(1);
                metrics::histogram!("provisioning_duration_seconds")
                    .record(saga_start.elapsed().as_secs_f64());
                tracing::warn!(
                    %saga_id,
                    error = %source,
                    compensation_clean = compensation.is_clean(),
                    "business profile creation failed, identity compensated"
                );
                return Err(SagaError::BusinessCreation {
                    source,
                    compensation,
                });
            }
        }

        // 6-8. Best-effort auxiliaries. A transient failure in a
        // cosmetic subsystem must not strand an otherwise-valid account.
        self.try_aux_step(
            &mut instance,
            provisioning::STEP_CREATE_SUBSCRIPTION,
            self.repo
                .create_subscription(Subscription::for_plan(business_id, &request.plan_id))
                .await,
        );
        self.try_aux_step(
            &mut instance,
            provisioning::STEP_CREATE_SETTINGS,
            self.repo.create_settings(Settings::defaults(business_id)).await,
        );
        self.try_aux_step(
            &mut instance,
            provisioning::STEP_CREATE_BRANDING,
            self.repo.create_branding(BrandingConfig::defaults(business_id)).await,
        );

        instance.apply(ProvisioningEvent::saga_completed());

        let slug = instance
            .slug()
            .unwrap_or_default()
            .to_string();
        let duration = saga_start.elapsed().as_secs_f64();
        metrics::histogram!("provisioning_duration_seconds").record(duration);
        metrics::counter!("provisioning_completed").increment(1);
        tracing::info!(%saga_id, %business_id, slug, duration, "account provisioned");

        Ok(ProvisioningResult {
            identity_id,
            business_id,
            slug,
        })
    }

    /// Records an auxiliary step outcome; failures are warnings only.
    fn try_aux_step(
        &self,
        instance: &mut ProvisioningInstance,
        step: &'static str,
        result: account_store::Result<Uuid>,
    ) {
        instance.apply(ProvisioningEvent::step_started(step));
        match result {
            Ok(_) => {
                instance.apply(ProvisioningEvent::step_completed(step, None, None));
            }
            Err(e) => {
                tracing::warn!(step, error = %e, "auxiliary step failed, continuing");
                metrics::counter!("provisioning_aux_failures_total", "step" => step).increment(1);
                instance.apply(ProvisioningEvent::aux_step_failed(step, e.to_string()));
            }
        }
    }

    async fn email_in_use(&self, email: &str) -> bool {
        match self.repo.email_has_business(email).await {
            Ok(in_use) => in_use,
            Err(e) => {
                tracing::warn!(error = %e, "email pre-check failed, deferring to insert constraint");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use account_store::{BusinessWriteFailure, InMemoryAccountRepository, StoreError};
    use domain::SubscriptionStatus;

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

    fn setup() -> (ProvisioningSaga<InMemoryAccountRepository>, InMemoryAccountRepository) {
        let repo = InMemoryAccountRepository::new();
        (ProvisioningSaga::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn happy_path_provisions_all_five_records() {
        let (saga, repo) = setup();

        let result = saga.run(request()).await.unwrap();

        assert_eq!(result.slug, "joes-pizza");
        assert_eq!(repo.identity_count(), 1);
        assert_eq!(repo.subscription_count(), 1);
        assert_eq!(repo.settings_count(), 1);
        assert_eq!(repo.branding_count(), 1);

        let profile = repo.business(result.business_id).unwrap();
        assert_eq!(profile.owner_id, result.identity_id);
        assert!(profile.is_active);

        let sub = repo.subscription_for(result.business_id).unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Trial);
        assert!(sub.trial_ends_at.is_some());
    }

    #[tokio::test]
    async fn validation_failure_never_touches_the_repository() {
        let (saga, repo) = setup();
        let mut req = request();
        req.email = String::new();

        let err = saga.run(req).await.unwrap_err();
        assert!(matches!(err, SagaError::Validation(_)));
        assert_eq!(repo.call_count(), 0);
    }

    #[tokio::test]
    async fn identity_failure_aborts_with_nothing_to_compensate() {
        let (saga, repo) = setup();
        repo.set_fail_on_create_identity(true);

        let err = saga.run(request()).await.unwrap_err();
        assert!(matches!(err, SagaError::IdentityCreation(_)));
        assert_eq!(repo.identity_count(), 0);
        assert_eq!(repo.business_count(), 0);
    }

    #[tokio::test]
    async fn fatal_business_failure_rolls_back_the_identity() {
        let (saga, repo) = setup();
        repo.push_business_failure(BusinessWriteFailure::Generic);

        let err = saga.run(request()).await.unwrap_err();
        let SagaError::BusinessCreation {
            source,
            compensation,
        } = err
        else {
            panic!("expected BusinessCreation error");
        };

        assert!(matches!(source, StoreError::WriteFailed(_)));
        assert!(compensation.is_clean());
        assert_eq!(compensation.undone(), &[provisioning::STEP_CREATE_IDENTITY]);
        assert_eq!(repo.identity_count(), 0);
        assert_eq!(repo.business_count(), 0);
        assert_eq!(repo.subscription_count(), 0);
    }

    #[tokio::test]
    async fn slug_conflict_retries_once_then_succeeds() {
        let (saga, repo) = setup();
        repo.push_business_failure(BusinessWriteFailure::SlugConflict);

        let result = saga.run(request()).await.unwrap();

        // Succeeded on the retry with a salted slug; no compensation.
        assert!(result.slug.starts_with("joes-pizza-"));
        assert_eq!(repo.identity_count(), 1);
        assert_eq!(repo.business_count(), 1);
        assert_eq!(repo.business(result.business_id).unwrap().slug, result.slug);
    }

    #[tokio::test]
    async fn second_slug_conflict_is_fatal() {
        let (saga, repo) = setup();
        repo.push_business_failure(BusinessWriteFailure::SlugConflict);
        repo.push_business_failure(BusinessWriteFailure::SlugConflict);

        let err = saga.run(request()).await.unwrap_err();
        let SagaError::BusinessCreation { source, .. } = err else {
            panic!("expected BusinessCreation error");
        };
        assert!(source.is_slug_conflict());
        assert_eq!(repo.identity_count(), 0);
    }

    #[tokio::test]
    async fn email_conflict_never_retries() {
        let (saga, repo) = setup();
        repo.push_business_failure(BusinessWriteFailure::EmailConflict);
        // A queued second failure would be consumed by a retry; it must
        // still be there afterwards.
        repo.push_business_failure(BusinessWriteFailure::Generic);

        let err = saga.run(request()).await.unwrap_err();
        let SagaError::BusinessCreation { source, .. } = err else {
            panic!("expected BusinessCreation error");
        };
        assert!(!source.is_slug_conflict());
        assert!(matches!(source, StoreError::UniquenessConflict { .. }));
        assert_eq!(repo.identity_count(), 0);
    }

    #[tokio::test]
    async fn compensation_failure_keeps_the_original_error() {
        let (saga, repo) = setup();
        repo.push_business_failure(BusinessWriteFailure::Generic);
        repo.set_fail_on_delete_identity(true);

        let err = saga.run(request()).await.unwrap_err();
        let SagaError::BusinessCreation {
            source,
            compensation,
        } = err
        else {
            panic!("expected BusinessCreation error");
        };

        // Caller sees the original failure; the botched cleanup is
        // observable in the outcome.
        assert!(matches!(source, StoreError::WriteFailed(_)));
        assert!(!compensation.is_clean());
        assert_eq!(repo.identity_count(), 1);
    }

    #[tokio::test]
    async fn settings_failure_is_tolerated() {
        let (saga, repo) = setup();
        repo.set_fail_on_create_settings(true);

        let result = saga.run(request()).await.unwrap();

        assert_eq!(repo.settings_count(), 0);
        assert_eq!(repo.business_count(), 1);
        assert_eq!(repo.subscription_count(), 1);
        assert_eq!(repo.branding_count(), 1);
        assert!(repo.business(result.business_id).is_some());
    }

    #[tokio::test]
    async fn all_auxiliary_failures_still_succeed() {
        let (saga, repo) = setup();
        repo.set_fail_on_create_subscription(true);
        repo.set_fail_on_create_settings(true);
        repo.set_fail_on_create_branding(true);

        let result = saga.run(request()).await.unwrap();

        assert_eq!(repo.business_count(), 1);
        assert_eq!(repo.subscription_count(), 0);
        assert_eq!(repo.settings_count(), 0);
        assert_eq!(repo.branding_count(), 0);
        assert_eq!(result.slug, "joes-pizza");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_up_front() {
        let (saga, repo) = setup();
        saga.run(request()).await.unwrap();

        let mut second = request();
        second.business_name = "Joe's Other Pizza".to_string();

        let err = saga.run(second).await.unwrap_err();
        assert!(matches!(err, SagaError::EmailAlreadyRegistered(_)));
        assert_eq!(repo.identity_count(), 1);
        assert_eq!(repo.business_count(), 1);
    }

    #[tokio::test]
    async fn pending_status_for_paid_plans() {
        let (saga, repo) = setup();
        let mut req = request();
        req.plan_id = "pro".to_string();

        let result = saga.run(req).await.unwrap();
        let sub = repo.subscription_for(result.business_id).unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Pending);
        assert!(sub.trial_ends_at.is_none());
    }
}
