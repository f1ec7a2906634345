//! Reverse-order compensation of completed saga steps.

use account_store::AccountRepository;
use serde::Serialize;

use crate::events::ProvisioningEvent;
use crate::instance::ProvisioningInstance;
use crate::provisioning;

/// A compensating delete that failed.
#[derive(Debug, Clone, Serialize)]
pub struct CompensationFailure {
    /// The step whose undo failed.
    pub step: String,
    /// Error message from the delete.
    pub error: String,
}

/// What compensation achieved.
///
/// An explicit value rather than swallowed exceptions: the saga embeds
/// it in its error so callers and tests can assert on what was (and
/// was not) undone. It never overrides the original failure.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CompensationOutcome {
    undone: Vec<String>,
    failures: Vec<CompensationFailure>,
}

impl CompensationOutcome {
    /// Steps successfully undone, in compensation (reverse-creation) order.
    pub fn undone(&self) -> &[String] {
        &self.undone
    }

    /// Compensating deletes that failed.
    pub fn failures(&self) -> &[CompensationFailure] {
        &self.failures
    }

    /// True when every attempted compensating delete succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Undoes the completed steps of a failed saga, best-effort.
///
/// Walks the instance's completed steps in reverse creation order and
/// invokes the matching delete capability. Each delete is wrapped so a
/// failure there never stops compensation of earlier steps; it is
/// recorded in the outcome and the runner proceeds.
pub struct CompensationRunner<'a, R: AccountRepository> {
    repo: &'a R,
}

impl<'a, R: AccountRepository> CompensationRunner<'a, R> {
    /// Creates a runner over the given repository.
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// Compensates the instance's completed steps. Never errors.
    #[tracing::instrument(skip(self, instance))]
    pub async fn compensate(&self, instance: &mut ProvisioningInstance) -> CompensationOutcome {
        let failed_step = instance.failure_reason().unwrap_or("unknown").to_string();
        instance.apply(ProvisioningEvent::compensation_started(&failed_step));

        let mut outcome = CompensationOutcome::default();
        let completed: Vec<String> = instance.completed_steps().to_vec();

        for step in completed.iter().rev() {
            let result = match step.as_str() {
                provisioning::STEP_CREATE_BUSINESS => match instance.business_id() {
                    Some(business_id) => self.repo.delete_business_profile(business_id).await,
                    None => continue,
                },
                provisioning::STEP_CREATE_IDENTITY => match instance.identity_id() {
                    Some(identity_id) => self.repo.delete_identity(identity_id).await,
                    None => continue,
                },
                // Auxiliary records are never compensated; no fatal
                // step follows them.
                _ => continue,
            };

            match result {
                Ok(()) => {
                    instance.apply(ProvisioningEvent::compensation_step_completed(step));
                    outcome.undone.push(step.clone());
                }
                Err(e) => {
                    tracing::warn!(step, error = %e, "compensating delete failed, continuing");
                    instance.apply(ProvisioningEvent::compensation_step_failed(
                        step,
                        e.to_string(),
                    ));
                    outcome.failures.push(CompensationFailure {
                        step: step.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        metrics::counter!("provisioning_compensations_total").increment(1);
        outcome
    }
}
