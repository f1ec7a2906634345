//! Per-invocation saga instance.

use common::{BusinessId, IdentityId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::events::ProvisioningEvent;
use crate::state::SagaState;

/// Tracks one provisioning attempt.
///
/// Built by applying [`ProvisioningEvent`]s as the coordinator runs.
/// Holds the completed-step list (the compensation undo list, in
/// creation order) and the context ids accumulated during execution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvisioningInstance {
    id: Option<Uuid>,
    saga_type: String,
    email: Option<String>,
    state: SagaState,
    completed_steps: Vec<String>,
    identity_id: Option<IdentityId>,
    business_id: Option<BusinessId>,
    slug: Option<String>,
    /// Auxiliary step failures; tolerated, saga still succeeds.
    aux_failures: Vec<(String, String)>,
    failure_reason: Option<String>,
}

impl ProvisioningInstance {
    /// Applies an event, advancing the instance.
    pub fn apply(&mut self, event: ProvisioningEvent) {
        match event {
            ProvisioningEvent::SagaStarted(data) => {
                self.id = Some(data.saga_id);
                self.email = Some(data.email);
                self.saga_type = data.saga_type;
                self.state = SagaState::Running;
            }
            ProvisioningEvent::StepStarted(_) => {}
            ProvisioningEvent::StepCompleted(data) => {
                self.completed_steps.push(data.step_name);
                if let Some(id) = data.identity_id {
                    self.identity_id = Some(id);
                }
                if let Some(id) = data.business_id {
                    self.business_id = Some(id);
                }
            }
            ProvisioningEvent::SlugAllocated(data) => {
                // A retry replaces the previously allocated slug.
                self.slug = Some(data.slug);
                self.business_id = Some(data.business_id);
            }
            ProvisioningEvent::StepFailed(data) => {
                self.failure_reason = Some(data.error);
            }
            ProvisioningEvent::AuxStepFailed(data) => {
                self.aux_failures.push((data.step_name, data.error));
            }
            ProvisioningEvent::CompensationStarted(_) => {
                self.state = SagaState::Compensating;
            }
            ProvisioningEvent::CompensationStepCompleted(_) => {}
            ProvisioningEvent::CompensationStepFailed(_) => {
                // Recorded by the runner's outcome; never stops the chain.
            }
            ProvisioningEvent::SagaCompleted(_) => {
                self.state = SagaState::Completed;
            }
            ProvisioningEvent::SagaFailed(data) => {
                self.state = SagaState::Failed;
                self.failure_reason = Some(data.reason);
            }
        }
    }

    /// Returns the saga instance id.
    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    /// Returns the saga type.
    pub fn saga_type(&self) -> &str {
        &self.saga_type
    }

    /// Returns the saga state.
    pub fn state(&self) -> SagaState {
        self.state
    }

    /// Completed step names in creation order.
    pub fn completed_steps(&self) -> &[String] {
        &self.completed_steps
    }

    /// Returns the created identity id, if any.
    pub fn identity_id(&self) -> Option<IdentityId> {
        self.identity_id
    }

    /// Returns the pre-generated business id, if allocation reached it.
    pub fn business_id(&self) -> Option<BusinessId> {
        self.business_id
    }

    /// Returns the most recently allocated slug.
    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref()
    }

    /// Auxiliary step failures as `(step, error)` pairs.
    pub fn aux_failures(&self) -> &[(String, String)] {
        &self.aux_failures
    }

    /// Returns the failure reason, if any.
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }
}
