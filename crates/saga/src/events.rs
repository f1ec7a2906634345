//! Provisioning saga events.
//!
//! Events are applied to a [`ProvisioningInstance`](crate::instance)
//! during one saga run to track progress, context ids, and the
//! completed steps that drive compensation. Saga state is local to one
//! invocation and is not persisted.

use chrono::{DateTime, Utc};
use common::{BusinessId, IdentityId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events that can occur during one provisioning attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ProvisioningEvent {
    /// Saga execution started.
    SagaStarted(SagaStartedData),

    /// A creation step started execution.
    StepStarted(StepData),

    /// A creation step completed successfully.
    StepCompleted(StepCompletedData),

    /// A slug was allocated for the pending business profile.
    SlugAllocated(SlugAllocatedData),

    /// A required step failed; the saga will compensate.
    StepFailed(StepFailedData),

    /// An auxiliary step failed; logged, the saga continues.
    AuxStepFailed(StepFailedData),

    /// Compensation started after a fatal step failure.
    CompensationStarted(CompensationData),

    /// A compensating delete completed successfully.
    CompensationStepCompleted(StepData),

    /// A compensating delete failed (recorded, compensation continues).
    CompensationStepFailed(StepFailedData),

    /// The account is fully provisioned.
    SagaCompleted(SagaCompletedData),

    /// Saga failed after compensation.
    SagaFailed(SagaFailedData),
}

impl ProvisioningEvent {
    /// Returns the event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            ProvisioningEvent::SagaStarted(_) => "SagaStarted",
            ProvisioningEvent::StepStarted(_) => "StepStarted",
            ProvisioningEvent::StepCompleted(_) => "StepCompleted",
            ProvisioningEvent::SlugAllocated(_) => "SlugAllocated",
            ProvisioningEvent::StepFailed(_) => "StepFailed",
            ProvisioningEvent::AuxStepFailed(_) => "AuxStepFailed",
            ProvisioningEvent::CompensationStarted(_) => "CompensationStarted",
            ProvisioningEvent::CompensationStepCompleted(_) => "CompensationStepCompleted",
            ProvisioningEvent::CompensationStepFailed(_) => "CompensationStepFailed",
            ProvisioningEvent::SagaCompleted(_) => "SagaCompleted",
            ProvisioningEvent::SagaFailed(_) => "SagaFailed",
        }
    }
}

/// Data for SagaStarted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SagaStartedData {
    /// The saga instance id.
    pub saga_id: Uuid,
    /// The signup email being provisioned.
    pub email: String,
    /// The saga type (e.g. "AccountProvisioning").
    pub saga_type: String,
    /// When the saga started.
    pub started_at: DateTime<Utc>,
}

/// Data carrying just a step name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepData {
    /// The step name.
    pub step_name: String,
}

/// Data for StepCompleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepCompletedData {
    /// The step name.
    pub step_name: String,
    /// Identity id (set after create_identity).
    pub identity_id: Option<IdentityId>,
    /// Business id (set after create_business_profile).
    pub business_id: Option<BusinessId>,
}

/// Data for SlugAllocated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlugAllocatedData {
    /// The allocated slug. A retry after a slug conflict re-emits this
    /// with the replacement slug.
    pub slug: String,
    /// The pre-generated business id the slug was allocated for.
    pub business_id: BusinessId,
}

/// Data for failed steps (fatal, auxiliary, or compensating).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepFailedData {
    /// The step that failed.
    pub step_name: String,
    /// Error message describing the failure.
    pub error: String,
}

/// Data for CompensationStarted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompensationData {
    /// The step that triggered compensation.
    pub from_step: String,
}

/// Data for SagaCompleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SagaCompletedData {
    /// When the saga completed.
    pub completed_at: DateTime<Utc>,
}

/// Data for SagaFailed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SagaFailedData {
    /// Reason for failure.
    pub reason: String,
    /// When the saga failed.
    pub failed_at: DateTime<Utc>,
}

// Convenience constructors
impl ProvisioningEvent {
    /// Creates a SagaStarted event.
    pub fn saga_started(saga_id: Uuid, email: impl Into<String>, saga_type: impl Into<String>) -> Self {
        ProvisioningEvent::SagaStarted(SagaStartedData {
            saga_id,
            email: email.into(),
            saga_type: saga_type.into(),
            started_at: Utc::now(),
        })
    }

    /// Creates a StepStarted event.
    pub fn step_started(step_name: impl Into<String>) -> Self {
        ProvisioningEvent::StepStarted(StepData {
            step_name: step_name.into(),
        })
    }

    /// Creates a StepCompleted event.
    pub fn step_completed(
        step_name: impl Into<String>,
        identity_id: Option<IdentityId>,
        business_id: Option<BusinessId>,
    ) -> Self {
        ProvisioningEvent::StepCompleted(StepCompletedData {
            step_name: step_name.into(),
            identity_id,
            business_id,
        })
    }

    /// Creates a SlugAllocated event.
    pub fn slug_allocated(slug: impl Into<String>, business_id: BusinessId) -> Self {
        ProvisioningEvent::SlugAllocated(SlugAllocatedData {
            slug: slug.into(),
            business_id,
        })
    }

    /// Creates a StepFailed event.
    pub fn step_failed(step_name: impl Into<String>, error: impl Into<String>) -> Self {
        ProvisioningEvent::StepFailed(StepFailedData {
            step_name: step_name.into(),
            error: error.into(),
        })
    }

    /// Creates an AuxStepFailed event.
    pub fn aux_step_failed(step_name: impl Into<String>, error: impl Into<String>) -> Self {
        ProvisioningEvent::AuxStepFailed(StepFailedData {
            step_name: step_name.into(),
            error: error.into(),
        })
    }

    /// Creates a CompensationStarted event.
    pub fn compensation_started(from_step: impl Into<String>) -> Self {
        ProvisioningEvent::CompensationStarted(CompensationData {
            from_step: from_step.into(),
        })
    }

    /// Creates a CompensationStepCompleted event.
    pub fn compensation_step_completed(step_name: impl Into<String>) -> Self {
        ProvisioningEvent::CompensationStepCompleted(StepData {
            step_name: step_name.into(),
        })
    }

    /// Creates a CompensationStepFailed event.
    pub fn compensation_step_failed(
        step_name: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        ProvisioningEvent::CompensationStepFailed(StepFailedData {
            step_name: step_name.into(),
            error: error.into(),
        })
    }

    /// Creates a SagaCompleted event.
    pub fn saga_completed() -> Self {
        ProvisioningEvent::SagaCompleted(SagaCompletedData {
            completed_at: Utc::now(),
        })
    }

    /// Creates a SagaFailed event.
    pub fn saga_failed(reason: impl Into<String>) -> Self {
        ProvisioningEvent::SagaFailed(SagaFailedData {
            reason: reason.into(),
            failed_at: Utc::now(),
        })
    }
}
