//! Saga state machine.

use serde::{Deserialize, Serialize};

/// The coarse state of one provisioning attempt.
///
/// State transitions:
/// ```text
/// NotStarted ──► Running ──┬──► Completed
///                          └──► Compensating ──► Failed
/// ```
///
/// Fine-grained progress (identity created, slug allocated, business
/// created, auxiliaries attempted) is tracked by the instance's
/// completed-step list while the saga is `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SagaState {
    /// Provisioning has not started yet.
    #[default]
    NotStarted,

    /// Creation steps are being executed.
    Running,

    /// A fatal step failed and compensating deletes are in progress.
    Compensating,

    /// The account is fully provisioned (terminal state). Auxiliary
    /// records may be missing; that is tolerated.
    Completed,

    /// Compensation finished after a fatal failure (terminal state).
    /// No account remains.
    Failed,
}

impl SagaState {
    /// Returns true if the saga can begin running.
    pub fn can_run(&self) -> bool {
        matches!(self, SagaState::NotStarted)
    }

    /// Returns true if the saga can begin compensation.
    pub fn can_compensate(&self) -> bool {
        matches!(self, SagaState::Running)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SagaState::Completed | SagaState::Failed)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SagaState::NotStarted => "NotStarted",
            SagaState::Running => "Running",
            SagaState::Compensating => "Compensating",
            SagaState::Completed => "Completed",
            SagaState::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for SagaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
