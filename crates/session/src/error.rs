//! Session error taxonomy

use llm::ErrorKind;
use thiserror::Error;

/// An error from a session operation.
///
/// `InvalidInput` and `Busy` are caller errors: they are raised before
/// any state changes and never touch the failure counter. `Completion`
/// wraps a classified collaborator failure together with the running
/// count of consecutive failures and the escalation signal.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// The caller's input was rejected before any state change
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Another submission is in flight for this session
    #[error("a submission is already in flight")]
    Busy,

    /// The completion collaborator failed
    #[error("completion failed ({kind:?}): {failures} consecutive failure(s)")]
    Completion {
        /// Classification of the failure
        kind: ErrorKind,
        /// Consecutive failures, including this one
        failures: u32,
        /// Whether the caller should pause before retrying
        escalate: bool,
    },
}

impl SessionError {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }

    /// Whether this failure carries the escalation signal
    pub fn escalated(&self) -> bool {
        matches!(self, Self::Completion { escalate: true, .. })
    }

    /// The completion failure classification, if this is one
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Completion { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
