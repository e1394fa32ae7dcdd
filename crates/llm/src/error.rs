//! Completion failure classification

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A failed completion attempt.
///
/// Variants carry detail for the logs; [`CompletionError::kind`] projects
/// the stable classification the session counts failures by.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The collaborator did not answer within the deadline
    #[error("completion timed out")]
    Timeout,

    /// The request never completed: connection, DNS, or body transfer failed
    #[error("transport failure: {0}")]
    Transport(String),

    /// The reply was not a completions body, or carried no choices
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Anything else, including unexpected HTTP statuses
    #[error("completion failed: {0}")]
    Unknown(String),
}

impl CompletionError {
    /// The classification of this failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout => ErrorKind::Timeout,
            Self::Transport(_) => ErrorKind::Transport,
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Self::Unknown(_) => ErrorKind::Unknown,
        }
    }
}

/// Classification of a completion failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Deadline exceeded
    Timeout,
    /// Network or connection failure
    Transport,
    /// Unparseable reply, or one missing the completion text
    MalformedResponse,
    /// Any other failure
    Unknown,
}
