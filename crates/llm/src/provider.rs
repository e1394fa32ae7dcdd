//! Provider abstraction for completion collaborators

use crate::{CompletionError, Message, Options};

/// A trait for completion collaborators
///
/// The session hands over a read-only snapshot of the conversation and
/// the sampling options; the implementation owns prompt construction and
/// transport, and returns the generated text or a classified failure.
pub trait Completion: Send + Sync {
    /// Produce a completion for the conversation
    fn complete(
        &self,
        messages: &[Message],
        options: &Options,
    ) -> impl Future<Output = Result<String, CompletionError>> + Send;
}
