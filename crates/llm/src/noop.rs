//! No-op completion collaborator for testing.
//!
//! Implements [`Completion`] but panics on `complete`. Intended for unit
//! tests that exercise validation, history, and session logic without
//! making real completion calls.

use crate::{Completion, CompletionError, Message, Options};

/// A no-op collaborator that panics on any actual completion call.
///
/// # Panics
///
/// `complete` panics if called. Only use this collaborator in tests
/// that never reach the transport.
#[derive(Clone, Copy)]
pub struct NoopCompletion;

impl Completion for NoopCompletion {
    async fn complete(
        &self,
        _messages: &[Message],
        _options: &Options,
    ) -> Result<String, CompletionError> {
        panic!("NoopCompletion::complete called — not intended for real completion calls");
    }
}
