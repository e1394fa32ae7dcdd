//! Confab session core: conversation state and the completion cycle.
//!
//! A [`Session`] owns one conversation: the bounded [`History`], the
//! consecutive-failure counter, and the completion collaborator. The
//! presentation layer feeds it raw user text and renders [`Session::export`];
//! everything in between (what to send, what to keep, how to react to
//! failure) happens here.
//!
//! # Example
//!
//! ```rust,ignore
//! use confab_session::Session;
//! use llm::{Client, HttpCompletion, Options};
//!
//! let provider = HttpCompletion::no_auth(Client::new(), &endpoint, "model");
//! let session = Session::new(provider);
//! let reply = session.submit("hello!", &Options::default()).await?;
//! println!("{}", reply.content);
//! ```

pub use error::SessionError;
pub use history::{DEFAULT_MAX_CONTEXT_CHARS, DEFAULT_MAX_MESSAGES, History, Retention};
pub use llm::{Completion, CompletionError, ErrorKind, Message, Options, Role};

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

mod error;
mod history;

/// Default number of consecutive failures that triggers escalation.
pub const DEFAULT_ERROR_THRESHOLD: u32 = 3;

/// Counter of consecutive failed completion attempts.
///
/// Any success resets the count; once it reaches the threshold the
/// session flags escalation so the caller backs off instead of
/// retrying into a dead backend.
#[derive(Debug)]
pub struct ErrorCounter {
    failures: AtomicU32,
    threshold: u32,
}

impl ErrorCounter {
    /// Create a counter at zero with the given threshold.
    pub fn new(threshold: u32) -> Self {
        Self {
            failures: AtomicU32::new(0),
            threshold,
        }
    }

    /// Record a failure, returning the new count.
    pub fn record(&self) -> u32 {
        self.failures.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Reset the count to zero.
    pub fn reset(&self) {
        self.failures.store(0, Ordering::Relaxed);
    }

    /// Current count of consecutive failures.
    pub fn count(&self) -> u32 {
        self.failures.load(Ordering::Relaxed)
    }

    /// The configured escalation threshold.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Whether the count has reached the threshold.
    pub fn escalated(&self) -> bool {
        self.count() >= self.threshold
    }
}

impl Default for ErrorCounter {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_THRESHOLD)
    }
}

/// One conversation: bounded history, failure counter, collaborator.
///
/// All methods take `&self`, so a session can sit behind an `Arc` and
/// be driven from wherever the presentation layer lives. History writes
/// are single-flight: one submission at a time, and anything else that
/// would write mid-flight is rejected with [`SessionError::Busy`].
pub struct Session<P> {
    provider: P,
    history: Mutex<History>,
    errors: ErrorCounter,
    in_flight: AtomicBool,
}

impl<P: Completion> Session<P> {
    /// Create a session with default retention and escalation threshold.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            history: Mutex::new(History::new()),
            errors: ErrorCounter::default(),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Set the retention limits.
    pub fn with_retention(mut self, retention: Retention) -> Self {
        self.history = Mutex::new(History::with_retention(retention));
        self
    }

    /// Set the escalation threshold.
    pub fn with_error_threshold(mut self, threshold: u32) -> Self {
        self.errors = ErrorCounter::new(threshold);
        self
    }

    /// Submit one user turn and wait for the assistant's reply.
    ///
    /// Validates the input, appends the user message, hands a snapshot
    /// of the conversation to the collaborator, and appends the reply on
    /// success. A failed completion leaves exactly the user message
    /// appended and bumps the failure counter; the `escalate` flag on
    /// the returned error tells the caller to pause before retrying.
    ///
    /// No lock is held across the collaborator call. Dropping the
    /// returned future abandons the attempt: the user message stays, no
    /// assistant message appears later, and the in-flight latch is
    /// released.
    pub async fn submit(&self, text: &str, options: &Options) -> Result<Message, SessionError> {
        if text.trim().is_empty() {
            return Err(SessionError::invalid_input("user text is empty"));
        }
        options.validate().map_err(SessionError::InvalidInput)?;

        let _flight = self.begin()?;

        let context = {
            let mut history = self.history.lock();
            history.push_user(text)?;
            history.export()
        };

        tracing::debug!(turns = context.len(), "requesting completion");
        match self.provider.complete(&context, options).await {
            Ok(reply) => {
                self.errors.reset();
                let message = self.history.lock().push_assistant(reply)?;
                tracing::debug!(chars = message.chars(), "completion succeeded");
                Ok(message)
            }
            Err(err) => {
                let kind = err.kind();
                let failures = self.errors.record();
                let escalate = failures >= self.errors.threshold();
                if escalate {
                    tracing::warn!(%err, failures, "repeated completion failures, back off");
                } else {
                    tracing::warn!(%err, failures, "completion failed");
                }
                Err(SessionError::Completion {
                    kind,
                    failures,
                    escalate,
                })
            }
        }
    }

    /// Empty the history and zero the failure counter.
    ///
    /// Rejected with [`SessionError::Busy`] while a submission is in
    /// flight: the reply landing after the wipe would resurrect half a
    /// conversation.
    pub fn clear(&self) -> Result<(), SessionError> {
        let _flight = self.begin()?;
        self.history.lock().clear();
        self.errors.reset();
        Ok(())
    }

    /// Cloned snapshot of the conversation, oldest first.
    pub fn export(&self) -> Vec<Message> {
        self.history.lock().export()
    }

    /// Number of retained messages.
    pub fn len(&self) -> usize {
        self.history.lock().len()
    }

    /// Whether the conversation holds no messages.
    pub fn is_empty(&self) -> bool {
        self.history.lock().is_empty()
    }

    /// Current count of consecutive completion failures.
    pub fn error_count(&self) -> u32 {
        self.errors.count()
    }

    /// Whether the failure count has reached the escalation threshold.
    pub fn escalated(&self) -> bool {
        self.errors.escalated()
    }

    /// Whether a submission is currently in flight.
    pub fn in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Get a reference to the collaborator.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Latch the in-flight flag, or fail with `Busy`.
    fn begin(&self) -> Result<Flight<'_>, SessionError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Acquire)
            .is_err()
        {
            return Err(SessionError::Busy);
        }
        Ok(Flight(&self.in_flight))
    }
}

/// Releases the in-flight latch when a submission resolves or is dropped.
#[derive(Debug)]
struct Flight<'a>(&'a AtomicBool);

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
