//! Tests for the completion session cycle.

use confab_session::{Retention, Session, SessionError};
use llm::{Completion, CompletionError, ErrorKind, Message, NoopCompletion, Options, Role};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Notify;

/// Collaborator that replays a scripted sequence of outcomes.
struct Scripted {
    outcomes: Mutex<VecDeque<Result<String, CompletionError>>>,
}

impl Scripted {
    fn new(outcomes: impl IntoIterator<Item = Result<String, CompletionError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
        }
    }
}

impl Completion for Scripted {
    async fn complete(
        &self,
        _messages: &[Message],
        _options: &Options,
    ) -> Result<String, CompletionError> {
        self.outcomes.lock().pop_front().expect("script exhausted")
    }
}

/// Collaborator that records every snapshot it is handed.
struct Recording {
    seen: Arc<Mutex<Vec<Vec<Message>>>>,
    reply: String,
}

impl Completion for Recording {
    async fn complete(
        &self,
        messages: &[Message],
        _options: &Options,
    ) -> Result<String, CompletionError> {
        self.seen.lock().push(messages.to_vec());
        Ok(self.reply.clone())
    }
}

/// Collaborator that parks until the test releases it.
#[derive(Clone)]
struct Gated {
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

impl Gated {
    fn new() -> Self {
        Self {
            entered: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        }
    }
}

impl Completion for Gated {
    async fn complete(
        &self,
        _messages: &[Message],
        _options: &Options,
    ) -> Result<String, CompletionError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok("done".into())
    }
}

// --- Submit cycle ---

#[tokio::test]
async fn successful_submit_appends_both_turns() {
    let session = Session::new(Scripted::new([Ok("hi there".to_owned())]));

    let reply = session.submit("hello", &Options::default()).await.unwrap();
    assert_eq!(reply.role, Role::Assistant);
    assert_eq!(reply.content, "hi there");

    let messages = session.export();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "hello");
    assert_eq!(messages[1].content, "hi there");
    assert_eq!(session.error_count(), 0);
}

#[tokio::test]
async fn failed_submit_keeps_only_the_user_turn() {
    let session = Session::new(Scripted::new([Err(CompletionError::Timeout)]));

    let err = session.submit("hello", &Options::default()).await.unwrap_err();
    let SessionError::Completion {
        kind,
        failures,
        escalate,
    } = err
    else {
        panic!("expected a completion failure");
    };
    assert_eq!(kind, ErrorKind::Timeout);
    assert_eq!(failures, 1);
    assert!(!escalate);

    let messages = session.export();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(session.error_count(), 1);
}

#[tokio::test]
async fn snapshot_contains_the_full_conversation() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let session = Session::new(Recording {
        seen: seen.clone(),
        reply: "answer".into(),
    });

    session.submit("question", &Options::default()).await.unwrap();
    session.submit("follow-up", &Options::default()).await.unwrap();

    let seen = seen.lock();
    assert_eq!(seen[0].len(), 1);
    assert_eq!(seen[0][0].content, "question");
    assert_eq!(seen[1].len(), 3);
    assert_eq!(seen[1][1].role, Role::Assistant);
    assert_eq!(seen[1][2].content, "follow-up");
}

#[tokio::test]
async fn retention_applies_to_replies_too() {
    let session = Session::new(Scripted::new([
        Ok("one".to_owned()),
        Ok("two".to_owned()),
    ]))
    .with_retention(Retention {
        max_messages: 3,
        max_context_chars: 10_000,
    });

    session.submit("first", &Options::default()).await.unwrap();
    session.submit("second", &Options::default()).await.unwrap();

    let messages = session.export();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].content, "one");
    assert_eq!(messages[2].content, "two");
}

// --- Input validation ---

#[tokio::test]
async fn blank_text_rejected_without_reaching_the_collaborator() {
    let session = Session::new(NoopCompletion);

    for text in ["", "   ", "\t\n"] {
        let err = session.submit(text, &Options::default()).await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidInput(_)));
    }

    assert!(session.is_empty());
    assert_eq!(session.error_count(), 0);
}

#[tokio::test]
async fn invalid_options_rejected_without_reaching_the_collaborator() {
    let session = Session::new(NoopCompletion);

    let hot = Options::default().with_temperature(1.5);
    let err = session.submit("hello", &hot).await.unwrap_err();
    assert!(matches!(err, SessionError::InvalidInput(_)));

    let starved = Options::default().with_max_tokens(0);
    let err = session.submit("hello", &starved).await.unwrap_err();
    assert!(matches!(err, SessionError::InvalidInput(_)));

    assert!(session.is_empty());
}

// --- Failure counting and escalation ---

#[tokio::test]
async fn third_consecutive_failure_escalates() {
    let session = Session::new(Scripted::new([
        Err(CompletionError::Timeout),
        Err(CompletionError::Transport("connection refused".into())),
        Err(CompletionError::Unknown("status 500".into())),
    ]));

    let first = session.submit("a", &Options::default()).await.unwrap_err();
    assert_eq!(first.kind(), Some(ErrorKind::Timeout));
    assert!(!first.escalated());

    let second = session.submit("b", &Options::default()).await.unwrap_err();
    assert_eq!(second.kind(), Some(ErrorKind::Transport));
    assert!(!second.escalated());

    let third = session.submit("c", &Options::default()).await.unwrap_err();
    assert_eq!(third.kind(), Some(ErrorKind::Unknown));
    assert!(third.escalated());
    assert!(session.escalated());
    assert_eq!(session.error_count(), 3);
}

#[tokio::test]
async fn success_resets_the_failure_count() {
    let session = Session::new(Scripted::new([
        Err(CompletionError::Transport("reset by peer".into())),
        Err(CompletionError::Timeout),
        Ok("recovered".to_owned()),
        Err(CompletionError::Timeout),
    ]));

    session.submit("a", &Options::default()).await.unwrap_err();
    session.submit("b", &Options::default()).await.unwrap_err();
    assert_eq!(session.error_count(), 2);

    session.submit("c", &Options::default()).await.unwrap();
    assert_eq!(session.error_count(), 0);
    assert!(!session.escalated());

    // The streak starts over, far from the threshold.
    let err = session.submit("d", &Options::default()).await.unwrap_err();
    assert!(!err.escalated());
    assert_eq!(session.error_count(), 1);
}

#[tokio::test]
async fn custom_threshold_escalates_earlier() {
    let session = Session::new(Scripted::new([Err(CompletionError::Timeout)]))
        .with_error_threshold(1);

    let err = session.submit("a", &Options::default()).await.unwrap_err();
    assert!(err.escalated());
}

// --- Re-entrance and cancellation ---

#[tokio::test]
async fn concurrent_submission_rejected_as_busy() {
    let gate = Gated::new();
    let session = Arc::new(Session::new(gate.clone()));

    let background = {
        let session = session.clone();
        tokio::spawn(async move { session.submit("first", &Options::default()).await })
    };
    gate.entered.notified().await;
    assert!(session.in_flight());

    let err = session.submit("second", &Options::default()).await.unwrap_err();
    assert!(matches!(err, SessionError::Busy));
    assert_eq!(session.len(), 1);
    assert_eq!(session.error_count(), 0);

    gate.release.notify_one();
    let reply = background.await.unwrap().unwrap();
    assert_eq!(reply.content, "done");
    assert_eq!(session.len(), 2);
    assert!(!session.in_flight());
}

#[tokio::test]
async fn clear_rejected_while_in_flight() {
    let gate = Gated::new();
    let session = Arc::new(Session::new(gate.clone()));

    let background = {
        let session = session.clone();
        tokio::spawn(async move { session.submit("first", &Options::default()).await })
    };
    gate.entered.notified().await;

    assert!(matches!(session.clear().unwrap_err(), SessionError::Busy));

    gate.release.notify_one();
    background.await.unwrap().unwrap();

    session.clear().unwrap();
    assert!(session.is_empty());
}

#[tokio::test]
async fn dropped_submission_releases_the_latch() {
    let gate = Gated::new();
    let session = Arc::new(Session::new(gate.clone()));

    let background = {
        let session = session.clone();
        tokio::spawn(async move { session.submit("first", &Options::default()).await })
    };
    gate.entered.notified().await;

    background.abort();
    let _ = background.await;

    // The user turn stays, no reply ever lands, and the session is free.
    assert!(!session.in_flight());
    assert_eq!(session.len(), 1);
    session.clear().unwrap();
    assert!(session.is_empty());
}

// --- Clearing ---

#[tokio::test]
async fn clear_resets_history_and_failures() {
    let session = Session::new(Scripted::new([
        Ok("sure".to_owned()),
        Err(CompletionError::Timeout),
    ]));

    session.submit("hello", &Options::default()).await.unwrap();
    session.submit("again", &Options::default()).await.unwrap_err();
    assert_eq!(session.len(), 3);
    assert_eq!(session.error_count(), 1);

    session.clear().unwrap();
    assert!(session.is_empty());
    assert_eq!(session.error_count(), 0);
}
