//! Bounded conversation history.
//!
//! An append-only message log with retention enforced on every append:
//! the oldest messages are evicted first until both the message-count
//! cap and the character budget hold. The newest message is never
//! evicted, however long it is, so the collaborator always sees at
//! least the turn that was just submitted.

use crate::SessionError;
use llm::{Message, Role};
use serde::{Deserialize, Serialize};

/// Default cap on the number of retained messages.
pub const DEFAULT_MAX_MESSAGES: usize = 50;

/// Default budget for the total character length of retained content.
pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 2000;

/// Retention limits for a conversation history
///
/// Both limits apply independently; characters are Unicode scalar
/// values, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Retention {
    /// Maximum number of messages to retain
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,

    /// Maximum total character length of retained content
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
}

impl Default for Retention {
    fn default() -> Self {
        Self {
            max_messages: default_max_messages(),
            max_context_chars: default_max_context_chars(),
        }
    }
}

fn default_max_messages() -> usize {
    DEFAULT_MAX_MESSAGES
}

fn default_max_context_chars() -> usize {
    DEFAULT_MAX_CONTEXT_CHARS
}

/// An ordered conversation history bounded by [`Retention`].
///
/// Messages are immutable once appended; the log grows at the tail and
/// shrinks from the head.
#[derive(Debug, Clone)]
pub struct History {
    messages: Vec<Message>,
    retention: Retention,
}

impl History {
    /// Create an empty history with default retention.
    pub fn new() -> Self {
        Self::with_retention(Retention::default())
    }

    /// Create an empty history with the given retention.
    pub fn with_retention(retention: Retention) -> Self {
        Self {
            messages: Vec::new(),
            retention,
        }
    }

    /// Append a message with the given role, then enforce retention.
    ///
    /// An empty user message is rejected with `InvalidInput` and the
    /// history is left untouched. Returns a clone of the stored message.
    pub fn push(&mut self, role: Role, content: impl Into<String>) -> Result<Message, SessionError> {
        let content = content.into();
        if role == Role::User && content.is_empty() {
            return Err(SessionError::invalid_input("user message is empty"));
        }
        let message = Message::new(role, content);
        self.messages.push(message.clone());
        self.enforce_retention();
        Ok(message)
    }

    /// Append a user message.
    pub fn push_user(&mut self, content: impl Into<String>) -> Result<Message, SessionError> {
        self.push(Role::User, content)
    }

    /// Append an assistant message.
    pub fn push_assistant(&mut self, content: impl Into<String>) -> Result<Message, SessionError> {
        self.push(Role::Assistant, content)
    }

    /// Evict from the head until both retention limits hold.
    ///
    /// Deterministic and idempotent: calling it again with no new
    /// appends is a no-op. The character budget never evicts the last
    /// remaining message. A `max_messages` of zero is treated as one,
    /// so an append always retains at least the appended message.
    pub fn enforce_retention(&mut self) {
        let max_messages = self.retention.max_messages.max(1);
        if self.messages.len() > max_messages {
            let excess = self.messages.len() - max_messages;
            self.messages.drain(..excess);
        }

        let mut total = self.content_chars();
        let mut evict = 0;
        while total > self.retention.max_context_chars && self.messages.len() - evict > 1 {
            total -= self.messages[evict].chars();
            evict += 1;
        }
        if evict > 0 {
            self.messages.drain(..evict);
        }
    }

    /// Total character length of all retained content.
    pub fn content_chars(&self) -> usize {
        self.messages.iter().map(Message::chars).sum()
    }

    /// Remove every message.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// The retained messages, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Cloned snapshot of the retained messages, oldest first.
    ///
    /// The snapshot does not alias the log: mutating it has no effect
    /// on later reads.
    pub fn export(&self) -> Vec<Message> {
        self.messages.clone()
    }

    /// Number of retained messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the history holds no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The most recent message, if any.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// The retention limits in force.
    pub fn retention(&self) -> Retention {
        self.retention
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_appends_in_order() {
        let mut history = History::new();
        history.push_user("question").unwrap();
        history.push_assistant("answer").unwrap();

        let messages = history.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "question");
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, "answer");
    }

    #[test]
    fn empty_user_message_rejected() {
        let mut history = History::new();
        let err = history.push_user("").unwrap_err();
        assert!(matches!(err, SessionError::InvalidInput(_)));
        assert!(history.is_empty());
    }

    #[test]
    fn empty_assistant_message_allowed() {
        let mut history = History::new();
        history.push_assistant("").unwrap();
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn clear_empties_the_log() {
        let mut history = History::new();
        history.push_user("hello").unwrap();
        history.clear();
        assert!(history.is_empty());
        assert!(history.last_message().is_none());
    }

    #[test]
    fn export_is_a_detached_copy() {
        let mut history = History::new();
        history.push_user("hello").unwrap();

        let mut snapshot = history.export();
        snapshot.clear();

        assert_eq!(history.len(), 1);
        assert_eq!(history.export().len(), 1);
    }

    #[test]
    fn push_returns_the_stored_message() {
        let mut history = History::new();
        let message = history.push_user("hello").unwrap();
        assert_eq!(message.content, "hello");
        assert_eq!(message.role, Role::User);
        assert_eq!(history.last_message().unwrap().content, "hello");
    }

    #[test]
    fn retention_defaults() {
        let retention = Retention::default();
        assert_eq!(retention.max_messages, 50);
        assert_eq!(retention.max_context_chars, 2000);
    }

    #[test]
    fn retention_from_partial_config() {
        let retention: Retention = serde_json::from_str(r#"{"max_messages": 10}"#).unwrap();
        assert_eq!(retention.max_messages, 10);
        assert_eq!(retention.max_context_chars, 2000);
    }
}
