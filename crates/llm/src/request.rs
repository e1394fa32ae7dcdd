//! OpenAI-compatible completions request body.
//!
//! Targets the legacy `/v1/completions` shape served by vLLM and
//! compatible backends: one rendered prompt string, not a message list.
//! Optional fields use `skip_serializing_if` so knobs the caller left
//! unset are simply absent from the payload.

use crate::{Message, Options, Role};
use serde::Serialize;

/// Default nucleus sampling parameter sent with every request.
pub const DEFAULT_TOP_P: f64 = 0.95;

/// OpenAI-compatible completions request body.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// The model identifier.
    pub model: String,
    /// The rendered prompt.
    pub prompt: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Nucleus sampling parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Number of completions to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    /// Whether to stream the response.
    pub stream: bool,
    /// Stop sequences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
}

impl Request {
    /// Build a request for `model` from a rendered prompt and options.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>, options: &Options) -> Self {
        let stop: Vec<String> = options.stop_sequences.iter().cloned().collect();
        Self {
            model: model.into(),
            prompt: prompt.into(),
            max_tokens: options.max_tokens,
            temperature: Some(options.temperature),
            top_p: Some(DEFAULT_TOP_P),
            n: Some(1),
            stream: false,
            stop: (!stop.is_empty()).then_some(stop),
        }
    }

    /// Override the nucleus sampling parameter.
    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }
}

/// Render a conversation as a completions prompt.
///
/// One `User:`/`Assistant:` line per message, ending with a bare
/// `Assistant:` cue for the model to continue. Turns are joined by a
/// single newline: the default stop sequence is a blank line, and a
/// blank line between turns would end generation instantly.
pub fn transcript(messages: &[Message]) -> String {
    let mut prompt = String::new();
    for message in messages {
        let label = match message.role {
            Role::User => "User",
            Role::Assistant => "Assistant",
        };
        prompt.push_str(label);
        prompt.push_str(": ");
        prompt.push_str(&message.content);
        prompt.push('\n');
    }
    prompt.push_str("Assistant:");
    prompt
}
