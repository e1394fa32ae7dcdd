//! Completion collaborator interface types and traits.
//!
//! This crate provides the shared types used by the session core and any
//! completion backend: `Message`, `Options`, `Response`, the `Completion`
//! trait, and the failure classification in `CompletionError`. With the
//! `http` feature (default) it also provides `HttpCompletion` for
//! OpenAI-compatible `/v1/completions` endpoints and the wire `Request`.

pub use error::{CompletionError, ErrorKind};
#[cfg(feature = "http")]
pub use http::{DEFAULT_TIMEOUT, HttpCompletion};
pub use message::{Message, Role};
pub use noop::NoopCompletion;
pub use options::{DEFAULT_MAX_TOKENS, DEFAULT_STOP, DEFAULT_TEMPERATURE, Options};
pub use provider::Completion;
#[cfg(feature = "http")]
pub use request::{DEFAULT_TOP_P, Request, transcript};
#[cfg(feature = "http")]
pub use reqwest::{self, Client};
pub use response::{Choice, CompletionMeta, FinishReason, Response, Usage};

mod error;
#[cfg(feature = "http")]
mod http;
mod message;
mod noop;
mod options;
mod provider;
#[cfg(feature = "http")]
mod request;
mod response;
