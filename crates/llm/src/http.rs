//! HTTP transport for OpenAI-compatible completion endpoints.
//!
//! `HttpCompletion` wraps a `reqwest::Client` with pre-configured headers,
//! endpoint URL, and model name. One POST per completion: the conversation
//! snapshot is rendered into a prompt with [`transcript`], the reply text
//! is trimmed and handed back. Transport failures are classified into
//! [`CompletionError`] kinds, never surfaced raw.

use crate::{Completion, CompletionError, Message, Options, Request, Response, transcript};
use anyhow::Result;
use reqwest::{
    Client, Method,
    header::{self, HeaderMap, HeaderValue},
};
use std::time::Duration;

/// Default per-request deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP transport for OpenAI-compatible completion endpoints.
///
/// Holds a `reqwest::Client`, pre-built headers (auth + content-type),
/// the target endpoint URL, and the model name sent with every request.
#[derive(Clone)]
pub struct HttpCompletion {
    client: Client,
    headers: HeaderMap,
    endpoint: String,
    model: String,
    timeout: Duration,
    top_p: Option<f64>,
}

impl HttpCompletion {
    /// Create a transport without authentication.
    ///
    /// In-cluster endpoints behind a service mesh typically take no
    /// credentials at all.
    pub fn no_auth(client: Client, endpoint: &str, model: &str) -> Self {
        Self {
            client,
            headers: json_headers(),
            endpoint: endpoint.to_owned(),
            model: model.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            top_p: None,
        }
    }

    /// Create a transport with Bearer token authentication.
    pub fn bearer(client: Client, key: &str, endpoint: &str, model: &str) -> Result<Self> {
        let mut headers = json_headers();
        headers.insert(header::AUTHORIZATION, format!("Bearer {key}").parse()?);
        Ok(Self {
            client,
            headers,
            endpoint: endpoint.to_owned(),
            model: model.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            top_p: None,
        })
    }

    /// Override the per-request deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the nucleus sampling parameter sent with every request.
    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Build a `reqwest::Client` that accepts invalid TLS certificates.
    ///
    /// Some clusters terminate TLS with self-signed certificates; anything
    /// reachable over public networks should use `Client::new()` instead.
    pub fn insecure_client() -> Result<Client> {
        Client::builder()
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(Into::into)
    }

    /// Get the endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Get the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get a reference to the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

impl Completion for HttpCompletion {
    async fn complete(
        &self,
        messages: &[Message],
        options: &Options,
    ) -> Result<String, CompletionError> {
        let mut body = Request::new(&self.model, transcript(messages), options);
        if let Some(top_p) = self.top_p {
            body = body.with_top_p(top_p);
        }
        tracing::trace!(
            "request: {}",
            serde_json::to_string(&body).unwrap_or_default()
        );

        let response = self
            .client
            .request(Method::POST, &self.endpoint)
            .headers(self.headers.clone())
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        tracing::trace!("response: {text}");

        if !status.is_success() {
            return Err(CompletionError::Unknown(format!(
                "unexpected status {status}"
            )));
        }

        let parsed: Response = serde_json::from_str(&text)
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;
        let completion = parsed
            .text()
            .ok_or_else(|| CompletionError::MalformedResponse("no choices in response".into()))?;
        Ok(completion.trim().to_owned())
    }
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() || err.is_request() || err.is_body() || err.is_redirect() {
            Self::Transport(err.to_string())
        } else {
            Self::Unknown(err.to_string())
        }
    }
}

fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    headers
}
