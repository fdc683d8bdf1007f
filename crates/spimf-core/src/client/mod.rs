//! HTTP client for the membership backend.
//!
//! One endpoint, one request shape. No retries: every failure is reported
//! back to the caller and ends the current action.

pub mod protocol;

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

pub use self::protocol::{Action, AdminMessage, HealthReport};
use self::protocol::RequestEnvelope;
use crate::config::Config;
use crate::error::{ClientError, ClientResult};

/// Standard User-Agent header for spimf requests.
pub const USER_AGENT: &str = concat!("spimf/", env!("CARGO_PKG_VERSION"));

/// Stateless backend client.
#[derive(Debug, Clone)]
pub struct BackendClient {
    endpoint: String,
    http: reqwest::Client,
}

impl BackendClient {
    /// Builds a client for `endpoint` with an optional per-request timeout.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("build HTTP client")?;

        Ok(Self {
            endpoint: endpoint.into(),
            http,
        })
    }

    /// Builds a client from the resolved endpoint and timeout in `config`.
    ///
    /// # Errors
    /// Returns an error if the endpoint is invalid or the client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let endpoint = config.resolve_endpoint()?;
        Self::new(endpoint, config.request_timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends `action` with `data` and decodes the success payload as `R`.
    ///
    /// # Errors
    /// `Backend` when the backend reports `success: false`, `Transport` for
    /// anything that prevents a well-formed answer.
    pub async fn call<P, R>(&self, action: Action, data: &P) -> ClientResult<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = self.send(action, data).await?;
        parse_response(action, &body)
    }

    /// Sends `action` and only checks that the endpoint answered with a 2xx
    /// status. The body, including its `success` flag, is ignored.
    ///
    /// # Errors
    /// `Transport` for a non-2xx status or a network failure.
    pub async fn ping<P>(&self, action: Action, data: &P) -> ClientResult<()>
    where
        P: Serialize + ?Sized,
    {
        self.send(action, data).await.map(|_| ())
    }

    async fn send<P>(&self, action: Action, data: &P) -> ClientResult<String>
    where
        P: Serialize + ?Sized,
    {
        debug!(%action, endpoint = %self.endpoint, "sending backend request");

        let envelope = RequestEnvelope {
            action: action.as_str(),
            data,
        };
        let response = self
            .http
            .post(&self.endpoint)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| transport_error(action, describe_reqwest_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(%action, body = %truncate(&body, 500), "error response body");
            return Err(transport_error(action, format!("HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| transport_error(action, describe_reqwest_error(&e)))
    }
}

/// Interprets a response body according to the `success`/`message` contract.
pub(crate) fn parse_response<R: DeserializeOwned>(action: Action, body: &str) -> ClientResult<R> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| transport_error(action, format!("invalid JSON: {e}")))?;

    let Some(success) = value.get("success").and_then(Value::as_bool) else {
        return Err(transport_error(action, "missing boolean `success`"));
    };

    if !success {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .map(ToString::to_string);
        debug!(%action, ?message, "backend reported failure");
        return Err(ClientError::backend(message));
    }

    serde_json::from_value(value)
        .map_err(|e| transport_error(action, format!("unexpected response shape: {e}")))
}

fn transport_error(action: Action, detail: impl Into<String>) -> ClientError {
    let detail = detail.into();
    warn!(%action, %detail, "backend request failed");
    ClientError::transport(detail)
}

fn describe_reqwest_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("connection error: {err}")
    } else {
        format!("request error: {err}")
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    }
}
