//! HTTP request/response exchange.
//!
//! # Responsibilities
//! - Send one request with an optional bearer token
//! - Serialize the body as JSON or as form values
//! - Return the response text, or an empty string after logging the failure
//! - Stream a file plus form fields as multipart POST

use std::path::Path;
use std::time::{Duration, Instant};

use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder};
use tracing::{debug, error};

use crate::config::TransportConfig;
use crate::observability::metrics;
use crate::transport::error::TransportError;

/// HTTP verbs used by the adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
        }
    }
}

/// Request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Empty,
    /// Serialized as `application/json`.
    Json(serde_json::Value),
    /// Serialized as `application/x-www-form-urlencoded`, in order.
    Form(Vec<(String, String)>),
}

/// Stateless HTTP exchanger.
///
/// Cloning is cheap and clones share nothing mutable, so one instance can
/// serve concurrent deal sequences.
#[derive(Clone)]
pub struct Transport {
    client: reqwest::Client,
    request_timeout: Duration,
}

impl Transport {
    /// Build a transport with the configured deadlines.
    ///
    /// Idle connections are not kept: every call opens its own connection.
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let request_timeout = Duration::from_secs(config.request_timeout_secs);
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(request_timeout)
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(Self {
            client,
            request_timeout,
        })
    }

    /// Perform one exchange and return the response text.
    ///
    /// Network errors, timeouts, non-2xx statuses, and unreadable bodies all
    /// yield an empty string; the cause is logged here and callers only need
    /// to test for emptiness.
    pub async fn exchange(
        &self,
        url: &str,
        payload: Payload,
        auth_token: Option<&str>,
        method: HttpMethod,
    ) -> String {
        let start = Instant::now();
        let request = self.build(url, payload, auth_token, method);

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                if e.is_timeout() {
                    error!(url = %url, method = ?method, timeout_secs = self.request_timeout.as_secs(), "Request timed out");
                } else {
                    error!(url = %url, method = ?method, error = %e, "Request failed");
                }
                return String::new();
            }
        };
        metrics::record_duration("exchange", start);

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(url = %url, method = ?method, status = %status, body = %body, "Non-success status");
            return String::new();
        }

        match response.text().await {
            Ok(text) => {
                debug!(url = %url, method = ?method, bytes = text.len(), "Response received");
                text
            }
            Err(e) => {
                error!(url = %url, method = ?method, error = %e, "Failed to read response body");
                String::new()
            }
        }
    }

    /// Upload `file_path` as part `file_field` together with `fields`.
    ///
    /// Unlike [`Transport::exchange`], failures are returned so the caller can
    /// tell an unreadable file from a refused upload.
    pub async fn exchange_multipart(
        &self,
        url: &str,
        auth_token: &str,
        fields: &[(String, String)],
        file_field: &str,
        file_path: &Path,
    ) -> Result<String, TransportError> {
        let start = Instant::now();
        let contents = tokio::fs::read(file_path).await.map_err(|source| TransportError::Io {
            path: file_path.display().to_string(),
            source,
        })?;

        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_field.to_string());

        let mut form = Form::new();
        for (name, value) in fields {
            form = form.text(name.clone(), value.clone());
        }
        form = form.part(file_field.to_string(), Part::bytes(contents).file_name(file_name));

        let mut request = self.client.post(url).multipart(form);
        if !auth_token.is_empty() {
            request = request.bearer_auth(auth_token);
        }

        let response = request.send().await?;
        metrics::record_duration("multipart", start);

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(TransportError::Status { status, body });
        }

        debug!(url = %url, bytes = body.len(), "Multipart upload accepted");
        Ok(body)
    }

    fn build(&self, url: &str, payload: Payload, auth_token: Option<&str>, method: HttpMethod) -> RequestBuilder {
        let mut request = self.client.request(method.into(), url);

        if let Some(token) = auth_token.filter(|t| !t.is_empty()) {
            request = request.bearer_auth(token);
        }

        match payload {
            Payload::Empty => request,
            Payload::Json(body) => request.json(&body),
            Payload::Form(fields) => request.form(&fields),
        }
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("timeout_secs", &self.request_timeout.as_secs())
            .finish()
    }
}
