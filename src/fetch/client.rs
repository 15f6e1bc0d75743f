use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::config::HttpConfig;

/// An expected peer-unavailability condition, returned as a value so callers
/// can record and count it per peer instead of unwinding.
#[derive(Debug, Clone, Error)]
pub enum FetchFailure {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("malformed response body: {0}")]
    MalformedBody(String),
}

impl FetchFailure {
    /// HTTP status to record on the peer, with 0 as the sentinel for failures
    /// that never produced one.
    pub fn status_code(&self) -> u16 {
        match self {
            FetchFailure::Status(code) => *code,
            _ => 0,
        }
    }
}

/// A 2xx response with its body parsed as JSON.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Value,
}

/// Outbound HTTP client with a bounded per-call timeout and no retries.
pub struct FetchClient {
    http: reqwest::Client,
    request_timeout: Duration,
}

impl FetchClient {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.extra_headers {
            let name: HeaderName = name
                .parse()
                .with_context(|| format!("Invalid extra header name: {}", name))?;
            let value: HeaderValue = value
                .parse()
                .with_context(|| format!("Invalid extra header value for {}", name))?;
            headers.insert(name, value);
        }

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// GET a JSON document from a peer endpoint using the default timeout.
    pub async fn get_json(&self, url: &str) -> Result<FetchResponse, FetchFailure> {
        self.get_json_with_timeout(url, self.request_timeout).await
    }

    /// GET with an explicit per-call timeout. Used by the aggregation engine
    /// when a request-level override is supplied.
    pub async fn get_json_with_timeout(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<FetchResponse, FetchFailure> {
        let response = self
            .http
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| FetchFailure::MalformedBody(e.to_string()))?;

        Ok(FetchResponse {
            status: status.as_u16(),
            body,
        })
    }

    /// POST a JSON payload to a peer endpoint. Success is any 2xx status; the
    /// response body, if any, is not inspected.
    pub async fn post_json<T: Serialize>(
        &self,
        url: &str,
        payload: &T,
    ) -> Result<u16, FetchFailure> {
        let response = self
            .http
            .post(url)
            .json(payload)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| classify(e, self.request_timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Status(status.as_u16()));
        }

        Ok(status.as_u16())
    }
}

fn classify(error: reqwest::Error, timeout: Duration) -> FetchFailure {
    if error.is_timeout() {
        FetchFailure::Timeout(timeout)
    } else {
        FetchFailure::Network(error.to_string())
    }
}
