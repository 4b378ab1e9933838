//! # HTTP Session
//!
//! Pooled transport shared by every call a client makes.
//!
//! - connect and read timeouts are applied independently
//! - `Content-Type: application/json` is sent on every request
//! - 500/502/503/504 are retried for `GET` only, with doubling backoff
//! - a 503 carrying `Retry-After` waits that long instead
//! - connection failures are retried for every method
//!
//! Retries are invisible to callers: a call that succeeds on its third
//! attempt looks exactly like one that succeeded on its first.

use crate::config::{RetryPolicy, TirikConfig};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tirik_core::{check_envelope, Envelope, PaymentError, PaymentResult};
use tracing::{debug, error, instrument, warn};

/// Methods the upstream API is called with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    /// Whether a retryable status may replay this request
    pub fn is_idempotent(self) -> bool {
        matches!(self, HttpMethod::Get)
    }

    fn as_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

impl FromStr for HttpMethod {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(HttpMethod::Get),
            "post" => Ok(HttpMethod::Post),
            _ => Err(PaymentError::failed(format!("Unsupported HTTP method: {}", s))),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
        }
    }
}

/// Pooled HTTP transport with the client's retry policy
#[derive(Debug, Clone)]
pub struct Session {
    client: Client,
    retry: RetryPolicy,
}

impl Session {
    /// Build the transport. Failures here are configuration errors.
    pub fn new(config: &TirikConfig) -> PaymentResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .pool_max_idle_per_host(config.pool_size)
            .default_headers(headers)
            .build()
            .map_err(|e| {
                PaymentError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            retry: config.retry.clone(),
        })
    }

    /// Request by method name.
    ///
    /// Anything other than `get`/`post` (case-insensitive) fails before
    /// any I/O.
    pub async fn request(
        &self,
        method: &str,
        url: &str,
        payload: Option<&Value>,
    ) -> PaymentResult<Envelope> {
        let method: HttpMethod = method.parse()?;
        let url = parse_url(url, &[])?;
        self.execute(method, url, payload).await
    }

    /// GET `url` with the given query parameters
    pub async fn get(&self, url: &str, query: &[(&str, &str)]) -> PaymentResult<Envelope> {
        let url = parse_url(url, query)?;
        self.execute::<Value>(HttpMethod::Get, url, None).await
    }

    /// POST `body` as JSON to `url`
    pub async fn post<T>(&self, url: &str, body: &T) -> PaymentResult<Envelope>
    where
        T: Serialize + ?Sized,
    {
        let url = parse_url(url, &[])?;
        self.execute(HttpMethod::Post, url, Some(body)).await
    }

    /// One logical request: send (with retries), decode, check the envelope.
    #[instrument(skip_all, fields(method = %method, url = %url))]
    pub async fn execute<T>(
        &self,
        method: HttpMethod,
        url: Url,
        payload: Option<&T>,
    ) -> PaymentResult<Envelope>
    where
        T: Serialize + ?Sized,
    {
        let response = self.send_with_retry(method, &url, payload).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PaymentError::failed(format!("Request failed: {}", e)))?;

        let body: Value = serde_json::from_slice(&bytes).map_err(|e| {
            PaymentError::MalformedResponse(format!("Response body is not JSON: {}", e))
        })?;

        let result = check_envelope(body);
        if let Err(ref e) = result {
            debug!(code = ?e.code(), "Upstream reported failure");
        }
        result
    }

    async fn send_with_retry<T>(
        &self,
        method: HttpMethod,
        url: &Url,
        payload: Option<&T>,
    ) -> PaymentResult<Response>
    where
        T: Serialize + ?Sized,
    {
        let mut retries = 0u32;

        loop {
            let mut builder = self.client.request(method.as_reqwest(), url.clone());
            if let (HttpMethod::Post, Some(body)) = (method, payload) {
                builder = builder.json(body);
            }

            debug!(attempt = retries + 1, "Sending request");

            match builder.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    let retryable =
                        method.is_idempotent() && self.retry.is_retryable_status(status.as_u16());

                    if retryable && retries < self.retry.max_retries {
                        retries += 1;
                        let delay = self
                            .retry
                            .delay_for_status(status.as_u16(), retry_after(&response), retries);
                        warn!(
                            status = status.as_u16(),
                            retry = retries,
                            delay_ms = delay.as_millis() as u64,
                            "Retrying after server error"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    let body = response.text().await.unwrap_or_default();
                    error!("Tirikchilik API error: status={}, body={}", status, body);
                    return Err(status_failure(status, retryable, url));
                }
                Err(e) => {
                    let retryable =
                        e.is_connect() || (e.is_timeout() && method.is_idempotent());

                    if retryable && retries < self.retry.max_retries {
                        retries += 1;
                        let delay = self.retry.delay_for(retries);
                        warn!(
                            error = %e,
                            retry = retries,
                            delay_ms = delay.as_millis() as u64,
                            "Retrying after transport error"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    error!("Request to {} failed: {}", url, e);
                    return Err(PaymentError::failed(format!("Request failed: {}", e)));
                }
            }
        }
    }
}

fn parse_url(url: &str, query: &[(&str, &str)]) -> PaymentResult<Url> {
    let parsed = if query.is_empty() {
        Url::parse(url)
    } else {
        Url::parse_with_params(url, query)
    };
    parsed.map_err(|e| {
        PaymentError::failed(format!("Request failed: invalid URL {}: {}", url, e))
    })
}

/// `Retry-After` in whole seconds
fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn status_failure(status: StatusCode, exhausted: bool, url: &Url) -> PaymentError {
    let message = if exhausted {
        format!(
            "Request failed: max retries exceeded with url {} (too many {} error responses)",
            url,
            status.as_u16()
        )
    } else {
        format!("Request failed: {} for url {}", status, url)
    };
    PaymentError::failed(message)
}
