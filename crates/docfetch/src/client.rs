//! Shared HTTP client for DocFetch
//!
//! One [`HttpClient`] is built at process start and shared (via `Arc`) by
//! every component that talks to the network. It owns the connection pool,
//! follows redirects and enforces a fixed per-call timeout. Dropping the
//! last handle closes the pool.

use crate::error::FetchError;
use crate::DEFAULT_USER_AGENT;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Per-call timeout (connect + full body)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Largest body buffered for a single response
pub const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Maximum number of redirects followed per call
const MAX_REDIRECTS: usize = 10;

/// Options shared by the client and the pipeline
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// User-Agent used when the request does not carry one
    pub user_agent: String,
    /// Per-call timeout
    pub timeout: Duration,
    /// Body size limit in bytes
    pub max_body_bytes: usize,
    /// Treat robots.txt transport failures as "no policy"
    pub robots_fail_open: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            robots_fail_open: true,
        }
    }
}

/// A fully buffered upstream response
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Bytes,
    /// URL after redirects
    pub final_url: Url,
}

impl RawResponse {
    /// Content-Type header value, if present and valid
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.trim().is_empty())
    }

    /// Body decoded as UTF-8 (lossy)
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// True for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Connection-pooling HTTP client, safe to share across tasks
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    max_body_bytes: usize,
}

impl HttpClient {
    /// Build the client
    pub fn new(options: &FetchOptions) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));

        let inner = reqwest::Client::builder()
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(options.timeout)
            .build()
            .map_err(FetchError::ClientBuildError)?;

        Ok(Self {
            inner,
            max_body_bytes: options.max_body_bytes,
        })
    }

    /// GET a URL and buffer the response
    ///
    /// Non-2xx statuses are returned as responses, not errors; callers
    /// decide what an error status means. Transport failures and timeouts
    /// become [`FetchError`]s.
    pub async fn get(&self, url: &Url, user_agent: &str) -> Result<RawResponse, FetchError> {
        let ua = user_agent_header(user_agent)?;

        // Query strings may carry credentials; keep them out of logs
        debug!(host = url.host_str().unwrap_or_default(), path = url.path(), "GET");

        let response = self
            .inner
            .get(url.clone())
            .header(USER_AGENT, ua)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(e, url.as_str()))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let final_url = response.url().clone();

        if let Some(len) = response.content_length() {
            if len > self.max_body_bytes as u64 {
                return Err(FetchError::BodyTooLarge {
                    url: url.to_string(),
                    limit: self.max_body_bytes,
                });
            }
        }

        let body = read_body_limited(response, url, self.max_body_bytes).await?;

        debug!(path = url.path(), status, size = body.len(), "Response received");

        Ok(RawResponse {
            status,
            headers,
            body,
            final_url,
        })
    }
}

/// Validate a User-Agent string as a header value
pub fn user_agent_header(user_agent: &str) -> Result<HeaderValue, FetchError> {
    HeaderValue::from_str(user_agent)
        .map_err(|_| FetchError::InvalidUserAgent(user_agent.to_string()))
}

/// Read the response body, failing once it grows past `limit` bytes
async fn read_body_limited(
    response: reqwest::Response,
    url: &Url,
    limit: usize,
) -> Result<Bytes, FetchError> {
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| FetchError::from_reqwest(e, url.as_str()))?;
        if body.len() + chunk.len() > limit {
            return Err(FetchError::BodyTooLarge {
                url: url.to_string(),
                limit,
            });
        }
        body.extend_from_slice(&chunk);
    }

    Ok(Bytes::from(body))
}
