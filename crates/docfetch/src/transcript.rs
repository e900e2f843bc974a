//! Video transcript collaborator
//!
//! Transcripts are not fetched by the pipeline itself: a
//! [`TranscriptProvider`] turns a video ID into timed text segments or a
//! typed failure. [`SearchApiTranscripts`] is the provider backed by the
//! SearchAPI `youtube_transcripts` engine.

use crate::client::HttpClient;
use crate::error::FetchError;
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Default SearchAPI endpoint base
pub const SEARCHAPI_BASE_URL: &str = "https://www.searchapi.io";

static VIDEO_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:v=|youtu\.be/)([A-Za-z0-9_-]{11})").expect("video id pattern is valid")
});

/// Extract the 11-character video ID from a YouTube URL
pub fn extract_video_id(url: &str) -> Option<&str> {
    VIDEO_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// One timed piece of a transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Spoken text
    pub text: String,
    /// Offset from the start of the video, in seconds
    #[serde(default)]
    pub start: f64,
    /// Segment length, in seconds
    #[serde(default)]
    pub duration: f64,
}

/// Ways a transcript lookup can fail
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscriptError {
    /// The owner turned transcripts off
    #[error("Transcripts are disabled for this video")]
    Disabled,
    /// The video does not exist or has no transcript
    #[error("Video unavailable")]
    Unavailable,
    /// The provider is throttling us
    #[error("Transcript provider rate limit exceeded, retry later")]
    RateLimited,
    /// Anything else
    #[error("{0}")]
    Other(String),
}

/// Source of video transcripts
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// Provider name (for logging/debugging)
    fn name(&self) -> &'static str;

    /// Fetch the transcript for a video ID
    async fn transcript(&self, video_id: &str) -> Result<Vec<TranscriptSegment>, TranscriptError>;
}

#[derive(Debug, Deserialize)]
struct SearchApiResponse {
    #[serde(default)]
    transcripts: Option<Vec<TranscriptSegment>>,
    #[serde(default)]
    error: Option<String>,
}

/// Transcript provider backed by SearchAPI
#[derive(Debug, Clone)]
pub struct SearchApiTranscripts {
    client: Arc<HttpClient>,
    api_key: String,
    base_url: Url,
}

impl SearchApiTranscripts {
    /// Create a provider against the public SearchAPI endpoint
    pub fn new(client: Arc<HttpClient>, api_key: impl Into<String>) -> Self {
        let base_url = Url::parse(SEARCHAPI_BASE_URL).expect("SearchAPI base URL is valid");
        Self {
            client,
            api_key: api_key.into(),
            base_url,
        }
    }

    /// Point the provider at a different endpoint base
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    fn search_url(&self, video_id: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path("/api/v1/search");
        url.query_pairs_mut()
            .clear()
            .append_pair("engine", "youtube_transcripts")
            .append_pair("video_id", video_id)
            .append_pair("api_key", &self.api_key);
        url
    }
}

#[async_trait]
impl TranscriptProvider for SearchApiTranscripts {
    fn name(&self) -> &'static str {
        "searchapi"
    }

    async fn transcript(&self, video_id: &str) -> Result<Vec<TranscriptSegment>, TranscriptError> {
        let url = self.search_url(video_id);
        let response = self
            .client
            .get(&url, DEFAULT_USER_AGENT)
            .await
            .map_err(|e| TranscriptError::Other(format!("API request failed: {}", describe(&e))))?;

        debug!(video_id, status = response.status, "Transcript API response");

        match response.status {
            404 => return Err(TranscriptError::Unavailable),
            429 => return Err(TranscriptError::RateLimited),
            200..=299 => {}
            status => {
                return Err(TranscriptError::Other(format!(
                    "API request failed with status {}: {}",
                    status,
                    response.text()
                )))
            }
        }

        let parsed: SearchApiResponse = serde_json::from_slice(&response.body)
            .map_err(|e| TranscriptError::Other(format!("Invalid API response: {}", e)))?;

        if let Some(message) = parsed.error {
            return Err(classify_error_message(&message));
        }

        parsed.transcripts.ok_or(TranscriptError::Unavailable)
    }
}

/// Describe a transport failure without echoing the request URL
///
/// The URL carries the API key as a query parameter.
fn describe(err: &FetchError) -> &'static str {
    match err {
        FetchError::Timeout { .. } => "request timed out",
        FetchError::ConnectError { .. } => "could not connect",
        FetchError::BodyTooLarge { .. } => "response too large",
        _ => "request error",
    }
}

/// Map a provider error message onto the failure taxonomy
fn classify_error_message(message: &str) -> TranscriptError {
    let lower = message.to_lowercase();
    if lower.contains("disabled") {
        TranscriptError::Disabled
    } else if lower.contains("no transcript")
        || lower.contains("not available")
        || lower.contains("unavailable")
    {
        TranscriptError::Unavailable
    } else if lower.contains("rate limit") || lower.contains("too many requests") {
        TranscriptError::RateLimited
    } else {
        TranscriptError::Other(message.to_string())
    }
}
