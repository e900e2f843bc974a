//! Error types for DocFetch

use thiserror::Error;

/// Broad classification of a [`FetchError`], used to pick response statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing request fields
    InvalidInput,
    /// The site's robots policy forbids the fetch
    RobotsDenied,
    /// Network failure, timeout or an upstream error status
    UpstreamFetch,
    /// Document type outside the recognized set
    UnsupportedType,
    /// The payload could not be decoded
    Parse,
    /// Anything unclassified
    Internal,
}

/// Errors that can occur during fetch and extraction operations
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL is missing
    #[error("Missing required parameter: url")]
    MissingUrl,

    /// URL could not be parsed or lacks a host
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// URL has invalid scheme
    #[error("Invalid URL: must start with http:// or https://")]
    InvalidUrlScheme,

    /// User-Agent cannot be sent as a header value
    #[error("Invalid user_agent: {0:?} is not a valid header value")]
    InvalidUserAgent(String),

    /// Request body was not valid JSON for the endpoint
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Document type is missing
    #[error("Missing required parameter: type")]
    MissingDocType,

    /// Document type is not one of the recognized values
    #[error("Unsupported document type: {0} (expected \"pdf\" or \"docx\")")]
    UnsupportedType(String),

    /// robots.txt forbids fetching the URL
    #[error("Blocked by robots.txt: {0}")]
    RobotsDenied(String),

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// Request exceeded the per-call time budget
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// Failed to connect to server
    #[error("Failed to connect to {url}")]
    ConnectError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Upstream answered with an error status
    #[error("Failed to fetch {url} - status code {status}")]
    UpstreamStatus { url: String, status: u16 },

    /// Response body exceeded the configured size limit
    #[error("Response body from {url} exceeds {limit} bytes")]
    BodyTooLarge { url: String, limit: usize },

    /// Other request error
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Document could not be parsed
    #[error("Failed to parse {format} document: {message}")]
    ParseError {
        format: &'static str,
        message: String,
    },

    /// Unclassified failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FetchError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error, url: &str) -> Self {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if err.is_connect() {
            FetchError::ConnectError {
                url: url.to_string(),
                source: err,
            }
        } else {
            FetchError::RequestError(err.to_string())
        }
    }

    /// Wrap a decoder failure with the name of the failing format
    pub fn parse(format: &'static str, err: impl std::fmt::Display) -> Self {
        FetchError::ParseError {
            format,
            message: err.to_string(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::MissingUrl
            | FetchError::InvalidUrl(_)
            | FetchError::InvalidUrlScheme
            | FetchError::InvalidUserAgent(_)
            | FetchError::InvalidBody(_)
            | FetchError::MissingDocType => ErrorKind::InvalidInput,
            FetchError::UnsupportedType(_) => ErrorKind::UnsupportedType,
            FetchError::RobotsDenied(_) => ErrorKind::RobotsDenied,
            FetchError::Timeout { .. }
            | FetchError::ConnectError { .. }
            | FetchError::UpstreamStatus { .. }
            | FetchError::BodyTooLarge { .. }
            | FetchError::RequestError(_) => ErrorKind::UpstreamFetch,
            FetchError::ParseError { .. } => ErrorKind::Parse,
            FetchError::ClientBuildError(_) | FetchError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Upstream HTTP status carried by this error, if any
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            FetchError::UpstreamStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
