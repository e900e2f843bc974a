//! Core types for DocFetch

use crate::error::FetchError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Request to fetch a URL and return its text
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FetchRequest {
    /// The URL to fetch (required, must be http:// or https://)
    pub url: String,

    /// User-Agent for both the robots check and the fetch (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// Return HTML verbatim instead of simplified markdown
    pub force_raw: bool,

    /// Skip the robots.txt check entirely
    pub ignore_robots: bool,
}

impl FetchRequest {
    /// Create a new request with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the User-Agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Return raw HTML instead of markdown
    pub fn force_raw(mut self) -> Self {
        self.force_raw = true;
        self
    }

    /// Do not consult robots.txt
    pub fn ignore_robots(mut self) -> Self {
        self.ignore_robots = true;
        self
    }
}

/// How the text of a [`FetchResult`] was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    /// HTML simplified to markdown
    Markdown,
    /// Body returned verbatim
    Raw,
}

/// Outcome of a successful fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FetchResult {
    /// Content-Type header value (empty when the server sent none)
    pub content_type: String,
    /// Raw body or simplified markdown
    pub text: String,
    /// Upstream HTTP status code
    pub status_code: u16,
    /// Whether `text` is markdown or the raw body
    pub format: ContentFormat,
}

/// Supported document formats for text extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    /// Portable Document Format
    Pdf,
    /// Office Open XML word processing document
    Docx,
}

impl DocType {
    /// Human-readable format name used in error messages
    pub fn label(self) -> &'static str {
        match self {
            DocType::Pdf => "PDF",
            DocType::Docx => "DOCX",
        }
    }
}

impl FromStr for DocType {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" => Err(FetchError::MissingDocType),
            "pdf" => Ok(DocType::Pdf),
            "docx" => Ok(DocType::Docx),
            other => Err(FetchError::UnsupportedType(other.to_string())),
        }
    }
}

impl std::fmt::Display for DocType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocType::Pdf => write!(f, "pdf"),
            DocType::Docx => write!(f, "docx"),
        }
    }
}

/// Request to download a document and extract its text
///
/// `doc_type` stays a string on the wire so that unknown values can be
/// rejected with a descriptive error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ExtractionRequest {
    /// The document URL (required, must be http:// or https://)
    pub url: String,

    /// Document type: "pdf" or "docx"
    #[serde(rename = "type")]
    pub doc_type: String,
}

impl ExtractionRequest {
    /// Create a new extraction request
    pub fn new(url: impl Into<String>, doc_type: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            doc_type: doc_type.into(),
        }
    }
}

/// Text extracted from a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedDocument {
    /// Page or paragraph text, newline-joined
    pub text: String,
}
