//! DocFetch - robots-aware web content and document text retrieval
//!
//! This crate fetches remote content on behalf of a caller and returns
//! normalized text:
//!
//! - HTML pages are reduced to their main content and rendered as markdown
//! - PDF and DOCX documents are downloaded and their text extracted
//! - the target site's robots.txt is honoured unless the caller opts out
//!
//! ## Pipeline
//!
//! [`Pipeline`] composes the pieces. It owns an `Arc` of the process-wide
//! [`HttpClient`], which should be created once at startup and shared by
//! everything that talks to the network (see [`PipelineBuilder::client`]).
//!
//! Document extractors are pluggable through the [`TextExtractor`] trait;
//! [`ExtractorRegistry`] dispatches on [`DocType`].
//!
//! ## HTTP API
//!
//! [`server::router`] exposes the pipeline as JSON endpoints, together with
//! a transcript endpoint backed by a [`TranscriptProvider`].

pub mod client;
mod convert;
mod error;
pub mod extractors;
mod pipeline;
pub mod robots;
pub mod server;
pub mod transcript;
mod types;

pub use client::{FetchOptions, HttpClient, RawResponse};
pub use convert::{html_to_markdown, is_html, simplify_html, SIMPLIFY_FAILED_MARKER};
pub use error::{ErrorKind, FetchError};
pub use extractors::{DocxExtractor, ExtractorRegistry, PdfExtractor, TextExtractor};
pub use pipeline::{parse_url, Pipeline, PipelineBuilder};
pub use robots::{RobotsChecker, RobotsDecision, RobotsPolicy};
pub use transcript::{
    extract_video_id, SearchApiTranscripts, TranscriptError, TranscriptProvider,
    TranscriptSegment,
};
pub use types::{
    ContentFormat, DocType, ExtractedDocument, ExtractionRequest, FetchRequest, FetchResult,
};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str =
    "DocFetch/1.0 (Autonomous; +https://github.com/everruns/docfetch)";

/// Extended API documentation for LLM consumption (llmtxt)
pub const API_LLMTXT: &str = r#"# DocFetch API

Fetches remote content and returns normalized text.

## Endpoints

### POST /fetch_url/
Fetch a URL. HTML is simplified to markdown; other content is returned raw.

Input:
- `url` (required): http:// or https:// URL
- `user_agent` (optional): User-Agent for robots.txt and the fetch
- `force_raw` (optional, default false): return HTML verbatim
- `ignore_robots` (optional, default false): skip the robots.txt check

Output: `{"success": true, "data": {"text": "...", "content_type": "..."}}`
(`content_type` is present when the text is the raw body)

### POST /extract_file_text/
Download a document and extract its text.

Input:
- `url` (required)
- `type` (required): "pdf" or "docx"

Output: `{"success": true, "data": {"text": "..."}}`

### POST /extract_pdf_text/
Legacy PDF-only form of /extract_file_text/. Input: `url`.

### POST /transcript
Input: `url` (YouTube watch or youtu.be URL).
Output: `{"transcript": [{"text": "...", "start": 0.0, "duration": 1.5}]}`

## Error Handling
- Pipeline endpoints answer `{"success": false, "error": "..."}`
- 400: missing or invalid input, unsupported document type
- 403: blocked by robots.txt
- Upstream error statuses are passed through by /fetch_url/
- 500: fetch, parse or unexpected failures
- /transcript answers `{"error": "..."}` with 400, 403 (disabled),
  404 (unavailable), 429 (rate limited) or 500
"#;
