//! Fetch-and-extract pipeline
//!
//! "fetch URL": validate -> robots check -> fetch -> classify ->
//! simplify or pass through.
//!
//! "extract file text": validate type -> fetch bytes -> extract.
//!
//! Every step is sequential; the only shared state is the [`HttpClient`].

use crate::client::{user_agent_header, FetchOptions, HttpClient};
use crate::convert::{is_html, simplify_html};
use crate::error::FetchError;
use crate::extractors::ExtractorRegistry;
use crate::robots::{RobotsChecker, RobotsDecision};
use crate::types::{
    ContentFormat, DocType, ExtractedDocument, ExtractionRequest, FetchRequest, FetchResult,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Builder for configuring a [`Pipeline`]
#[derive(Debug, Clone, Default)]
pub struct PipelineBuilder {
    options: FetchOptions,
    client: Option<Arc<HttpClient>>,
    extractors: Option<ExtractorRegistry>,
}

impl PipelineBuilder {
    /// Create a new builder with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default User-Agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.options.user_agent = ua.into();
        self
    }

    /// Set the per-call timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Set the response body size limit
    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.options.max_body_bytes = limit;
        self
    }

    /// Choose whether robots.txt transport failures allow the fetch
    pub fn robots_fail_open(mut self, fail_open: bool) -> Self {
        self.options.robots_fail_open = fail_open;
        self
    }

    /// Replace all options at once
    pub fn options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    /// Use an already constructed shared client
    ///
    /// Timeout and body limit options then come from that client.
    pub fn client(mut self, client: Arc<HttpClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Use a custom extractor registry
    pub fn extractors(mut self, extractors: ExtractorRegistry) -> Self {
        self.extractors = Some(extractors);
        self
    }

    /// Build the pipeline, creating a client if none was supplied
    pub fn build(self) -> Result<Pipeline, FetchError> {
        let client = match self.client {
            Some(client) => client,
            None => Arc::new(HttpClient::new(&self.options)?),
        };

        Ok(Pipeline {
            robots: RobotsChecker::new(client.clone(), self.options.robots_fail_open),
            client,
            extractors: self.extractors.unwrap_or_default(),
            options: self.options,
        })
    }
}

/// Orchestrates robots checking, fetching, classification and extraction
#[derive(Debug, Clone)]
pub struct Pipeline {
    client: Arc<HttpClient>,
    robots: RobotsChecker,
    extractors: ExtractorRegistry,
    options: FetchOptions,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// The shared HTTP client
    pub fn client(&self) -> &Arc<HttpClient> {
        &self.client
    }

    /// The options this pipeline was built with
    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Fetch a URL and return its text
    ///
    /// HTML is simplified to markdown unless `force_raw` is set; anything
    /// else is returned verbatim with its content type.
    pub async fn fetch_url(&self, req: &FetchRequest) -> Result<FetchResult, FetchError> {
        let url = parse_url(&req.url)?;
        let user_agent = req
            .user_agent
            .as_deref()
            .filter(|ua| !ua.trim().is_empty())
            .unwrap_or(&self.options.user_agent);
        // The agent checked against robots.txt must be the one that fetches
        user_agent_header(user_agent)?;

        if req.ignore_robots {
            debug!(url = %url, "Skipping robots.txt check");
        } else {
            match self.robots.check(&url, user_agent).await {
                RobotsDecision::Denied(reason) => {
                    debug!(url = %url, %reason, "Denied by robots.txt");
                    return Err(FetchError::RobotsDenied(reason));
                }
                decision => debug!(url = %url, ?decision, "robots.txt check passed"),
            }
        }

        let response = self.client.get(&url, user_agent).await?;
        if response.status >= 400 {
            return Err(FetchError::UpstreamStatus {
                url: url.to_string(),
                status: response.status,
            });
        }

        let content_type = response.content_type().map(str::to_string);
        let body = response.text();
        let html = is_html(content_type.as_deref(), &body);
        debug!(url = %url, html, force_raw = req.force_raw, "Classified response");

        let (format, text) = if html && !req.force_raw {
            (ContentFormat::Markdown, simplify_html(&body, &response.final_url))
        } else {
            (ContentFormat::Raw, body)
        };

        Ok(FetchResult {
            content_type: content_type.unwrap_or_default(),
            text,
            status_code: response.status,
            format,
        })
    }

    /// Download a PDF or DOCX document and extract its text
    pub async fn extract_file_text(
        &self,
        req: &ExtractionRequest,
    ) -> Result<ExtractedDocument, FetchError> {
        // Both fields are validated before any network traffic
        let url = parse_url(&req.url)?;
        let doc_type: DocType = req.doc_type.parse()?;
        self.extract_document(&url, doc_type).await
    }

    /// Download and extract a document of a known type
    pub async fn extract_document(
        &self,
        url: &Url,
        doc_type: DocType,
    ) -> Result<ExtractedDocument, FetchError> {
        let extractor = self
            .extractors
            .get(doc_type)
            .ok_or_else(|| FetchError::UnsupportedType(doc_type.to_string()))?;

        let response = self.client.get(url, &self.options.user_agent).await?;
        if !response.is_success() {
            return Err(FetchError::UpstreamStatus {
                url: url.to_string(),
                status: response.status,
            });
        }

        debug!(url = %url, extractor = extractor.name(), size = response.body.len(), "Extracting document");

        let body = response.body;
        let text = tokio::task::spawn_blocking(move || extractor.extract(&body))
            .await
            .map_err(|e| FetchError::Internal(format!("extraction task failed: {}", e)))??;

        Ok(ExtractedDocument {
            text: text.trim().to_string(),
        })
    }
}

/// Validate a request URL: present, parseable, http(s), with a host
pub fn parse_url(raw: &str) -> Result<Url, FetchError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(FetchError::MissingUrl);
    }

    let url = Url::parse(raw).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", raw, e)))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(FetchError::InvalidUrlScheme);
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(FetchError::InvalidUrl(format!("{}: missing host", raw)));
    }

    Ok(url)
}
