//! Extractor system for document text extraction
//!
//! Design: Each extractor handles one document format. ExtractorRegistry
//! dispatches to the extractor registered for the requested [`DocType`].

mod docx;
mod pdf;

pub use docx::DocxExtractor;
pub use pdf::PdfExtractor;

use crate::error::FetchError;
use crate::types::DocType;
use std::sync::Arc;

/// Trait for format-specific text extractors
///
/// Extraction is synchronous and CPU-bound; callers on an async runtime
/// should run it on the blocking pool.
pub trait TextExtractor: Send + Sync {
    /// Unique identifier for this extractor (for logging/debugging)
    fn name(&self) -> &'static str;

    /// The document format this extractor understands
    fn doc_type(&self) -> DocType;

    /// Extract plain text from the raw document bytes
    ///
    /// Malformed input fails with [`FetchError::ParseError`]; partial text
    /// is never returned.
    fn extract(&self, bytes: &[u8]) -> Result<String, FetchError>;
}

/// Registry of extractors keyed by document type
#[derive(Clone)]
pub struct ExtractorRegistry {
    extractors: Vec<Arc<dyn TextExtractor>>,
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ExtractorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    /// Create a registry with the PDF and DOCX extractors registered
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PdfExtractor::new()));
        registry.register(Arc::new(DocxExtractor::new()));
        registry
    }

    /// Register an extractor
    ///
    /// A later registration for the same type replaces the earlier one.
    pub fn register(&mut self, extractor: Arc<dyn TextExtractor>) {
        let doc_type = extractor.doc_type();
        self.extractors.retain(|e| e.doc_type() != doc_type);
        self.extractors.push(extractor);
    }

    /// Look up the extractor for a document type
    pub fn get(&self, doc_type: DocType) -> Option<Arc<dyn TextExtractor>> {
        self.extractors
            .iter()
            .find(|e| e.doc_type() == doc_type)
            .cloned()
    }
}

impl std::fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.extractors.iter().map(|e| e.name()))
            .finish()
    }
}
