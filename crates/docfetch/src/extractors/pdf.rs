//! PDF text extraction

use crate::error::FetchError;
use crate::extractors::TextExtractor;
use crate::types::DocType;
use lopdf::Document;

/// Extracts text page by page, in page-number order
///
/// Each page contributes one newline-terminated segment; trailing
/// whitespace inside a page is dropped so that page boundaries are the
/// only line breaks added.
#[derive(Debug, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    /// Create a new PDF extractor
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PdfExtractor {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn doc_type(&self) -> DocType {
        DocType::Pdf
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, FetchError> {
        let label = DocType::Pdf.label();
        let doc = Document::load_mem(bytes).map_err(|e| FetchError::parse(label, e))?;

        let mut text = String::new();
        // get_pages is keyed by page number, so iteration is in document order
        for page_number in doc.get_pages().keys() {
            let page_text = doc
                .extract_text(&[*page_number])
                .map_err(|e| FetchError::parse(label, format!("page {}: {}", page_number, e)))?;
            text.push_str(page_text.trim_end());
            text.push('\n');
        }

        Ok(text.trim_end().to_string())
    }
}
