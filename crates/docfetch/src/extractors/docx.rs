//! DOCX text extraction
//!
//! DOCX files are ZIP archives; the body lives in `word/document.xml`.
//! Paragraphs (`w:p`) are emitted in document order, one per line. Empty
//! paragraphs are kept as empty lines.

use crate::error::FetchError;
use crate::extractors::TextExtractor;
use crate::types::DocType;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

/// Extracts paragraph text from Word documents
#[derive(Debug, Default)]
pub struct DocxExtractor;

impl DocxExtractor {
    /// Create a new DOCX extractor
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for DocxExtractor {
    fn name(&self) -> &'static str {
        "docx"
    }

    fn doc_type(&self) -> DocType {
        DocType::Docx
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, FetchError> {
        let label = DocType::Docx.label();
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| FetchError::parse(label, format!("not a valid archive: {}", e)))?;

        let mut xml = String::new();
        {
            let mut part = archive
                .by_name(DOCUMENT_PART)
                .map_err(|e| FetchError::parse(label, format!("{}: {}", DOCUMENT_PART, e)))?;
            part.read_to_string(&mut xml)
                .map_err(|e| FetchError::parse(label, format!("{}: {}", DOCUMENT_PART, e)))?;
        }

        Ok(parse_paragraphs(&xml)?.join("\n"))
    }
}

/// Collect the text of every paragraph in `word/document.xml`
fn parse_paragraphs(xml: &str) -> Result<Vec<String>, FetchError> {
    let label = DocType::Docx.label();
    let mut reader = Reader::from_str(xml);
    // xml:space="preserve" runs rely on surrounding whitespace
    reader.trim_text(false);

    let mut paragraphs = Vec::new();
    let mut open: Vec<String> = Vec::new();
    let mut in_run = false;
    let mut in_text = false;

    loop {
        let event = reader.read_event().map_err(|e| {
            FetchError::parse(
                label,
                format!("malformed XML at byte {}: {}", reader.buffer_position(), e),
            )
        })?;

        match event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => open.push(String::new()),
                b"r" => in_run = true,
                b"t" if in_run => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"p" => paragraphs.push(String::new()),
                b"tab" if in_run => push_text(&mut open, "\t"),
                b"br" | b"cr" if in_run => push_text(&mut open, "\n"),
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"p" => {
                    if let Some(paragraph) = open.pop() {
                        paragraphs.push(paragraph);
                    }
                }
                b"r" => in_run = false,
                b"t" => in_text = false,
                _ => {}
            },
            Event::Text(t) if in_text => {
                let text = t.unescape().map_err(|e| FetchError::parse(label, e))?;
                push_text(&mut open, &text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

fn push_text(open: &mut [String], text: &str) {
    if let Some(paragraph) = open.last_mut() {
        paragraph.push_str(text);
    }
}
