//! PDF metadata extraction

use std::path::Path;

use lopdf::Document;

use crate::error::{Error, Result};
use crate::pdf::page::resolve;

/// PDF metadata
#[derive(Debug, Clone)]
pub struct PdfMetadata {
    /// Number of pages in the PDF
    pub page_count: usize,
    /// Document title (if present)
    pub title: Option<String>,
    /// Document author (if present)
    pub author: Option<String>,
}

/// Extract metadata from a PDF file
pub fn extract_metadata(path: &Path) -> Result<PdfMetadata> {
    let doc = load_non_empty(path)?;

    let info = doc
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|info| resolve(&doc, info).ok())
        .and_then(|info| info.as_dict().ok());

    let text_field = |key: &[u8]| {
        info.and_then(|dict| dict.get(key).ok())
            .and_then(|value| resolve(&doc, value).ok())
            .and_then(|value| value.as_str().ok())
            .map(decode_text_string)
            .filter(|s| !s.is_empty())
    };

    Ok(PdfMetadata {
        page_count: doc.get_pages().len(),
        title: text_field(b"Title"),
        author: text_field(b"Author"),
    })
}

/// Count the number of pages in a PDF file
pub fn count_pages(path: &Path) -> Result<usize> {
    Ok(load_non_empty(path)?.get_pages().len())
}

fn load_non_empty(path: &Path) -> Result<Document> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;
    if doc.get_pages().is_empty() {
        return Err(Error::EmptyPdf(path.to_path_buf()));
    }
    Ok(doc)
}

/// Decode a PDF text string: UTF-16BE with a byte-order mark, or single-byte text
fn decode_text_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}
