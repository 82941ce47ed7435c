//! Text extraction from uploaded documents.

use std::path::Path;

use lopdf::Document;
use tracing::{debug, instrument, warn};

use crate::error::ExtractionError;

/// Turns a document's bytes into plain text.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// PDF extractor backed by `lopdf`.
///
/// Pages are emitted in page order, each followed by a blank line.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        if bytes.is_empty() {
            return Err(ExtractionError::EmptyFile);
        }

        let doc = Document::load_mem(bytes).map_err(|e| {
            warn!(error = %e, "Error processing PDF");
            ExtractionError::Unreadable(e.to_string())
        })?;
        if doc.is_encrypted() {
            return Err(ExtractionError::Encrypted);
        }

        let pages = doc.get_pages();
        debug!(pages = pages.len(), "Extracting PDF text");

        let mut full_text = String::new();
        for page_number in pages.keys() {
            let page_text = doc.extract_text(&[*page_number]).map_err(|e| {
                warn!(page = page_number, error = %e, "Error extracting page text");
                ExtractionError::Unreadable(e.to_string())
            })?;
            full_text.push_str(page_text.trim_end());
            full_text.push_str("\n\n");
        }
        Ok(full_text)
    }
}

/// Read `path` and run it through `extractor`.
pub async fn extract_file<E: TextExtractor + ?Sized>(
    extractor: &E,
    path: &Path,
) -> Result<String, ExtractionError> {
    let bytes = tokio::fs::read(path).await?;
    extractor.extract(&bytes)
}
