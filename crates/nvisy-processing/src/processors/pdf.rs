//! PDF page count, text extraction, and word-count estimation.

use std::sync::Arc;

use async_trait::async_trait;
use nvisy_data::ObjectStorage;

use super::TypedProcessor;
use crate::error::ProcessingError;
use crate::fetch::{fetch_buffer, validate_buffer_type, MimeFamily};
use crate::payload::{FileMeta, TypedResult};

/// Declared or downloaded PDFs larger than this are rejected outright.
pub const PDF_MAX_BYTES: u64 = 40 * 1024 * 1024;

pub struct PdfProcessor {
    storage: Arc<dyn ObjectStorage>,
}

impl PdfProcessor {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl TypedProcessor for PdfProcessor {
    async fn process(&self, file_meta: &FileMeta, storage_ref: &str) -> Result<TypedResult, ProcessingError> {
        if file_meta.size > PDF_MAX_BYTES {
            return Err(ProcessingError::permanent("PDF exceeds maximum allowed size"));
        }

        let url = self
            .storage
            .download_url(storage_ref, "raw", Some(&file_meta.original_name))
            .await
            .map_err(ProcessingError::from)?;
        let buffer = fetch_buffer(&url, PDF_MAX_BYTES).await?;

        if !validate_buffer_type(&buffer, MimeFamily::Pdf) {
            return Err(ProcessingError::permanent("File does not have a valid PDF header"));
        }

        let document = lopdf::Document::load_mem(&buffer)
            .map_err(|err| ProcessingError::permanent(format!("invalid or corrupt PDF: {err}")))?;

        let pages = document.get_pages();
        let page_numbers: Vec<u32> = pages.keys().copied().collect();
        let page_count = page_numbers.len() as u32;

        let text = document.extract_text(&page_numbers).unwrap_or_default();
        let (has_text, word_count) = summarize_text(&text);

        Ok(TypedResult::Pdf {
            pages: page_count,
            word_count,
            text_extracted: has_text,
            has_text,
        })
    }
}

/// Whitespace-split word estimate after trimming, matching the spec's
/// `hasText`/`wordCount` derivation.
fn summarize_text(text: &str) -> (bool, u64) {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        (false, 0)
    } else {
        (true, trimmed.split_whitespace().count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_extracted_text_reports_no_text() {
        assert_eq!(summarize_text("   \n\t  "), (false, 0));
    }

    #[test]
    fn word_count_splits_on_whitespace_after_trim() {
        assert_eq!(summarize_text("  hello   world\nfoo "), (true, 3));
    }
}
