//! Type-specialized file processors: pull bytes through a bounded download,
//! sniff type, and return structured metadata with graceful partial failure.

mod csv;
mod image;
mod pdf;

pub use csv::CsvProcessor;
pub use image::ImageProcessor;
pub use pdf::PdfProcessor;

use async_trait::async_trait;

use crate::error::ProcessingError;
use crate::payload::{FileMeta, TypedResult};

/// Common shape every typed processor implements, so the orchestrator can
/// dispatch by MIME family without matching on concrete types.
#[async_trait]
pub trait TypedProcessor: Send + Sync {
    async fn process(&self, file_meta: &FileMeta, storage_ref: &str) -> Result<TypedResult, ProcessingError>;
}
