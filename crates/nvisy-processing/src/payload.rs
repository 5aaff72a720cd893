//! Payload and result types for jobs run on the "processing" queue.
//!
//! These are the concrete `P`/`R` this crate instantiates
//! [`nvisy_queue::JobQueue`] with; the queue itself never inspects them.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::fetch::MimeFamily;

/// Metadata about a file as the caller described it at upload time. This is
/// exactly what was known before the file was downloaded and inspected —
/// typed processors may discover it was wrong (declared size vs. actual
/// bytes, sniffed type vs. declared mimetype).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMeta {
    pub original_name: String,
    pub mimetype: String,
    pub size: u64,
    /// Dimensions/format the upload step already determined, when the
    /// storage backend reported them at upload time. The image processor
    /// skips its own download when these are already known.
    pub known_width: Option<u32>,
    pub known_height: Option<u32>,
    pub known_format: Option<String>,
}

impl FileMeta {
    pub fn family(&self) -> MimeFamily {
        MimeFamily::from_mimetype(&self.mimetype)
    }
}

/// Payload for jobs registered on the "processing" queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProcessingPayload {
    FileProcessing {
        file_meta: FileMeta,
        storage_ref: String,
        compression_enabled: bool,
    },
    FileCompression {
        file_meta: FileMeta,
        storage_ref: String,
    },
    ThumbnailGeneration {
        file_meta: FileMeta,
        storage_ref: String,
    },
}

impl ProcessingPayload {
    pub fn file_meta(&self) -> &FileMeta {
        match self {
            Self::FileProcessing { file_meta, .. }
            | Self::FileCompression { file_meta, .. }
            | Self::ThumbnailGeneration { file_meta, .. } => file_meta,
        }
    }

    pub fn storage_ref(&self) -> &str {
        match self {
            Self::FileProcessing { storage_ref, .. }
            | Self::FileCompression { storage_ref, .. }
            | Self::ThumbnailGeneration { storage_ref, .. } => storage_ref,
        }
    }
}

/// Whether a processing attempt fully succeeded, or was swallowed into a
/// best-effort `failed` result rather than propagated to the queue as an
/// error (see [`crate::orchestrator`] for which failures take which path).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingStatus {
    Success,
    Failed,
}

/// Outcome of compressing a file's stored bytes, attached to a
/// [`ProcessingResult`] when compression ran (successfully or not).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionResult {
    pub original_size: u64,
    pub compressed_size: u64,
    pub public_id: String,
    pub secure_url: String,
}

/// The type-specific half of a [`ProcessingResult`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TypedResult {
    Image {
        width: Option<u32>,
        height: Option<u32>,
        format: Option<String>,
        thumbnail_url: Option<String>,
        thumbnail_generated: bool,
    },
    Pdf {
        pages: u32,
        word_count: u64,
        text_extracted: bool,
        has_text: bool,
    },
    Csv {
        row_count: u64,
        column_count: usize,
        columns: Vec<String>,
        has_sensitive_data: bool,
        sample_row_count: usize,
    },
}

impl TypedResult {
    pub fn resource_type(&self) -> &'static str {
        match self {
            Self::Image { .. } => "image",
            Self::Pdf { .. } => "document",
            Self::Csv { .. } => "raw",
        }
    }
}

/// Result of one `file_processing` (or standalone `file_compression` /
/// `thumbnail_generation`) job, returned to the queue as `R`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub processed_at: Timestamp,
    pub original_name: String,
    pub mimetype: String,
    pub public_id: String,
    pub secure_url: String,
    pub size: u64,
    pub format: Option<String>,
    pub status: ProcessingStatus,
    /// Set when `status == Failed`: the typed processor failed in a way the
    /// orchestrator chose to swallow rather than propagate to the queue.
    pub processing_error: Option<String>,
    pub typed: Option<TypedResult>,
    /// Present when compression ran inline and succeeded; compression
    /// failures are logged and swallowed per the orchestrator's contract,
    /// leaving this `None` and the file uncompressed.
    pub compression: Option<CompressionResult>,
}

impl ProcessingResult {
    pub fn success(original_name: String, mimetype: String, public_id: String, secure_url: String, size: u64, format: Option<String>) -> Self {
        Self {
            processed_at: Timestamp::now(),
            original_name,
            mimetype,
            public_id,
            secure_url,
            size,
            format,
            status: ProcessingStatus::Success,
            processing_error: None,
            typed: None,
            compression: None,
        }
    }

    pub fn failed(mut self, error: impl Into<String>) -> Self {
        self.status = ProcessingStatus::Failed;
        self.processing_error = Some(error.into());
        self
    }

    pub fn with_typed(mut self, typed: TypedResult) -> Self {
        self.typed = Some(typed);
        self
    }

    pub fn with_compression(mut self, compression: CompressionResult) -> Self {
        self.compression = Some(compression);
        self
    }
}
