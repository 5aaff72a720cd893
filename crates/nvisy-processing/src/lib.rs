#![doc = include_str!("../README.md")]

mod batch;
mod compressor;
mod error;
mod fetch;
mod orchestrator;
mod payload;
mod processors;

pub use batch::{
    BatchCoordinator, BatchEntry, BatchEntryStatus, BatchError, BatchOptions, BatchSnapshot,
    NewBatchFile, Role,
};
pub use compressor::{Compressor, GzipCompressor};
pub use error::ProcessingError;
pub use fetch::{fetch_buffer, fetch_stream, validate_buffer_type, MimeFamily};
pub use orchestrator::{FileProcessingOrchestrator, FileStatus, OrchestratorError};
pub use payload::{
    CompressionResult, FileMeta, ProcessingPayload, ProcessingResult, ProcessingStatus, TypedResult,
};
pub use processors::{CsvProcessor, ImageProcessor, PdfProcessor, TypedProcessor};
