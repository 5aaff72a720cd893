//! CSV schema sniffing: headers, row counts, and a sensitive-data heuristic.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::BytesMut;
use futures::StreamExt;
use nvisy_data::ObjectStorage;

use super::TypedProcessor;
use crate::error::ProcessingError;
use crate::fetch::fetch_stream;
use crate::payload::{FileMeta, TypedResult};

/// Default cap on downloaded CSV size.
pub const CSV_MAX_BYTES: u64 = 50 * 1024 * 1024;

const SAMPLE_ROWS: usize = 3;

const SENSITIVE_HEADER_SUBSTRINGS: &[&str] = &[
    "password", "ssn", "social", "credit", "card", "phone", "email",
];

pub struct CsvProcessor {
    storage: Arc<dyn ObjectStorage>,
}

impl CsvProcessor {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl TypedProcessor for CsvProcessor {
    async fn process(&self, file_meta: &FileMeta, storage_ref: &str) -> Result<TypedResult, ProcessingError> {
        let url = self
            .storage
            .download_url(storage_ref, "raw", Some(&file_meta.original_name))
            .await
            .map_err(ProcessingError::from)?;

        let mut stream = fetch_stream(url, CSV_MAX_BYTES);
        let mut buffer = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            buffer.extend_from_slice(&chunk?);
        }

        parse_csv(&buffer)
    }
}

fn parse_csv(buffer: &[u8]) -> Result<TypedResult, ProcessingError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(buffer);

    let headers = reader
        .headers()
        .map_err(classify_csv_error)?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let column_count = headers.len();
    let has_sensitive_data = headers.iter().any(|header| {
        let header = header.to_ascii_lowercase();
        SENSITIVE_HEADER_SUBSTRINGS.iter().any(|needle| header.contains(needle))
    });

    let mut row_count: u64 = 0;
    let mut sample_row_count = 0usize;
    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(err) => return Err(classify_csv_error(err)),
        };
        if record.iter().all(str::is_empty) {
            continue;
        }
        row_count += 1;
        if sample_row_count < SAMPLE_ROWS {
            sample_row_count += 1;
        }
    }

    Ok(TypedResult::Csv {
        row_count,
        column_count,
        columns: headers,
        has_sensitive_data,
        sample_row_count,
    })
}

fn classify_csv_error(err: csv::Error) -> ProcessingError {
    let message = err.to_string();
    let lower = message.to_ascii_lowercase();
    if lower.contains("invalid record") || lower.contains("malformed") {
        ProcessingError::permanent(message)
    } else {
        ProcessingError::retryable(message)
    }
}
