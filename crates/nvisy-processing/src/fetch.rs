//! Bounded remote fetches shared by every typed processor.
//!
//! Nothing downstream should ever hold an unbounded buffer from an
//! attacker-controlled or merely misconfigured upstream; both [`fetch_buffer`]
//! and [`fetch_stream`] enforce `max_bytes` against both the declared
//! `Content-Length` and the actual running byte count as it arrives.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use nvisy_queue::{RetryExecutor, RetryPresetName};

use crate::error::ProcessingError;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Retries a fetch attempt per the `network` preset, absorbing transient
/// failures (connection reset, timeout) into a single call so that a
/// flaky download never burns more than one queue attempt.
async fn with_network_retry<T, F, Fut>(op: F) -> Result<T, ProcessingError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProcessingError>>,
{
    let executor = RetryExecutor::from_preset_name(RetryPresetName::Network);
    executor
        .execute(op, |err| matches!(err, ProcessingError::Retryable { .. }))
        .await
}

/// Coarse family a declared or sniffed mimetype routes to, per the
/// orchestrator's dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeFamily {
    Image,
    Pdf,
    Csv,
    Unsupported,
}

impl MimeFamily {
    pub fn from_mimetype(mimetype: &str) -> Self {
        let mimetype = mimetype.to_ascii_lowercase();
        if mimetype.starts_with("image/") {
            Self::Image
        } else if mimetype == "application/pdf" {
            Self::Pdf
        } else if matches!(
            mimetype.as_str(),
            "text/csv" | "application/csv" | "application/vnd.ms-excel" | "text/plain"
        ) {
            Self::Csv
        } else {
            Self::Unsupported
        }
    }
}

/// Downloads the entire body at `url`, rejecting (without buffering past the
/// limit) anything past `max_bytes`.
///
/// Retries transient failures internally via the `network` preset, so a
/// connection reset partway through a download never surfaces to the
/// caller as a separate attempt.
pub async fn fetch_buffer(url: &str, max_bytes: u64) -> Result<Bytes, ProcessingError> {
    with_network_retry(|| fetch_buffer_once(url, max_bytes)).await
}

async fn fetch_buffer_once(url: &str, max_bytes: u64) -> Result<Bytes, ProcessingError> {
    let client = reqwest::Client::new();
    let response = client.get(url).timeout(FETCH_TIMEOUT).send().await?;

    if let Some(declared) = response.content_length() {
        if declared > max_bytes {
            return Err(ProcessingError::permanent("Remote file too large"));
        }
    }

    let mut body = response.bytes_stream();
    let mut buffer = BytesMut::new();
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        if buffer.len() as u64 + chunk.len() as u64 > max_bytes {
            return Err(ProcessingError::permanent("Remote file too large"));
        }
        buffer.extend_from_slice(&chunk);
    }

    Ok(buffer.freeze())
}

/// Establishes the connection and validates the declared `Content-Length`,
/// retrying transient failures per the `network` preset. Once this returns,
/// chunk delivery is not retried individually — reconnecting mid-stream
/// would require the caller to discard and re-parse what it already
/// consumed.
async fn open_stream_response(url: &str, max_bytes: u64) -> Result<reqwest::Response, ProcessingError> {
    with_network_retry(|| async {
        let client = reqwest::Client::new();
        let response = client.get(url).timeout(FETCH_TIMEOUT).send().await?;
        if let Some(declared) = response.content_length() {
            if declared > max_bytes {
                return Err(ProcessingError::permanent("Remote file too large"));
            }
        }
        Ok(response)
    })
    .await
}

/// Streams the body at `url` chunk by chunk, enforcing the same `max_bytes`
/// ceiling as [`fetch_buffer`] without holding the whole body in memory.
pub fn fetch_stream(
    url: String,
    max_bytes: u64,
) -> Pin<Box<dyn Stream<Item = Result<Bytes, ProcessingError>> + Send>> {
    Box::pin(async_stream::stream! {
        let response = match open_stream_response(&url, max_bytes).await {
            Ok(response) => response,
            Err(err) => {
                yield Err(err);
                return;
            }
        };

        let mut body = response.bytes_stream();
        let mut total: u64 = 0;
        while let Some(chunk) = body.next().await {
            match chunk {
                Ok(chunk) => {
                    total += chunk.len() as u64;
                    if total > max_bytes {
                        yield Err(ProcessingError::permanent("Remote file too large"));
                        return;
                    }
                    yield Ok(chunk);
                }
                Err(err) => {
                    yield Err(ProcessingError::from(err));
                    return;
                }
            }
        }
    })
}

/// Sniffs `buffer`'s magic bytes and reports whether they match
/// `expected_family`. Callers decide per-family whether a mismatch is a
/// soft warning (images: proceed best-effort) or a hard error (PDFs).
pub fn validate_buffer_type(buffer: &[u8], expected_family: MimeFamily) -> bool {
    let Some(kind) = infer::get(buffer) else {
        return false;
    };
    let mime = kind.mime_type();
    match expected_family {
        MimeFamily::Image => mime.starts_with("image/"),
        MimeFamily::Pdf => mime == "application/pdf",
        MimeFamily::Csv => false,
        MimeFamily::Unsupported => false,
    }
}
