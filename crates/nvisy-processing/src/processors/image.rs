//! Image metadata extraction and thumbnailing.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use nvisy_data::{ObjectStorage, ThumbnailUrlOptions};

use super::TypedProcessor;
use crate::error::ProcessingError;
use crate::fetch::{fetch_buffer, validate_buffer_type, MimeFamily};
use crate::payload::{FileMeta, TypedResult};

/// Remote images larger than this are rejected rather than downloaded.
pub const IMAGE_MAX_BYTES: u64 = 20 * 1024 * 1024;

const THUMBNAIL_SIDE: u32 = 200;

/// Extracts image dimensions/format and produces a thumbnail, preferring the
/// object store's own transformation API over local decoding.
pub struct ImageProcessor {
    storage: Arc<dyn ObjectStorage>,
}

impl ImageProcessor {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }

    async fn thumbnail(&self, storage_ref: &str, bytes: Option<&[u8]>) -> (Option<String>, bool) {
        let opts = ThumbnailUrlOptions {
            width: Some(THUMBNAIL_SIDE),
            height: Some(THUMBNAIL_SIDE),
        };
        match self.storage.thumbnail_url(storage_ref, opts).await {
            Ok(Some(url)) => return (Some(url), true),
            Ok(None) | Err(_) => {}
        }

        let Some(bytes) = bytes else {
            return (None, false);
        };

        match generate_local_thumbnail(bytes) {
            Ok(data_url) => (Some(data_url), true),
            Err(err) => {
                tracing::warn!(error = %err, "local thumbnail generation failed");
                (None, false)
            }
        }
    }
}

#[async_trait]
impl TypedProcessor for ImageProcessor {
    async fn process(&self, file_meta: &FileMeta, storage_ref: &str) -> Result<TypedResult, ProcessingError> {
        if let (Some(width), Some(height)) = (file_meta.known_width, file_meta.known_height) {
            let (thumbnail_url, thumbnail_generated) = self.thumbnail(storage_ref, None).await;
            return Ok(TypedResult::Image {
                width: Some(width),
                height: Some(height),
                format: file_meta.known_format.clone(),
                thumbnail_url,
                thumbnail_generated,
            });
        }

        let url = self
            .storage
            .download_url(storage_ref, "image", Some(&file_meta.original_name))
            .await
            .map_err(ProcessingError::from)?;
        let buffer = fetch_buffer(&url, IMAGE_MAX_BYTES).await?;

        if !validate_buffer_type(&buffer, MimeFamily::Image) {
            tracing::warn!(
                original_name = %file_meta.original_name,
                "image magic bytes did not match declared mimetype, proceeding best-effort"
            );
        }

        let (width, height, format) = match image::load_from_memory(&buffer) {
            Ok(decoded) => {
                let format = image::guess_format(&buffer).ok().map(|f| format!("{f:?}").to_lowercase());
                (Some(decoded.width()), Some(decoded.height()), format)
            }
            Err(err) => {
                tracing::warn!(error = %err, "image decode failed, returning without dimensions");
                (None, None, None)
            }
        };

        let (thumbnail_url, thumbnail_generated) = self.thumbnail(storage_ref, Some(&buffer)).await;

        Ok(TypedResult::Image {
            width,
            height,
            format,
            thumbnail_url,
            thumbnail_generated,
        })
    }
}

fn generate_local_thumbnail(bytes: &[u8]) -> Result<String, image::ImageError> {
    let decoded = image::load_from_memory(bytes)?;
    let thumbnail = decoded.thumbnail(THUMBNAIL_SIDE, THUMBNAIL_SIDE);

    let mut jpeg_bytes = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut jpeg_bytes);
    thumbnail.write_to(&mut cursor, image::ImageFormat::Jpeg)?;

    let encoded = base64::engine::general_purpose::STANDARD.encode(&jpeg_bytes);
    Ok(format!("data:image/jpeg;base64,{encoded}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_thumbnail_is_a_data_url() {
        let mut img = image::RgbImage::new(400, 300);
        for pixel in img.pixels_mut() {
            *pixel = image::Rgb([128, 64, 200]);
        }
        let dynamic = image::DynamicImage::ImageRgb8(img);
        let mut bytes = Vec::new();
        dynamic
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let data_url = generate_local_thumbnail(&bytes).unwrap();
        assert!(data_url.starts_with("data:image/jpeg;base64,"));
    }
}
