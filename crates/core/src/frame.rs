//! Video frame normalization
//!
//! Frames arrive in whatever encoding the client canvas produced. They are
//! decoded to validate them and re-encoded as JPEG so the detection service
//! always receives a single format.

use bytes::Bytes;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

use crate::{Error, Result};

/// Decode an encoded image and re-encode it as JPEG.
///
/// Returns `Error::Frame` if the bytes are not a decodable image. This is
/// CPU-bound; async callers should run it on a blocking thread.
pub fn normalize_frame(encoded: &[u8]) -> Result<Bytes> {
    if encoded.is_empty() {
        return Err(Error::Frame("empty frame".to_string()));
    }

    let decoded = image::load_from_memory(encoded).map_err(|e| Error::Frame(e.to_string()))?;

    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());

    let mut out = Cursor::new(Vec::with_capacity(encoded.len()));
    rgb.write_to(&mut out, ImageFormat::Jpeg)
        .map_err(|e| Error::Frame(format!("failed to encode frame: {}", e)))?;

    Ok(Bytes::from(out.into_inner()))
}
