//! Loading a local image and encoding it as a data URI for the OCR request.

use crate::error::{OcrError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::fs;
use std::io;
use std::path::Path;

const MAX_IMAGE_BYTES: u64 = 50 * 1024 * 1024;

/// Label used when the image has no file name (e.g. piped from stdin).
pub const UNKNOWN_IMAGE_LABEL: &str = "pasted_or_unknown_image";

#[derive(Debug, Clone, PartialEq)]
pub struct ImageInput {
    pub label: String,
    pub mime: &'static str,
    pub data_url: String,
}

/// Read and validate an image file.
pub fn load_image(path: &Path) -> Result<ImageInput> {
    let metadata = fs::metadata(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            OcrError::FileNotFound
        } else {
            OcrError::Io(e)
        }
    })?;
    if !metadata.is_file() {
        return Err(OcrError::MissingImage);
    }
    if metadata.len() > MAX_IMAGE_BYTES {
        return Err(OcrError::FileTooLarge {
            max_mb: MAX_IMAGE_BYTES / (1024 * 1024),
        });
    }
    let bytes = fs::read(path)?;
    let label = path
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or(UNKNOWN_IMAGE_LABEL);
    from_bytes(&bytes, label)
}

/// Validate raw bytes as an image and encode them.
pub fn from_bytes(bytes: &[u8], label: &str) -> Result<ImageInput> {
    if bytes.is_empty() {
        return Err(OcrError::MissingImage);
    }
    let mime = sniff_mime(bytes).ok_or_else(|| OcrError::UnsupportedImage(label.to_string()))?;
    let label = if label.trim().is_empty() {
        UNKNOWN_IMAGE_LABEL
    } else {
        label
    };
    tracing::debug!("Loaded {} ({}, {} bytes)", label, mime, bytes.len());
    Ok(ImageInput {
        label: label.to_string(),
        mime,
        data_url: format!("data:{};base64,{}", mime, BASE64.encode(bytes)),
    })
}

/// Detect the image type from its magic bytes.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

/// The OCR endpoint only accepts `data:image/...` URIs.
pub fn validate_data_url(data_url: &str) -> Result<()> {
    if data_url.starts_with("data:image") {
        Ok(())
    } else {
        Err(OcrError::InvalidDataUrl)
    }
}
