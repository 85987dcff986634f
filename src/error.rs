//! Error types for the OCR client.
//!
//! Input validation and transport failures terminate the current operation
//! only. Persistence read failures never reach this type: the history cache
//! recovers from them locally.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OcrError>;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Please enter an API key.")]
    MissingApiKey,

    #[error("Please choose an image file to recognize.")]
    MissingImage,

    #[error("File not found.")]
    FileNotFound,

    #[error("Not a supported image file (JPG, PNG, GIF, WebP): {0}")]
    UnsupportedImage(String),

    #[error("File too large (max {max_mb}MB).")]
    FileTooLarge { max_mb: u64 },

    #[error("Image data could not be prepared or has an invalid format.")]
    InvalidDataUrl,

    #[error("Check your internet connection and try again.")]
    Connection(#[source] reqwest::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API request failed ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("API returned a non-JSON response (content type: {0})")]
    NotJson(String),

    #[error("History entry {0} not found.")]
    EntryNotFound(i64),

    #[error("Nothing to copy.")]
    NothingToCopy,

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("History ids are exhausted; clear the history to continue.")]
    HistoryIdExhausted,
}

impl OcrError {
    /// Input problems the user can fix before retrying; no state was touched.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            OcrError::MissingApiKey
                | OcrError::MissingImage
                | OcrError::FileNotFound
                | OcrError::UnsupportedImage(_)
                | OcrError::FileTooLarge { .. }
                | OcrError::InvalidDataUrl
        )
    }

    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            OcrError::Connection(_) | OcrError::Network(_) | OcrError::Api { .. } | OcrError::NotJson(_)
        )
    }
}

impl<T> From<std::sync::PoisonError<T>> for OcrError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        OcrError::LockPoisoned
    }
}
