use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "mistral-ocr-latest";
pub const KNOWN_MODELS: &[&str] = &["mistral-ocr-latest", "mistral-ocr-2503"];

/// Result text shown before any extraction ran.
pub const IDLE_RESULT: &str = "Upload an image and run extract.";
/// Result text shown when the request failed.
pub const FAILED_RESULT: &str = "Recognition failed.";
/// Result text shown when the service returned no text.
pub const NO_TEXT_RESULT: &str = "No text could be extracted, or the image contains no text.";

/// JSON body of the OCR request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrRequest {
    pub model: String,
    pub document: OcrDocument,
    pub include_image_base64: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrDocument {
    #[serde(rename = "type")]
    pub kind: String,
    pub image_url: String,
}

impl OcrRequest {
    pub fn for_image(model: &str, data_url: &str) -> Self {
        Self {
            model: model.to_string(),
            document: OcrDocument {
                kind: "image_url".to_string(),
                image_url: data_url.to_string(),
            },
            include_image_base64: true,
        }
    }
}

/// What a completed extraction produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExtractionOutcome {
    /// Text was found; the entry was saved to history under `history_id`.
    Extracted { html: String, history_id: i64 },
    /// Recognized response shape but nothing to show. Not an error.
    NoText,
}
