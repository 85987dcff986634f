use serde::{Deserialize, Serialize};

/// Maximum number of extractions kept in history.
pub const HISTORY_CAPACITY: usize = 10;

/// One persisted record of a successful extraction.
///
/// Serialized field names match the original browser tool so existing
/// history blobs stay readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub timestamp: String,
    pub model: String,
    #[serde(rename = "imageName")]
    pub image_label: String,
    #[serde(rename = "originalImageDataUrl")]
    pub source_image: String,
    #[serde(rename = "resultHTML")]
    pub normalized_result: String,
}

impl HistoryEntry {
    /// Build an entry stamped with the current time.
    pub fn new(model: &str, image_label: &str, source_image: &str, normalized_result: &str) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: now.timestamp_millis(),
            timestamp: now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            model: model.to_string(),
            image_label: image_label.to_string(),
            source_image: source_image.to_string(),
            normalized_result: normalized_result.to_string(),
        }
    }
}
