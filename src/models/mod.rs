pub mod history;
pub mod ocr_response;

pub use history::{HistoryEntry, HISTORY_CAPACITY};
pub use ocr_response::{EmbeddedImage, OcrPage, OcrResponse};
