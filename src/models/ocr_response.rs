use serde::Deserialize;
use serde_json::Value;

/// One embedded figure returned with a page. Only used to resolve placeholders.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EmbeddedImage {
    #[serde(default)]
    pub id: Option<String>,
    /// Inline payload, a data URI or bare base64.
    #[serde(default, rename = "image_base64", alias = "data")]
    pub data: Option<String>,
}

impl EmbeddedImage {
    pub fn new(id: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            data: Some(data.into()),
        }
    }

    /// Id and data, when both are present and non-empty.
    pub fn resolvable(&self) -> Option<(&str, &str)> {
        let id = self.id.as_deref().filter(|s| !s.is_empty())?;
        let data = self.data.as_deref().filter(|s| !s.is_empty())?;
        Some((id, data))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OcrPage {
    pub markdown: Option<String>,
    pub images: Vec<EmbeddedImage>,
}

impl OcrPage {
    /// Read one page leniently: a missing or non-string `markdown` is empty,
    /// and image entries that fail to parse are skipped on their own so the
    /// page text survives.
    fn from_value(page: &Value) -> Self {
        let markdown = page.get("markdown").and_then(|m| m.as_str()).map(str::to_string);
        let images = page
            .get("images")
            .and_then(|i| i.as_array())
            .map(|images| {
                images
                    .iter()
                    .filter_map(|image| match EmbeddedImage::deserialize(image) {
                        Ok(img) => Some(img),
                        Err(e) => {
                            tracing::warn!("Skipping malformed OCR image entry: {}", e);
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { markdown, images }
    }
}

/// The response shapes the OCR endpoint is known to return.
#[derive(Debug, Clone, PartialEq)]
pub enum OcrResponse {
    /// `{ "pages": [ { "markdown": ..., "images": [...] } ] }`
    Paginated(Vec<OcrPage>),
    /// `{ "choices": [ { "message": { "content": ... } } ] }`
    ChatCompletion(String),
    Unrecognized,
}

impl OcrResponse {
    /// Classify a parsed payload. `pages` wins over `choices` when both exist.
    pub fn from_value(raw: &Value) -> Self {
        if let Some(pages) = raw.get("pages").and_then(|p| p.as_array()) {
            return OcrResponse::Paginated(pages.iter().map(OcrPage::from_value).collect());
        }

        let content = raw
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .filter(|s| !s.is_empty());
        match content {
            Some(text) => OcrResponse::ChatCompletion(text.to_string()),
            None => OcrResponse::Unrecognized,
        }
    }
}
