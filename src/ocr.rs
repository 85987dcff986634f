use crate::error::{OcrError, Result};
use crate::services::image_input::validate_data_url;
use crate::types::OcrRequest;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;

pub const DEFAULT_ENDPOINT: &str = "https://api.mistral.ai/v1/ocr";

/// Anything that can turn an image data URI into a raw OCR payload.
pub trait OcrTransport {
    fn recognize(&self, model: &str, data_url: &str) -> Result<Value>;
}

/// Blocking HTTP client for the Mistral OCR endpoint.
pub struct OcrClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl OcrClient {
    pub fn new(endpoint: &str, api_key: &str) -> Result<Self> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(OcrError::MissingApiKey);
        }
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

impl OcrTransport for OcrClient {
    fn recognize(&self, model: &str, data_url: &str) -> Result<Value> {
        validate_data_url(data_url)?;
        let payload = OcrRequest::for_image(model, data_url);

        tracing::info!("Sending OCR request (model {})", model);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header(ACCEPT, "application/json")
            .json(&payload)
            .send()
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    OcrError::Connection(e)
                } else {
                    OcrError::Network(e)
                }
            })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::warn!("OCR request failed with status {}", status);
            return Err(OcrError::Api {
                status: status.as_u16(),
                body: if body.is_empty() {
                    "Invalid API key?".to_string()
                } else {
                    body
                },
            });
        }
        if !is_json_content_type(&content_type) {
            return Err(OcrError::NotJson(content_type));
        }

        let json: Value = response.json()?;
        tracing::debug!("OCR response received");
        Ok(json)
    }
}

fn is_json_content_type(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("application/json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_content_type_detection() {
        assert!(is_json_content_type("application/json"));
        assert!(is_json_content_type("application/json; charset=utf-8"));
        assert!(is_json_content_type("Application/JSON"));
        assert!(!is_json_content_type("text/html"));
        assert!(!is_json_content_type(""));
    }

    #[test]
    fn client_requires_api_key() {
        assert!(matches!(OcrClient::new(DEFAULT_ENDPOINT, "  "), Err(OcrError::MissingApiKey)));
    }

    #[test]
    fn invalid_data_url_fails_before_sending() {
        let client = OcrClient::new("http://127.0.0.1:9", "key").unwrap();
        let err = client.recognize("mistral-ocr-latest", "not-a-data-url").unwrap_err();
        assert!(matches!(err, OcrError::InvalidDataUrl));
    }
}
