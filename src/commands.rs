use crate::cache::HistoryCache;
use crate::config;
use crate::error::{OcrError, Result};
use crate::models::HistoryEntry;
use crate::ocr::OcrTransport;
use crate::services::image_input::ImageInput;
use crate::services::normalizer::{normalize_with, NormalizeOptions};
use crate::store::KeyValueStore;
use crate::types::ExtractionOutcome;
use std::fs;
use std::path::Path;

pub struct ExtractRequest<'a> {
    pub image: &'a ImageInput,
    pub model: &'a str,
    pub options: NormalizeOptions,
}

/// Run one extraction: request, normalize, and record a history entry when
/// text came back. Transport errors leave history untouched.
pub fn extract<S, T>(
    history: &mut HistoryCache<'_, S>,
    transport: &T,
    request: &ExtractRequest<'_>,
) -> Result<ExtractionOutcome>
where
    S: KeyValueStore + ?Sized,
    T: OcrTransport + ?Sized,
{
    config::check_model(request.model);
    let raw = transport.recognize(request.model, &request.image.data_url)?;
    let html = normalize_with(&raw, request.options);
    if html.is_empty() {
        tracing::info!("No text extracted from {}", request.image.label);
        return Ok(ExtractionOutcome::NoText);
    }

    let entry = HistoryEntry::new(request.model, &request.image.label, &request.image.data_url, &html);
    let entries = history.insert(entry)?;
    let history_id = entries.first().map(|e| e.id).unwrap_or_default();
    tracing::info!("Saved extraction {} to history", history_id);
    Ok(ExtractionOutcome::Extracted { html, history_id })
}

pub fn get_history<'c, S: KeyValueStore + ?Sized>(history: &'c HistoryCache<'_, S>) -> &'c [HistoryEntry] {
    history.entries()
}

pub fn get_history_by_id<'c, S: KeyValueStore + ?Sized>(
    history: &'c HistoryCache<'_, S>,
    id: i64,
) -> Result<&'c HistoryEntry> {
    history.restore(id).ok_or(OcrError::EntryNotFound(id))
}

/// Returns whether an entry was actually removed.
pub fn delete_history_record<S: KeyValueStore + ?Sized>(history: &mut HistoryCache<'_, S>, id: i64) -> Result<bool> {
    let before = history.len();
    let after = history.remove(id)?.len();
    Ok(after < before)
}

/// Returns how many entries were cleared.
pub fn clear_history<S: KeyValueStore + ?Sized>(history: &mut HistoryCache<'_, S>) -> Result<usize> {
    let count = history.len();
    history.clear()?;
    Ok(count)
}

pub fn get_api_key_status<S: KeyValueStore + ?Sized>(flag: Option<&str>, store: &S) -> Result<String> {
    Ok(match config::find_api_key(flag, store)? {
        Some((_, source)) => format!("configured ({})", source),
        None => "not_configured".to_string(),
    })
}

/// Write the markup into a standalone HTML page.
pub fn export_html(path: &Path, title: &str, markup: &str) -> Result<()> {
    let page = format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n<div class=\"ocr-result\">{}</div>\n</body>\n</html>\n",
        escape_title(title),
        markup
    );
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, page)?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

fn escape_title(title: &str) -> String {
    title.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
