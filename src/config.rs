//! Runtime configuration: data directory, credential and endpoint lookup.

use crate::error::{OcrError, Result};
use crate::ocr::DEFAULT_ENDPOINT;
use crate::store::{KeyValueStore, API_KEY_KEY};
use crate::types::KNOWN_MODELS;
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "OCR_EXTRACT_DATA_DIR";
pub const API_KEY_ENV: &str = "MISTRAL_API_KEY";
pub const ENDPOINT_ENV: &str = "MISTRAL_OCR_ENDPOINT";

const APP_DIR_NAME: &str = "ocr-extract";
const DB_FILE_NAME: &str = "ocr_extract.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Flag,
    Env,
    Stored,
}

impl std::fmt::Display for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            KeySource::Flag => "command line",
            KeySource::Env => API_KEY_ENV,
            KeySource::Stored => "saved settings",
        };
        f.write_str(s)
    }
}

/// `--data-dir`, then `OCR_EXTRACT_DATA_DIR`, then the platform data dir.
pub fn resolve_data_dir(flag: Option<&Path>) -> PathBuf {
    if let Some(dir) = flag {
        return dir.to_path_buf();
    }
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

pub fn db_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DB_FILE_NAME)
}

/// Load `.env` from the working directory, then from the data directory so
/// users can keep credentials next to their history.
pub fn load_env(data_dir: &Path) {
    let _ = dotenvy::dotenv();
    let env_path = data_dir.join(".env");
    if env_path.exists() {
        if let Err(e) = dotenvy::from_path(&env_path) {
            tracing::warn!("Could not load {}: {}", env_path.display(), e);
        }
    }
}

pub fn endpoint() -> String {
    std::env::var(ENDPOINT_ENV)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
}

/// First non-blank of flag, environment and stored value.
pub fn pick_api_key(
    flag: Option<&str>,
    env: Option<String>,
    stored: Option<String>,
) -> Option<(String, KeySource)> {
    let non_blank = |s: &str| {
        let t = s.trim();
        (!t.is_empty()).then(|| t.to_string())
    };
    flag.and_then(non_blank)
        .map(|k| (k, KeySource::Flag))
        .or_else(|| env.as_deref().and_then(non_blank).map(|k| (k, KeySource::Env)))
        .or_else(|| stored.as_deref().and_then(non_blank).map(|k| (k, KeySource::Stored)))
}

pub fn find_api_key<S: KeyValueStore + ?Sized>(
    flag: Option<&str>,
    store: &S,
) -> Result<Option<(String, KeySource)>> {
    let env = std::env::var(API_KEY_ENV).ok();
    let stored = store.get(API_KEY_KEY)?;
    Ok(pick_api_key(flag, env, stored))
}

pub fn require_api_key<S: KeyValueStore + ?Sized>(flag: Option<&str>, store: &S) -> Result<String> {
    match find_api_key(flag, store)? {
        Some((key, source)) => {
            tracing::debug!("Using API key from {}", source);
            Ok(key)
        }
        None => Err(OcrError::MissingApiKey),
    }
}

pub fn save_api_key<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Result<()> {
    let key = key.trim();
    if key.is_empty() {
        return Err(OcrError::MissingApiKey);
    }
    store.set(API_KEY_KEY, key)
}

pub fn clear_api_key<S: KeyValueStore + ?Sized>(store: &S) -> Result<()> {
    store.remove(API_KEY_KEY)
}

/// Unknown models are passed through; the service decides.
pub fn check_model(model: &str) {
    if !KNOWN_MODELS.contains(&model) {
        tracing::warn!("Unknown OCR model '{}', known models: {}", model, KNOWN_MODELS.join(", "));
    }
}
