//! Generator-output validation — extracting the JSON object a model was
//! asked to produce, tolerating prose around it.
//!
//! Failure here is recoverable: the caller falls back to treating the raw
//! response as unstructured text.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("No JSON found in response")]
    NoJsonFound,

    #[error("JSON decode error: {0}")]
    JsonDecode(#[from] serde_json::Error),
}

/// Extracts and parses the first-`{`-to-last-`}` span of a generator
/// response. Leading and trailing prose around the JSON is tolerated.
pub fn validate_json_output(response_text: &str) -> Result<Value, OutputError> {
    let start = response_text.find('{').ok_or(OutputError::NoJsonFound)?;
    let end = response_text.rfind('}').ok_or(OutputError::NoJsonFound)?;
    if end < start {
        return Err(OutputError::NoJsonFound);
    }

    let data: Value = serde_json::from_str(&response_text[start..=end])?;
    if let Some(object) = data.as_object() {
        info!("Valid JSON extracted with {} top-level keys", object.len());
    }
    Ok(data)
}

/// Filename for a per-character JSON file: lowercased name with spaces as
/// underscores, plus a UTC timestamp.
pub fn character_json_filename(character_name: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}_{}.json",
        character_name.trim().to_lowercase().replace(' ', "_"),
        now.format("%Y%m%dT%H%M%SZ")
    )
}

/// Persists one character's structured generation object, pretty-printed.
pub fn save_character_json(path: &Path, character_data: &Value) -> std::io::Result<PathBuf> {
    let pretty = serde_json::to_string_pretty(character_data)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    fs::write(path, pretty).map_err(|e| {
        error!("Failed to save character JSON to {}: {e}", path.display());
        e
    })?;
    info!("Character JSON saved: {}", path.display());
    Ok(path.to_path_buf())
}
