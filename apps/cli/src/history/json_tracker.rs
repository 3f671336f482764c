//! JSONL archive history — one full-fidelity JSON object per generation,
//! appended per line and consumed later for lookup.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::character::model::{CharacterInputs, DndProfile};
use crate::history::HistoryError;
use tracing::{debug, info, warn};

/// One archived generation: metadata about the inputs plus the verbatim
/// AI output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveRecord {
    pub metadata: ArchiveMetadata,
    pub ai_output: GeneratedOutput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveMetadata {
    pub record_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub inputs: ArchiveInputs,
    pub doc_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dnd: Option<DndProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveInputs {
    pub sex: String,
    pub gender: String,
    pub age_range: String,
    pub occupation: String,
    pub ethnicity: String,
}

impl From<&CharacterInputs> for ArchiveInputs {
    fn from(inputs: &CharacterInputs) -> Self {
        Self {
            sex: inputs.sex.clone(),
            gender: inputs.gender.clone(),
            age_range: inputs.age_range.clone(),
            occupation: inputs.occupation.clone(),
            ethnicity: inputs.ethnicity.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedOutput {
    pub base_character: String,
    pub dnd_enhancement: Option<String>,
}

/// The slice of metadata returned by [`list_characters`].
#[derive(Debug, Clone, Serialize)]
pub struct CharacterSummary {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub dnd: Option<DndProfile>,
    pub doc_url: String,
}

/// Appends one record as a single JSON line.
pub fn append_archive_record(jsonl_path: &Path, record: &ArchiveRecord) -> Result<(), HistoryError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(jsonl_path)
        .map_err(|source| HistoryError::Io {
            path: jsonl_path.display().to_string(),
            source,
        })?;

    let line = serde_json::to_string(record)?;
    writeln!(file, "{line}").map_err(|source| HistoryError::Io {
        path: jsonl_path.display().to_string(),
        source,
    })?;

    info!(
        "Character record appended to archive: {} (dnd={})",
        record.metadata.name,
        record.metadata.dnd.is_some()
    );
    Ok(())
}

fn read_records(jsonl_path: &Path) -> Result<Vec<ArchiveRecord>, HistoryError> {
    let text =
        std::fs::read_to_string(jsonl_path).map_err(|source| HistoryError::Io {
            path: jsonl_path.display().to_string(),
            source,
        })?;
    let mut records = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(line)?);
    }
    Ok(records)
}

/// Retrieves the first archived record whose character name matches exactly.
/// A missing archive file is not an error — there is simply no match.
pub fn get_character_by_name(
    jsonl_path: &Path,
    name: &str,
) -> Result<Option<ArchiveRecord>, HistoryError> {
    if !jsonl_path.exists() {
        warn!("Archive file not found: {}", jsonl_path.display());
        return Ok(None);
    }
    let found = read_records(jsonl_path)?
        .into_iter()
        .find(|record| record.metadata.name == name);
    if found.is_none() {
        debug!("Character not found in archive: {name}");
    }
    Ok(found)
}

/// Lists archived characters in append order, newest last, up to `limit`.
pub fn list_characters(
    jsonl_path: &Path,
    limit: Option<usize>,
) -> Result<Vec<CharacterSummary>, HistoryError> {
    if !jsonl_path.exists() {
        warn!("Archive file not found: {}", jsonl_path.display());
        return Ok(Vec::new());
    }
    let mut summaries: Vec<CharacterSummary> = read_records(jsonl_path)?
        .into_iter()
        .map(|record| CharacterSummary {
            name: record.metadata.name,
            created_at: record.metadata.created_at,
            dnd: record.metadata.dnd,
            doc_url: record.metadata.doc_url,
        })
        .collect();
    if let Some(limit) = limit {
        summaries.truncate(limit);
    }
    debug!("Listed {} characters from archive", summaries.len());
    Ok(summaries)
}

/// Converts the JSONL archive into a pretty-printed JSON array file.
/// Returns the number of exported records; a missing archive exports zero.
pub fn export_characters(jsonl_path: &Path, output_path: &Path) -> Result<usize, HistoryError> {
    if !jsonl_path.exists() {
        warn!("Archive file not found: {}", jsonl_path.display());
        return Ok(0);
    }
    let records = read_records(jsonl_path)?;
    let pretty = serde_json::to_string_pretty(&records)?;
    std::fs::write(output_path, pretty).map_err(|source| HistoryError::Io {
        path: output_path.display().to_string(),
        source,
    })?;
    info!(
        "Exported {} characters to JSON: {}",
        records.len(),
        output_path.display()
    );
    Ok(records.len())
}
