//! Loading and validation of character input from JSON and JSONL sources.
//!
//! Validation is performed up front for every record in a batch before any
//! remote call is issued, so a bad record aborts before the first API call.

use std::fs;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::character::model::{CanonicalRecord, RecordMetadata, SectionBlock};
use crate::taxonomy::{
    is_mandatory_field, is_section_name, normalize_for_lookup, MANDATORY_FIELDS, TEMPLATE_SECTIONS,
};

/// Fatal problems with an input file or one of its records.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("file not found or unreadable: {path}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON decode error on line {line}: {source}")]
    JsonlLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("no character records found in file")]
    Empty,

    #[error("record {index} validation failed: {source}")]
    Record {
        index: usize,
        #[source]
        source: ValidationError,
    },
}

/// Why a single character object failed validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing mandatory field: {0}")]
    MissingMandatoryField(&'static str),

    #[error("character record must be a JSON object")]
    NotAnObject,
}

/// Input file shape for [`load_character_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// A single character object or an array of character objects.
    Json,
    /// One character object per line; blank lines are skipped.
    Jsonl,
}

/// Loads and parses a JSON file.
pub fn load_json_file(path: &Path) -> Result<Value, InputError> {
    let text = fs::read_to_string(path).map_err(|source| InputError::Unreadable {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| InputError::Json {
        path: path.display().to_string(),
        source,
    })
}

/// Loads a JSONL file, one object per non-blank line. A decode error on any
/// line aborts the whole file with the 1-based line number reported.
pub fn load_jsonl_file(path: &Path) -> Result<Vec<Value>, InputError> {
    let text = fs::read_to_string(path).map_err(|source| InputError::Unreadable {
        path: path.display().to_string(),
        source,
    })?;

    let mut records = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value =
            serde_json::from_str(line).map_err(|source| InputError::JsonlLine {
                line: idx + 1,
                source,
            })?;
        records.push(value);
    }
    Ok(records)
}

/// Loads a character file and validates every record before returning.
///
/// Fails on the first invalid record (1-based index in the error) — no
/// partial batch is returned.
pub fn load_character_file(
    path: &Path,
    format: InputFormat,
) -> Result<Vec<CanonicalRecord>, InputError> {
    let raw_records = match format {
        InputFormat::Jsonl => load_jsonl_file(path)?,
        InputFormat::Json => match load_json_file(path)? {
            Value::Array(items) => items,
            single => vec![single],
        },
    };

    if raw_records.is_empty() {
        return Err(InputError::Empty);
    }

    let mut validated = Vec::with_capacity(raw_records.len());
    for (idx, raw) in raw_records.iter().enumerate() {
        let record = validate_record(raw)
            .map_err(|source| InputError::Record { index: idx + 1, source })?;
        validated.push(record);
    }

    debug!("Validated {} character record(s) from {}", validated.len(), path.display());
    Ok(validated)
}

/// Validates a raw character object against the taxonomy and produces the
/// canonical record. Never mutates the input.
///
/// Mandatory fields are searched case/spacing-insensitively across a
/// flattened view of the object: top-level keys first, then keys hoisted out
/// of every section, so a mandatory field may live at either level. The
/// first miss short-circuits with the field's human-readable description.
pub fn validate_record(raw: &Value) -> Result<CanonicalRecord, ValidationError> {
    let object = raw.as_object().ok_or(ValidationError::NotAnObject)?;

    // Flattened working set: (lookup key, value), top-level entries first so
    // they win over section-nested duplicates.
    let mut flat: Vec<(String, &Value)> = Vec::new();
    for (key, value) in object {
        if key != "metadata" && !is_section_name(key) {
            flat.push((normalize_for_lookup(key), value));
        }
    }
    for section in TEMPLATE_SECTIONS {
        if let Some(Value::Object(fields)) = object.get(section.name) {
            for (key, value) in fields {
                flat.push((normalize_for_lookup(key), value));
            }
        }
    }

    // Mandatory check in enumeration order, first match wins.
    let mut mandatory_values = Vec::with_capacity(MANDATORY_FIELDS.len());
    for (mandatory_key, description) in MANDATORY_FIELDS {
        let found = flat
            .iter()
            .find(|(key, _)| key == mandatory_key)
            .map(|(_, value)| mandatory_value_to_string(mandatory_key, value));
        match found {
            Some(value) => mandatory_values.push(value),
            None => return Err(ValidationError::MissingMandatoryField(description)),
        }
    }
    let mut mandatory_values = mandatory_values.into_iter();
    let name = mandatory_values.next().unwrap_or_default();
    let ethnicity = mandatory_values.next().unwrap_or_default();
    let sex_gender = mandatory_values.next().unwrap_or_default();
    let age = mandatory_values.next().unwrap_or_default();
    let occupation = mandatory_values.next().unwrap_or_default();

    // Optional projection: per section, copy non-mandatory fields with
    // normalized keys. Sections with nothing left are omitted.
    let mut sections = Vec::new();
    for section in TEMPLATE_SECTIONS {
        if let Some(Value::Object(fields)) = object.get(section.name) {
            let mut block = Vec::new();
            for (key, value) in fields {
                let normalized = normalize_for_lookup(key);
                if !is_mandatory_field(&normalized) {
                    block.push((normalized, value.clone()));
                }
            }
            if !block.is_empty() {
                sections.push(SectionBlock {
                    name: section.name,
                    fields: block,
                });
            }
        }
    }

    // Uncatalogued top-level keys are kept apart from the canonical
    // sections rather than silently merged.
    let mut extra = Vec::new();
    for (key, value) in object {
        if key == "metadata" || is_section_name(key) {
            continue;
        }
        if !is_mandatory_field(&normalize_for_lookup(key)) {
            warn!("Uncatalogued top-level field kept as extra: {key}");
            extra.push((key.clone(), value.clone()));
        }
    }

    let metadata = extract_metadata(object.get("metadata"));

    Ok(CanonicalRecord {
        name,
        ethnicity,
        sex_gender,
        age,
        occupation,
        sections,
        extra,
        metadata,
    })
}

/// Extracts the two recognized metadata directives. Unknown keys are
/// silently dropped; a `json_output` value that cannot be read as a boolean
/// is warned about and dropped rather than guessed at.
fn extract_metadata(meta: Option<&Value>) -> RecordMetadata {
    let mut metadata = RecordMetadata::default();
    let Some(Value::Object(meta)) = meta else {
        return metadata;
    };

    if let Some(title) = meta.get("new_doc_title") {
        match title.as_str() {
            Some(title) if !title.is_empty() => {
                metadata.new_doc_title = Some(title.to_string());
            }
            _ => warn!("Ignoring non-string new_doc_title in metadata"),
        }
    }

    if let Some(flag) = meta.get("json_output") {
        match coerce_bool_like(flag) {
            Some(value) => metadata.json_output = Some(value),
            None => warn!("Ignoring json_output metadata value that is not boolean-like: {flag}"),
        }
    }

    metadata
}

/// Reads a JSON value as a boolean: real booleans, the recognized string
/// tokens, and numbers (non-zero is true). Anything else is `None`.
pub fn coerce_bool_like(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => parse_bool_token(s),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        _ => None,
    }
}

/// Case-insensitive boolean token match: `true/1/yes/y` and `false/0/no/n`.
pub fn parse_bool_token(token: &str) -> Option<bool> {
    match token.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Some(true),
        "false" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Coerces a mandatory-field value to its canonical scalar string form.
///
/// `sex/gender` additionally accepts a `{sex, gender}` object, folded into
/// the `"sex|gender"` pipe encoding.
fn mandatory_value_to_string(field: &str, value: &Value) -> String {
    if field == "sex/gender" {
        if let Value::Object(parts) = value {
            let sex = parts.get("sex").and_then(Value::as_str).unwrap_or_default();
            let gender = parts.get("gender").and_then(Value::as_str).unwrap_or_default();
            return if gender.is_empty() {
                sex.to_lowercase()
            } else {
                format!("{}|{}", sex.to_lowercase(), gender.to_lowercase())
            };
        }
    }
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
