//! Tabular importer — converts row-oriented CSV records into the nested
//! character shape consumed by the record validator.
//!
//! Per cell: empty values are dropped, `json_output` cells are coerced to
//! booleans, and columns that match no template field are logged and dropped
//! without failing the row.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::character::input::parse_bool_token;
use crate::taxonomy::{find_matching_field, FieldMatch};

/// How many unmatched column names are listed before the batch warning is
/// truncated with `...`.
const UNMATCHED_LOG_LIMIT: usize = 5;

/// Fatal problems with a tabular source file.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("file is not a CSV: {0}")]
    NotTabular(String),

    #[error("file not found or unreadable: {path}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV source: {0}")]
    MalformedSource(String),

    #[error("no valid character data found in CSV")]
    EmptyInput,
}

/// Reads a CSV file and converts every data row into a nested character
/// object keyed by template section.
///
/// The file suffix must be `.csv` — anything else is rejected before the
/// file is opened. A header row is required; rows that produce no matched
/// fields are skipped with a warning.
pub fn convert_csv(csv_path: &Path) -> Result<Vec<Map<String, Value>>, ImportError> {
    if !csv_path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
    {
        return Err(ImportError::NotTabular(csv_path.display().to_string()));
    }

    let file = fs::File::open(csv_path).map_err(|source| ImportError::Unreadable {
        path: csv_path.display().to_string(),
        source,
    })?;

    info!("Reading CSV file: {}", csv_path.display());

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| ImportError::MalformedSource(e.to_string()))?
        .clone();
    if headers.is_empty() {
        return Err(ImportError::MalformedSource(
            "CSV file is empty or has no header row".to_string(),
        ));
    }
    debug!("CSV columns: {:?}", headers);

    let mut characters = Vec::new();
    // Data rows start at line 2; line 1 is the header.
    for (idx, result) in reader.records().enumerate() {
        let row_num = idx + 2;
        let record = result.map_err(|e| ImportError::MalformedSource(e.to_string()))?;
        let character = row_to_character(&headers, &record);
        if character.is_empty() {
            warn!("Row {row_num} produced no character data");
        } else {
            characters.push(character);
        }
    }

    if characters.is_empty() {
        return Err(ImportError::EmptyInput);
    }

    info!("Converted {} character(s) from CSV", characters.len());
    Ok(characters)
}

/// Converts one row into the nested character shape. Unmatched columns are
/// collected and logged as a batch, then dropped.
fn row_to_character(headers: &csv::StringRecord, record: &csv::StringRecord) -> Map<String, Value> {
    let mut character = Map::new();
    let mut unmatched: Vec<&str> = Vec::new();

    for (column, raw_value) in headers.iter().zip(record.iter()) {
        if raw_value.trim().is_empty() {
            continue;
        }

        let Some(matched) = find_matching_field(column) else {
            warn!("No template field found for CSV column: {column}");
            unmatched.push(column);
            continue;
        };

        let (key, field) = match matched {
            FieldMatch::Metadata(field) => ("metadata", field),
            FieldMatch::Section { section, field } => (section, field),
        };
        let value = convert_cell(raw_value, field);
        if let Some(block) = character
            .entry(key)
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
        {
            block.insert(field.to_string(), value);
        }
    }

    if !unmatched.is_empty() {
        let listed = unmatched
            .iter()
            .take(UNMATCHED_LOG_LIMIT)
            .copied()
            .collect::<Vec<_>>()
            .join(", ");
        let truncation = if unmatched.len() > UNMATCHED_LOG_LIMIT {
            "..."
        } else {
            ""
        };
        warn!(
            "Skipped {} unmatched CSV columns: {listed}{truncation}",
            unmatched.len()
        );
    }

    character
}

/// Converts a raw cell to its JSON value. `json_output` cells are matched
/// against the boolean token sets; unrecognized boolean-like text is passed
/// through as a string for the validator to deal with.
fn convert_cell(raw_value: &str, field: &str) -> Value {
    let trimmed = raw_value.trim();
    if field.eq_ignore_ascii_case("json_output") {
        if let Some(flag) = parse_bool_token(trimmed) {
            return Value::Bool(flag);
        }
    }
    Value::String(trimmed.to_string())
}

/// Checks every header column against the template without converting.
/// Returns `(matched, unmatched)` column names in header order.
pub fn validate_columns(csv_path: &Path) -> Result<(Vec<String>, Vec<String>), ImportError> {
    let file = fs::File::open(csv_path).map_err(|source| ImportError::Unreadable {
        path: csv_path.display().to_string(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);
    let headers = reader
        .headers()
        .map_err(|e| ImportError::MalformedSource(e.to_string()))?;

    let mut matched = Vec::new();
    let mut unmatched = Vec::new();
    for column in headers {
        if find_matching_field(column).is_some() {
            matched.push(column.to_string());
        } else {
            unmatched.push(column.to_string());
        }
    }

    info!(
        "CSV validation: {} matched, {} unmatched",
        matched.len(),
        unmatched.len()
    );
    Ok((matched, unmatched))
}

/// Converts a CSV file and writes the result as pretty-printed JSON — a
/// single object for one character, an array otherwise.
pub fn csv_to_json_file(csv_path: &Path, json_path: &Path) -> Result<(), ImportError> {
    let characters = convert_csv(csv_path)?;
    let value = if characters.len() == 1 {
        Value::Object(characters.into_iter().next().unwrap_or_default())
    } else {
        Value::Array(characters.into_iter().map(Value::Object).collect())
    };
    write_output(json_path, &serde_json::to_string_pretty(&value).unwrap_or_default())?;
    info!("Saved JSON to: {}", json_path.display());
    Ok(())
}

/// Converts a CSV file and writes one JSON object per line.
pub fn csv_to_jsonl_file(csv_path: &Path, jsonl_path: &Path) -> Result<(), ImportError> {
    let characters = convert_csv(csv_path)?;
    let mut lines = String::new();
    for character in &characters {
        lines.push_str(&serde_json::to_string(character).unwrap_or_default());
        lines.push('\n');
    }
    write_output(jsonl_path, &lines)?;
    info!("Saved JSONL to: {}", jsonl_path.display());
    Ok(())
}

fn write_output(path: &Path, contents: &str) -> Result<(), ImportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| ImportError::Unreadable {
                path: parent.display().to_string(),
                source,
            })?;
        }
    }
    fs::write(path, contents).map_err(|source| ImportError::Unreadable {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn csv_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    #[test]
    fn test_convert_basic_row_nests_by_section() {
        let file = csv_file(
            "Name,Eye Color,Occupation\n\
             Bram,green,blacksmith\n",
        );
        let characters = convert_csv(file.path()).unwrap();
        assert_eq!(characters.len(), 1);
        let c = &characters[0];
        assert_eq!(c["Demographics"]["name"], "Bram");
        assert_eq!(c["Demographics"]["occupation"], "blacksmith");
        assert_eq!(c["Physical Appearance"]["eye color"], "green");
    }

    #[test]
    fn test_convert_drops_empty_cells() {
        let file = csv_file(
            "Name,Hobbies\n\
             Bram,\n",
        );
        let characters = convert_csv(file.path()).unwrap();
        assert!(characters[0].get("Psychological Traits").is_none());
    }

    #[test]
    fn test_convert_unmatched_columns_dropped_row_survives() {
        let file = csv_file(
            "Name,Not A Field\n\
             Bram,whatever\n",
        );
        let characters = convert_csv(file.path()).unwrap();
        assert_eq!(characters[0].keys().collect::<Vec<_>>(), ["Demographics"]);
    }

    #[test]
    fn test_convert_json_output_coercion() {
        let file = csv_file(
            "Name,json_output\n\
             Bram,YES\n\
             Zara,0\n\
             Nix,maybe\n",
        );
        let characters = convert_csv(file.path()).unwrap();
        assert_eq!(characters[0]["metadata"]["json_output"], Value::Bool(true));
        assert_eq!(characters[1]["metadata"]["json_output"], Value::Bool(false));
        // Unrecognized boolean-like text passes through for later detection.
        assert_eq!(characters[2]["metadata"]["json_output"], "maybe");
    }

    #[test]
    fn test_convert_rejects_non_csv_suffix() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "Name\nBram\n").unwrap();
        assert!(matches!(
            convert_csv(file.path()),
            Err(ImportError::NotTabular(_))
        ));
    }

    #[test]
    fn test_convert_missing_file_unreadable() {
        assert!(matches!(
            convert_csv(Path::new("/no/such/file.csv")),
            Err(ImportError::Unreadable { .. })
        ));
    }

    #[test]
    fn test_convert_no_data_rows_is_empty_input() {
        let file = csv_file("Name,Age\n");
        assert!(matches!(convert_csv(file.path()), Err(ImportError::EmptyInput)));
    }

    #[test]
    fn test_convert_all_empty_rows_is_empty_input() {
        let file = csv_file("Name,Age\n,\n,\n");
        assert!(matches!(convert_csv(file.path()), Err(ImportError::EmptyInput)));
    }

    #[test]
    fn test_validate_columns_reports_both_lists() {
        let file = csv_file("Name,Eye Color,Bogus\nBram,green,x\n");
        let (matched, unmatched) = validate_columns(file.path()).unwrap();
        assert_eq!(matched, ["Name", "Eye Color"]);
        assert_eq!(unmatched, ["Bogus"]);
    }

    #[test]
    fn test_csv_to_json_file_single_object() {
        let file = csv_file("Name\nBram\n");
        let out = tempfile::tempdir().unwrap();
        let json_path = out.path().join("one.json");
        csv_to_json_file(file.path(), &json_path).unwrap();
        let value: Value = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert!(value.is_object());
        assert_eq!(value["Demographics"]["name"], "Bram");
    }

    #[test]
    fn test_csv_to_json_file_multiple_rows_array() {
        let file = csv_file("Name\nBram\nZara\n");
        let out = tempfile::tempdir().unwrap();
        let json_path = out.path().join("many.json");
        csv_to_json_file(file.path(), &json_path).unwrap();
        let value: Value = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_csv_to_jsonl_file_one_line_per_character() {
        let file = csv_file("Name\nBram\nZara\n");
        let out = tempfile::tempdir().unwrap();
        let jsonl_path = out.path().join("many.jsonl");
        csv_to_jsonl_file(file.path(), &jsonl_path).unwrap();
        let contents = fs::read_to_string(&jsonl_path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        for line in contents.lines() {
            let value: Value = serde_json::from_str(line).unwrap();
            assert!(value.is_object());
        }
    }

    #[test]
    fn test_importer_then_validator_round_trip() {
        let file = csv_file(
            "Name,Sex/Gender,Age,Ethnicity,Occupation,Eye Color\n\
             Bram,male,adult,Human,blacksmith,green\n",
        );
        let characters = convert_csv(file.path()).unwrap();
        let record =
            crate::character::validate_record(&Value::Object(characters[0].clone())).unwrap();
        assert_eq!(record.name, "Bram");
        assert_eq!(record.sex_gender, "male");
        assert_eq!(record.age, "adult");
        assert_eq!(record.ethnicity, "Human");
        assert_eq!(record.occupation, "blacksmith");
        assert_eq!(record.sections.len(), 1);
        assert_eq!(record.sections[0].name, "Physical Appearance");
    }

    #[test]
    fn test_importer_missing_mandatory_column_fails_validation() {
        let file = csv_file(
            "Name,Sex/Gender,Age,Ethnicity\n\
             Bram,male,adult,Human\n",
        );
        let characters = convert_csv(file.path()).unwrap();
        let err = crate::character::validate_record(&Value::Object(characters[0].clone()))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing mandatory field: Character occupation"
        );
    }

    #[test]
    fn test_importer_row_without_mandatory_columns_reports_name_first() {
        let file = csv_file(
            "Not A Field,Hobbies\n\
             x,whittling\n",
        );
        let characters = convert_csv(file.path()).unwrap();
        let err = crate::character::validate_record(&Value::Object(characters[0].clone()))
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing mandatory field: Character name");
    }

    #[test]
    fn test_importer_row_with_only_unknown_columns_is_empty_input() {
        let file = csv_file(
            "Not A Field,Also Bogus\n\
             x,y\n",
        );
        assert!(matches!(convert_csv(file.path()), Err(ImportError::EmptyInput)));
    }
}
