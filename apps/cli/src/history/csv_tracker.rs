//! CSV summary history — one flat row per generation.
//!
//! The header is written once, the first time the file is created. Absent
//! optional values serialize as empty strings. Appends assume a single
//! process instance; there is no file locking.

use std::fs::OpenOptions;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::character::model::{CharacterInputs, DndProfile};
use crate::history::HistoryError;

/// Fixed 11-column summary schema.
const SUMMARY_HEADER: &[&str] = &[
    "name",
    "sex",
    "gender",
    "age_range",
    "occupation",
    "species",
    "class",
    "subclass",
    "level",
    "doc_url",
    "created_at",
];

/// One generation, projected to the flat summary shape.
#[derive(Debug, Clone)]
pub struct SummaryRecord {
    pub inputs: CharacterInputs,
    pub dnd: Option<DndProfile>,
    pub doc_url: String,
    pub created_at: DateTime<Utc>,
}

impl SummaryRecord {
    fn to_row(&self) -> Vec<String> {
        let (species, class_name, subclass, level) = match &self.dnd {
            Some(dnd) => (
                dnd.species.clone(),
                dnd.class_name.clone(),
                dnd.subclass.clone().unwrap_or_default(),
                dnd.level.to_string(),
            ),
            None => Default::default(),
        };

        vec![
            self.inputs.name.clone(),
            self.inputs.sex.clone(),
            self.inputs.gender.clone(),
            self.inputs.age_range.clone(),
            self.inputs.occupation.clone(),
            species,
            class_name,
            subclass,
            level,
            self.doc_url.clone(),
            self.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        ]
    }
}

/// Appends one summary row, writing the header first when the file is new.
pub fn append_summary_record(csv_path: &Path, record: &SummaryRecord) -> Result<(), HistoryError> {
    let exists = csv_path.exists();

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)
        .map_err(|source| HistoryError::Io {
            path: csv_path.display().to_string(),
            source,
        })?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    if !exists {
        writer.write_record(SUMMARY_HEADER)?;
    }
    writer.write_record(record.to_row())?;
    writer.flush().map_err(|source| HistoryError::Io {
        path: csv_path.display().to_string(),
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(dnd: Option<DndProfile>) -> SummaryRecord {
        SummaryRecord {
            inputs: CharacterInputs {
                name: "Bram".to_string(),
                sex: "male".to_string(),
                gender: "he/him".to_string(),
                age_range: "adult".to_string(),
                occupation: "blacksmith".to_string(),
                ethnicity: "Human".to_string(),
            },
            dnd,
            doc_url: "https://docs.google.com/document/d/abc/edit".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_first_append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("characters.csv");
        append_summary_record(&path, &record(None)).unwrap();
        append_summary_record(&path, &record(None)).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "name,sex,gender,age_range,occupation,species,class,subclass,level,doc_url,created_at"
        );
    }

    #[test]
    fn test_row_without_dnd_serializes_empty_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("characters.csv");
        append_summary_record(&path, &record(None)).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let row = contents.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "Bram,male,he/him,adult,blacksmith,,,,,https://docs.google.com/document/d/abc/edit,2024-03-09T12:00:00Z"
        );
    }

    #[test]
    fn test_row_with_dnd_fills_mechanical_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("characters.csv");
        append_summary_record(
            &path,
            &record(Some(DndProfile {
                species: "Human".to_string(),
                class_name: "Fighter".to_string(),
                subclass: Some("Champion".to_string()),
                level: 5,
            })),
        )
        .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let row = contents.lines().nth(1).unwrap();
        assert!(row.contains("Human,Fighter,Champion,5,"));
    }

    #[test]
    fn test_created_at_is_iso8601_utc() {
        let row = record(None).to_row();
        assert_eq!(row.last().unwrap(), "2024-03-09T12:00:00Z");
    }
}
