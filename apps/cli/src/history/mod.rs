// Append-only history of character generations: a flat CSV summary for
// quick scanning and a JSONL archive carrying the full AI output.

pub mod csv_tracker;
pub mod json_tracker;

use thiserror::Error;

pub use csv_tracker::{append_summary_record, SummaryRecord};
pub use json_tracker::{
    append_archive_record, export_characters, get_character_by_name, list_characters,
    ArchiveInputs, ArchiveMetadata, ArchiveRecord, CharacterSummary, GeneratedOutput,
};

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history file error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("history CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("history JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
