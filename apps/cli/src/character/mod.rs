// Character ingestion: JSON/JSONL loading, record validation, and the
// canonical record model every downstream step consumes.

pub mod input;
pub mod model;

pub use input::{load_character_file, load_json_file, load_jsonl_file, validate_record};
pub use model::{CanonicalRecord, CharacterInputs, DndProfile, RecordMetadata, SectionBlock};
