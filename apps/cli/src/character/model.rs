//! Canonical character data model.
//!
//! A [`CanonicalRecord`] is constructed fresh per input row/object by the
//! record validator, is immutable afterwards, and is consumed once by the
//! generation pipeline. Nothing here is shared across characters.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Validated, normalized character data keyed by the fixed taxonomy.
///
/// The five mandatory fields are always present as scalar strings. A
/// `sex/gender` value supplied as a nested `{sex, gender}` object is folded
/// into the canonical `"sex|gender"` pipe encoding during validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    pub name: String,
    pub ethnicity: String,
    pub sex_gender: String,
    pub age: String,
    pub occupation: String,
    /// Optional section blocks in taxonomy declaration order. Sections with
    /// no matched optional fields are omitted entirely.
    pub sections: Vec<SectionBlock>,
    /// Uncatalogued top-level keys, preserved for the archive but excluded
    /// from prompts.
    pub extra: Vec<(String, Value)>,
    pub metadata: RecordMetadata,
}

/// One section's optional fields, keys normalized to lowercase-with-spaces.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionBlock {
    pub name: &'static str,
    pub fields: Vec<(String, Value)>,
}

/// Recognized non-template directives. Unknown metadata keys are dropped
/// during validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordMetadata {
    pub new_doc_title: Option<String>,
    pub json_output: Option<bool>,
}

/// The flat inputs embedded in prompts and history records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterInputs {
    pub name: String,
    pub sex: String,
    pub gender: String,
    pub age_range: String,
    pub occupation: String,
    pub ethnicity: String,
}

/// Optional tabletop attributes layered onto a generated character.
/// Validated against the closed catalogs in [`crate::dnd`] before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DndProfile {
    pub species: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub subclass: Option<String>,
    pub level: u32,
}

impl CanonicalRecord {
    /// Projects the mandatory fields into the flat shape used by prompt
    /// building and the history trackers.
    ///
    /// `sex/gender` splits on the first `|`: `"male|he/him"` yields sex
    /// `male` and gender `he/him`. Without a separator the whole value is
    /// the sex and gender stays empty.
    pub fn inputs(&self) -> CharacterInputs {
        let (sex, gender) = match self.sex_gender.split_once('|') {
            Some((sex, gender)) => (
                sex.trim().to_lowercase(),
                gender.trim().to_lowercase(),
            ),
            None => (self.sex_gender.trim().to_lowercase(), String::new()),
        };

        CharacterInputs {
            name: self.name.clone(),
            sex,
            gender,
            age_range: self.age.clone(),
            occupation: self.occupation.clone(),
            ethnicity: self.ethnicity.clone(),
        }
    }

    /// Renders the optional section fields as a flat bullet list for the
    /// generation prompt. Empty when no sections matched.
    pub fn optional_fields_bullets(&self) -> String {
        let mut lines = Vec::new();
        for section in &self.sections {
            for (field, value) in &section.fields {
                lines.push(format!("- {}: {}", field, value_as_text(value)));
            }
        }
        lines.join("\n")
    }
}

/// Renders a JSON value the way it should read inside a prompt: bare
/// strings unquoted, everything else in its JSON form.
pub fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
