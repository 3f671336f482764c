//! Template structure parsing — derives a section→field skeleton from the
//! fetched template text, used to constrain JSON-mode generation and to
//! merge generator output back into a full structure.

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::character::model::value_as_text;

/// The hierarchical shape detected in a template document.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateSkeleton {
    pub sections: Vec<TemplateSection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateSection {
    pub name: String,
    pub fields: Vec<String>,
}

impl TemplateSkeleton {
    /// The skeleton as a JSON object with null leaves, ready for merging
    /// generator output into.
    pub fn to_value(&self) -> Value {
        let mut root = Map::new();
        for section in &self.sections {
            let mut block = Map::new();
            for field in &section.fields {
                block.insert(field.clone(), Value::Null);
            }
            root.insert(section.name.clone(), Value::Object(block));
        }
        Value::Object(root)
    }
}

/// Parses template text into a skeleton.
///
/// Lines starting with `###` open a section (markdown stripped, trailing
/// colon removed). Inside a section, `**Label:**` spans and `- Label: ...`
/// bullets register fields. A bullet label starting with `[` is a literal
/// placeholder example, not a field.
pub fn parse_template_structure(template_text: &str) -> TemplateSkeleton {
    let mut sections: Vec<TemplateSection> = Vec::new();

    debug!(
        "Parsing template structure from {} lines",
        template_text.lines().count()
    );

    for line in template_text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with("###") {
            let name = line
                .replace('#', "")
                .trim()
                .trim_end_matches(':')
                .to_string();
            debug!("Found section: {name}");
            sections.push(TemplateSection {
                name,
                fields: Vec::new(),
            });
            continue;
        }

        let Some(current) = sections.last_mut() else {
            continue;
        };

        if let Some(rest) = line.strip_prefix("**") {
            // **Label:** — the label is whatever sits inside the bold span.
            if let Some(end) = rest.find("**") {
                let field = rest[..end].trim_end_matches(':').trim();
                if !field.is_empty() {
                    debug!("  Found field: {field}");
                    current.fields.push(field.to_string());
                }
            }
        } else if line.starts_with("- ") || line.starts_with("* ") {
            let text = line.trim_start_matches(['-', '*', ' ']);
            let field = match text.split_once(':') {
                Some((label, _)) => label.trim(),
                None => text.trim(),
            };
            if !field.is_empty() && !field.starts_with('[') {
                debug!("  Found field: {field}");
                current.fields.push(field.to_string());
            }
        }
    }

    info!("Parsed template into {} sections", sections.len());
    TemplateSkeleton { sections }
}

/// Renders the skeleton as the required-output-shape block embedded in the
/// JSON-mode generation prompt.
pub fn extract_template_schema(template_text: &str) -> String {
    let skeleton = parse_template_structure(template_text);

    let mut schema = String::from("Output the character as a JSON object with this structure:\n{\n");
    for section in &skeleton.sections {
        schema.push_str(&format!("  \"{}\": {{\n", section.name));
        if !section.fields.is_empty() {
            let lines: Vec<String> = section
                .fields
                .iter()
                .map(|field| format!("    \"{field}\": \"[value]\""))
                .collect();
            schema.push_str(&lines.join(",\n"));
            schema.push('\n');
        }
        schema.push_str("  },\n");
    }
    let schema = schema.trim_end_matches(['\n', ',']).to_string();
    schema + "\n}"
}

/// Merges generator-filled data over the template skeleton. Sections present
/// in both are updated field-by-field; sections only in the filled data are
/// carried over whole.
pub fn merge_json_into_structure(base: &Value, filled: &Value) -> Value {
    let mut merged = base.as_object().cloned().unwrap_or_default();

    if let Some(filled) = filled.as_object() {
        for (section, fields) in filled {
            match (merged.get_mut(section), fields) {
                (Some(Value::Object(existing)), Value::Object(incoming)) => {
                    for (key, value) in incoming {
                        existing.insert(key.clone(), value.clone());
                    }
                }
                _ => {
                    merged.insert(section.clone(), fields.clone());
                }
            }
        }
    }

    Value::Object(merged)
}

/// Converts structured character JSON back to readable text for the
/// document sink: each section name underlined with `=`, fields as
/// `name: value` lines, non-object sections inline.
pub fn flatten_json_for_text(data: &Value) -> String {
    let mut text = String::new();
    let Some(object) = data.as_object() else {
        return text;
    };

    for (section, fields) in object {
        match fields {
            Value::Object(fields) => {
                text.push_str(&format!("\n{section}\n{}\n", "=".repeat(section.len())));
                for (field_name, field_value) in fields {
                    text.push_str(&format!("\n{field_name}: {}", value_as_text(field_value)));
                }
            }
            other => {
                text.push_str(&format!("\n{section}: {}", value_as_text(other)));
            }
        }
    }

    text
}
