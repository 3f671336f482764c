//! Prompt constants and builders for base character generation.
//!
//! Two variants: free-text output (the template filled in place) and
//! schema-constrained JSON output (shape derived from the template text).

use crate::character::model::CanonicalRecord;
use crate::template::extract_template_schema;

/// Sampling temperature for base character generation.
pub const BASE_TEMPERATURE: f32 = 0.7;
/// Token budget for base character generation.
pub const BASE_MAX_OUTPUT_TOKENS: u32 = 2048;

/// Free-text prompt. Replace: {name}, {sex}, {gender}, {age_range},
/// {occupation}, {ethnicity}, {optional_details}, {template_text}.
const CHARACTER_PROMPT_TEMPLATE: &str = r#"You are a creative character development assistant. Fill in the following character template by replacing all placeholder fields with realistic and interesting details based on the provided inputs. Maintain creative consistency and make the character vivid and memorable.

CHARACTER INPUTS:
- Name: {name}
- Sex: {sex}
- Gender Identity: {gender}
- Age Range: {age_range}
- Occupation: {occupation}
- Ethnicity: {ethnicity}

{optional_details}TEMPLATE TO FILL:
---START TEMPLATE---
{template_text}
---END TEMPLATE---

Instructions:
1. Replace all {{NAME}}, {{SEX}}, {{GENDER}}, {{AGE_RANGE}}, {{OCCUPATION}} with the provided values
2. Fill in any other blank sections with creative and consistent character details
3. Make the character's background, personality, and traits coherent
4. Output ONLY the completed character profile, nothing else
"#;

/// JSON-mode prompt. Same inputs plus {schema}, the required output shape.
const JSON_CHARACTER_PROMPT_TEMPLATE: &str = r#"You are a creative character development assistant. Fill in the following character template by replacing all placeholder fields with realistic and interesting details based on the provided inputs. Maintain creative consistency and make the character vivid and memorable.

CHARACTER INPUTS:
- Name: {name}
- Sex: {sex}
- Gender Identity: {gender}
- Age Range: {age_range}
- Occupation: {occupation}
- Ethnicity: {ethnicity}

{optional_details}TEMPLATE TO FILL:
---START TEMPLATE---
{template_text}
---END TEMPLATE---

REQUIRED JSON OUTPUT STRUCTURE:
{schema}

Instructions:
1. Fill in all placeholder fields ({{NAME}}, {{SEX}}, {{GENDER}}, {{AGE_RANGE}}, {{OCCUPATION}}) with provided values
2. Fill in all empty sections with creative and consistent character details
3. Make the character's background, personality, and traits coherent
4. Output ONLY valid JSON matching the structure above, nothing else
5. Ensure all strings are properly escaped and the JSON is valid
"#;

/// Builds the free-text generation prompt for one character.
pub fn build_character_prompt(template_text: &str, record: &CanonicalRecord) -> String {
    fill_common(CHARACTER_PROMPT_TEMPLATE, template_text, record)
}

/// Builds the JSON-mode generation prompt, embedding the schema skeleton
/// derived from the template text.
pub fn build_json_character_prompt(template_text: &str, record: &CanonicalRecord) -> String {
    fill_common(JSON_CHARACTER_PROMPT_TEMPLATE, template_text, record)
        .replace("{schema}", &extract_template_schema(template_text))
}

fn fill_common(template: &str, template_text: &str, record: &CanonicalRecord) -> String {
    let inputs = record.inputs();
    let bullets = record.optional_fields_bullets();
    let optional_details = if bullets.is_empty() {
        String::new()
    } else {
        format!("OPTIONAL DETAILS (stay consistent with these):\n{bullets}\n\n")
    };

    template
        .replace("{name}", &inputs.name)
        .replace("{sex}", &inputs.sex)
        .replace("{gender}", &inputs.gender)
        .replace("{age_range}", &inputs.age_range)
        .replace("{occupation}", &inputs.occupation)
        .replace("{ethnicity}", &inputs.ethnicity)
        .replace("{optional_details}", &optional_details)
        .replace("{template_text}", template_text)
}
