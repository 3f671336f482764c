//! Mechanical enhancement — validates a D&D profile against the closed
//! catalogs, then asks the Text Generator to layer mechanics onto an
//! already-generated character.
//!
//! Catalog violations reject before any generator call. The level bound
//! (1–20) is different: out-of-range levels are warned about and used
//! as-is, so an unusual campaign level never blocks generation.

use thiserror::Error;
use tracing::{info, warn};

use crate::character::model::DndProfile;
use crate::dnd::catalogs::{is_valid_class, is_valid_species, is_valid_subclass};
use crate::dnd::prompts::{ENHANCEMENT_PROMPT_TEMPLATE, SUBCLASS_ENHANCEMENT_PROMPT_TEMPLATE};
use crate::llm_client::{LlmError, TextGenerator};

/// Sampling temperature for the enhancement pass.
pub const ENHANCEMENT_TEMPERATURE: f32 = 0.8;
/// Token budget for the enhancement pass.
pub const ENHANCEMENT_MAX_OUTPUT_TOKENS: u32 = 3000;

#[derive(Debug, Error)]
pub enum EnhanceError {
    #[error("invalid species: {0}")]
    InvalidSpecies(String),

    #[error("invalid class: {0}")]
    InvalidClass(String),

    #[error("invalid subclass {subclass:?} for class {class:?}")]
    InvalidSubclass { class: String, subclass: String },

    #[error("enhancement generation failed: {0}")]
    Generator(#[from] LlmError),
}

/// Builds the enhancement prompt for a validated profile. The subclass
/// variant adds subclass-feature detail and roleplay-integration
/// instructions.
pub fn build_enhancement_prompt(base_character: &str, profile: &DndProfile) -> String {
    let template = match &profile.subclass {
        Some(_) => SUBCLASS_ENHANCEMENT_PROMPT_TEMPLATE,
        None => ENHANCEMENT_PROMPT_TEMPLATE,
    };
    let mut prompt = template
        .replace("{base_character}", base_character)
        .replace("{species}", &profile.species)
        .replace("{class}", &profile.class_name)
        .replace("{level}", &profile.level.to_string());
    if let Some(subclass) = &profile.subclass {
        prompt = prompt.replace("{subclass}", subclass);
    }
    prompt
}

/// Validates the profile and generates the enhanced character text.
///
/// The generator's raw output is returned verbatim — no check that the
/// requested sections actually appear in it.
pub async fn enhance(
    generator: &dyn TextGenerator,
    base_character: &str,
    profile: &DndProfile,
) -> Result<String, EnhanceError> {
    if !is_valid_species(&profile.species) {
        return Err(EnhanceError::InvalidSpecies(profile.species.clone()));
    }
    if !is_valid_class(&profile.class_name) {
        return Err(EnhanceError::InvalidClass(profile.class_name.clone()));
    }
    if let Some(subclass) = &profile.subclass {
        if !is_valid_subclass(&profile.class_name, subclass) {
            return Err(EnhanceError::InvalidSubclass {
                class: profile.class_name.clone(),
                subclass: subclass.clone(),
            });
        }
    }

    if !(1..=20).contains(&profile.level) {
        warn!("Level should be between 1-20, got {}", profile.level);
    }

    info!(
        "Generating D&D enhancement: {} {} (level {})",
        profile.species, profile.class_name, profile.level
    );

    let prompt = build_enhancement_prompt(base_character, profile);
    let enhanced = generator
        .generate(&prompt, ENHANCEMENT_TEMPERATURE, ENHANCEMENT_MAX_OUTPUT_TOKENS)
        .await?;
    Ok(enhanced)
}
