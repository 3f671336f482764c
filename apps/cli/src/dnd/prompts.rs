//! Prompt constants for the mechanical enhancement pass.

/// Enhancement prompt without a subclass. Replace: {base_character},
/// {species}, {class}, {level}.
pub const ENHANCEMENT_PROMPT_TEMPLATE: &str = r#"You are a Dungeons & Dragons 5e character specialist. Your task is to enhance an existing character profile with D&D-specific details.

EXISTING CHARACTER PROFILE:
---
{base_character}
---

D&D 5e DETAILS:
- Species: {species}
- Class: {class}
- Level: {level}

ENHANCEMENT REQUIREMENTS:
1. Add a 'D&D Profile' section with:
   - Class Features (appropriate for level)
   - Species Traits (inherent abilities)
   - Ability Scores breakdown (STR, DEX, CON, INT, WIS, CHA)
   - Hit Points (with CON modifier calculation)
   - Skills & Proficiencies (tied to class)
   - Equipment (starting or level-appropriate)
   - Suggested Background hooks tied to character background
2. Maintain consistency with the existing character personality and background
3. Make mechanical choices align with the character concept
4. Include roleplay notes for how species/class traits manifest in their personality

OUTPUT:
Provide the full enhanced character profile with the new D&D section integrated naturally. Output ONLY the complete character profile with D&D enhancements, nothing else."#;

/// Enhancement prompt with a subclass. Replace: {base_character}, {species},
/// {class}, {subclass}, {level}.
pub const SUBCLASS_ENHANCEMENT_PROMPT_TEMPLATE: &str = r#"You are a Dungeons & Dragons 5e character specialist. Your task is to enhance an existing character profile with D&D-specific details, including its subclass identity.

EXISTING CHARACTER PROFILE:
---
{base_character}
---

D&D 5e DETAILS:
- Species: {species}
- Class: {class}
- Subclass: {subclass}
- Level: {level}

ENHANCEMENT REQUIREMENTS:
1. Add a 'D&D Profile' section with:
   - Class Features (appropriate for level)
   - Subclass Features (detail every {subclass} feature available at this level)
   - Species Traits (inherent abilities)
   - Ability Scores breakdown (STR, DEX, CON, INT, WIS, CHA)
   - Hit Points (with CON modifier calculation)
   - Skills & Proficiencies (tied to class and subclass)
   - Equipment (starting or level-appropriate)
   - Suggested Background hooks tied to character background
2. Maintain consistency with the existing character personality and background
3. Make mechanical choices align with the character concept
4. Weave the subclass identity into the character's story: explain how they came to follow this path and how its features surface in everyday roleplay
5. Include roleplay notes for how species/class traits manifest in their personality

OUTPUT:
Provide the full enhanced character profile with the new D&D section integrated naturally. Output ONLY the complete character profile with D&D enhancements, nothing else."#;
