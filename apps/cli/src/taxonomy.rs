//! Template taxonomy — the fixed registry of sections and field names that
//! every input source (CSV columns, JSON keys) is matched against.
//!
//! The tables are static and never mutated at runtime. Declaration order is
//! load-bearing: field matching scans sections in order and the first match
//! wins, so duplicate field names ("other notes" appears in every section)
//! resolve to the earliest-declared section.

/// One named section of the character template and its field names.
///
/// Field names are stored lowercase with spaces, exactly as they appear in
/// the template document.
#[derive(Debug, Clone, Copy)]
pub struct Section {
    pub name: &'static str,
    pub fields: &'static [&'static str],
}

/// Fields every character must supply, in enumeration order, paired with the
/// human-readable description used in validation errors.
///
/// A mandatory field may live at the top level of an input object or nested
/// inside any section — the validator flattens before checking.
pub const MANDATORY_FIELDS: &[(&str, &str)] = &[
    ("name", "Character name"),
    ("ethnicity", "Character ethnicity"),
    ("sex/gender", "Character sex/gender"),
    ("age", "Character age"),
    ("occupation", "Character occupation"),
];

/// Non-template directives recognized in input sources.
pub const METADATA_FIELDS: &[&str] = &["new_doc_title", "json_output"];

/// All template sections in declaration order. "High-Level Overview" is a
/// header-only section with no fields of its own.
pub const TEMPLATE_SECTIONS: &[Section] = &[
    Section {
        name: "High-Level Overview",
        fields: &[],
    },
    Section {
        name: "Demographics",
        fields: &[
            "name",
            "titles",
            "age",
            "sex/gender",
            "pronouns",
            "ethnicity",
            "occupation",
            "socioeconomic status",
            "education",
            "other notes",
        ],
    },
    Section {
        name: "Physical Appearance",
        fields: &[
            "eye color",
            "skin color",
            "hair color",
            "height",
            "weight",
            "body type",
            "fitness level",
            "tattoos",
            "scars/birthmarks",
            "other distinguishing features",
            "disabilities",
            "fashion style",
            "accessories",
            "cleanliness/grooming",
            "posture/gait",
            "tics",
            "coordination (or lack thereof)",
            "weaknesses",
            "other notes",
        ],
    },
    Section {
        name: "History",
        fields: &[
            "birth date",
            "place of birth",
            "key family members",
            "notable family events/milestones",
            "notable personal events/milestones",
            "criminal record",
            "affiliations",
            "allies",
            "enemies",
            "skeletons in the closet",
            "other historical notes",
        ],
    },
    Section {
        name: "Psychological Traits",
        fields: &[
            "personality type",
            "personality traits",
            "temperament",
            "introvert/extrovert",
            "mannerisms",
            "educational background",
            "intelligence",
            "self-esteem",
            "hobbies",
            "skills/talents",
            "loves",
            "morals/virtues",
            "phobias/fears",
            "angered by",
            "pet peeves",
            "obsessed with",
            "routines",
            "bad habits",
            "desires",
            "flaws",
            "quirks",
            "favorite sayings",
            "disabilities",
            "secrets",
            "regrets",
            "accomplishments",
            "memories",
            "other notes",
        ],
    },
    Section {
        name: "Communication",
        fields: &[
            "languages known",
            "preferred communication methods",
            "accent",
            "style and pacing of speech",
            "pitch",
            "laughter",
            "smile",
            "use of gestures",
            "facial expressions",
            "verbal expressions",
            "other notes",
        ],
    },
    Section {
        name: "Strengths, Weaknesses, and Abilities",
        fields: &[
            "physical strengths",
            "physical weaknesses",
            "intellectual strengths",
            "intellectual weaknesses",
            "interpersonal strengths",
            "interpersonal weaknesses",
            "physical abilities",
            "magical abilities",
            "physical illnesses/conditions",
            "mental illnesses/conditions",
            "other notes",
        ],
    },
    Section {
        name: "Relationships",
        fields: &[
            "partner(s)significant other(s)",
            "lover(s)",
            "parents/guardians",
            "children",
            "grandparents",
            "grandchildren",
            "family",
            "pets",
            "best friends",
            "friends",
            "rivals",
            "enemies",
            "colleagues",
            "mentors/teachers",
            "idols/role models",
            "followers",
            "strangers",
            "non-living things",
            "clubs/memberships",
            "social media presence",
            "public perception of them",
            "other notes",
        ],
    },
    Section {
        name: "Character Growth",
        fields: &[
            "character archetype",
            "character arc",
            "core values",
            "internal conflicts",
            "external conflicts",
            "goals",
            "motivations",
            "epiphanies",
            "significant events/plot points",
            "other notes",
        ],
    },
];

/// Where an external field label landed in the taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMatch {
    /// One of the recognized non-template directives.
    Metadata(&'static str),
    /// A template field under a named section.
    Section {
        section: &'static str,
        field: &'static str,
    },
}

/// Normalizes a field label for matching: lowercase, trimmed, internal
/// whitespace runs collapsed to a single underscore.
pub fn normalize_field_name(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Normalizes a key to the lowercase-with-spaces form used by the record
/// validator (the inverse convention of [`normalize_field_name`]).
pub fn normalize_for_lookup(key: &str) -> String {
    key.trim().to_lowercase().replace('_', " ")
}

/// Finds the template field matching an external label, if any.
///
/// Metadata fields are checked first, then sections in declaration order.
/// Returns the first match; labels duplicated across sections resolve to
/// the earliest section.
pub fn find_matching_field(label: &str) -> Option<FieldMatch> {
    let normalized = normalize_field_name(label);

    for meta_field in METADATA_FIELDS {
        if normalize_field_name(meta_field) == normalized {
            return Some(FieldMatch::Metadata(meta_field));
        }
    }

    for section in TEMPLATE_SECTIONS {
        for field in section.fields {
            if normalize_field_name(field) == normalized {
                return Some(FieldMatch::Section {
                    section: section.name,
                    field,
                });
            }
        }
    }

    None
}

/// Whether a top-level input key is one of the known section names.
pub fn is_section_name(key: &str) -> bool {
    TEMPLATE_SECTIONS.iter().any(|s| s.name == key)
}

/// Whether a normalized (lowercase-with-spaces) key names a mandatory field.
pub fn is_mandatory_field(normalized_key: &str) -> bool {
    MANDATORY_FIELDS
        .iter()
        .any(|(key, _)| key.eq_ignore_ascii_case(normalized_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases_and_underscores() {
        assert_eq!(normalize_field_name("Eye Color"), "eye_color");
        assert_eq!(normalize_field_name("  Skin   Color "), "skin_color");
        assert_eq!(normalize_field_name("sex/gender"), "sex/gender");
    }

    #[test]
    fn test_normalize_for_lookup_reverses_underscores() {
        assert_eq!(normalize_for_lookup("Eye_Color"), "eye color");
        assert_eq!(normalize_for_lookup("NAME"), "name");
    }

    #[test]
    fn test_find_metadata_field() {
        assert_eq!(
            find_matching_field("New_Doc_Title"),
            Some(FieldMatch::Metadata("new_doc_title"))
        );
        assert_eq!(
            find_matching_field("json output"),
            Some(FieldMatch::Metadata("json_output"))
        );
    }

    #[test]
    fn test_find_section_field() {
        assert_eq!(
            find_matching_field("Eye Color"),
            Some(FieldMatch::Section {
                section: "Physical Appearance",
                field: "eye color",
            })
        );
    }

    #[test]
    fn test_mandatory_field_matches_demographics() {
        assert_eq!(
            find_matching_field("Name"),
            Some(FieldMatch::Section {
                section: "Demographics",
                field: "name",
            })
        );
    }

    #[test]
    fn test_duplicate_field_resolves_to_earliest_section() {
        // "other notes" exists in every section; Demographics is declared first
        // among sections that carry it.
        assert_eq!(
            find_matching_field("Other Notes"),
            Some(FieldMatch::Section {
                section: "Demographics",
                field: "other notes",
            })
        );
        // "enemies" appears in History before Relationships.
        assert_eq!(
            find_matching_field("enemies"),
            Some(FieldMatch::Section {
                section: "History",
                field: "enemies",
            })
        );
    }

    #[test]
    fn test_unknown_label_returns_none() {
        assert_eq!(find_matching_field("Not A Field"), None);
        assert_eq!(find_matching_field(""), None);
    }

    #[test]
    fn test_case_and_spacing_invariance_over_all_fields() {
        for section in TEMPLATE_SECTIONS {
            for field in section.fields {
                let shouted = field.to_uppercase().replace(' ', "  ");
                assert_eq!(
                    find_matching_field(&shouted),
                    find_matching_field(field),
                    "case/spacing variant of {field:?} must match identically"
                );
            }
        }
    }

    #[test]
    fn test_fields_unique_within_each_section() {
        for section in TEMPLATE_SECTIONS {
            let mut seen = std::collections::HashSet::new();
            for field in section.fields {
                assert!(
                    seen.insert(normalize_field_name(field)),
                    "duplicate field {field:?} in section {:?}",
                    section.name
                );
            }
        }
    }

    #[test]
    fn test_mandatory_enumeration_order() {
        let keys: Vec<&str> = MANDATORY_FIELDS.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, ["name", "ethnicity", "sex/gender", "age", "occupation"]);
    }

    #[test]
    fn test_high_level_overview_is_header_only() {
        let overview = TEMPLATE_SECTIONS
            .iter()
            .find(|s| s.name == "High-Level Overview")
            .unwrap();
        assert!(overview.fields.is_empty());
    }
}
