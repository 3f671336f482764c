//! Closed catalogs of valid D&D 5e species, classes, and subclasses.
//!
//! Entries are canonical-cased and membership tests are exact: validation
//! is case-sensitive by design, since these values come from controlled
//! vocabularies, not free text.

/// Playable species.
pub const SPECIES: &[&str] = &[
    "Human",
    "Elf",
    "High Elf",
    "Wood Elf",
    "Drow",
    "Dwarf",
    "Hill Dwarf",
    "Mountain Dwarf",
    "Halfling",
    "Lightfoot Halfling",
    "Stout Halfling",
    "Dragonborn",
    "Gnome",
    "Forest Gnome",
    "Rock Gnome",
    "Half-Elf",
    "Half-Orc",
    "Tiefling",
    "Orc",
    "Goblin",
    "Hobgoblin",
    "Bugbear",
    "Kenku",
    "Tabaxi",
    "Aasimar",
    "Genasi",
    "Goliath",
    "Firbolg",
    "Lizardfolk",
    "Tortle",
];

/// Character classes.
pub const CLASSES: &[&str] = &[
    "Barbarian",
    "Bard",
    "Cleric",
    "Druid",
    "Fighter",
    "Monk",
    "Paladin",
    "Ranger",
    "Rogue",
    "Sorcerer",
    "Warlock",
    "Wizard",
    "Artificer",
    "Blood Hunter",
];

/// Subclass options per class.
pub const SUBCLASSES: &[(&str, &[&str])] = &[
    (
        "Barbarian",
        &[
            "Berserker",
            "Wild Heart",
            "World Tree",
            "Zealot",
            "Ancestral Guardian",
            "Storm Herald",
        ],
    ),
    (
        "Bard",
        &[
            "Lore",
            "Valor",
            "Glamour",
            "Swords",
            "Whispers",
            "Creation",
            "Eloquence",
        ],
    ),
    (
        "Cleric",
        &[
            "Knowledge",
            "Life",
            "Light",
            "Nature",
            "Tempest",
            "Trickery",
            "War",
            "Death",
            "Forge",
            "Grave",
            "Order",
            "Peace",
            "Twilight",
            "Arcana",
        ],
    ),
    (
        "Druid",
        &["Land", "Moon", "Shepherd", "Spores", "Stars", "Wildfire"],
    ),
    (
        "Fighter",
        &[
            "Battle Master",
            "Champion",
            "Eldritch Knight",
            "Psi Warrior",
            "Rune Knight",
            "Samurai",
            "Cavalier",
            "Arcane Archer",
        ],
    ),
    (
        "Monk",
        &[
            "Open Hand",
            "Shadow",
            "Four Elements",
            "Mercy",
            "Astral Self",
            "Drunken Master",
            "Kensei",
        ],
    ),
    (
        "Paladin",
        &[
            "Devotion",
            "Ancients",
            "Vengeance",
            "Glory",
            "Crown",
            "Conquest",
            "Redemption",
        ],
    ),
    (
        "Ranger",
        &[
            "Hunter",
            "Beast Master",
            "Gloom Stalker",
            "Fey Wanderer",
            "Horizon Walker",
            "Monster Slayer",
            "Swarmkeeper",
        ],
    ),
    (
        "Rogue",
        &[
            "Thief",
            "Assassin",
            "Arcane Trickster",
            "Swashbuckler",
            "Inquisitive",
            "Mastermind",
            "Phantom",
            "Scout",
            "Soulknife",
        ],
    ),
    (
        "Sorcerer",
        &[
            "Draconic",
            "Wild Magic",
            "Divine Soul",
            "Shadow Magic",
            "Storm Sorcery",
            "Aberrant Mind",
            "Clockwork Soul",
        ],
    ),
    (
        "Warlock",
        &[
            "Archfey",
            "Fiend",
            "Great Old One",
            "Celestial",
            "Hexblade",
            "Fathomless",
            "Genie",
            "Undead",
        ],
    ),
    (
        "Wizard",
        &[
            "Abjuration",
            "Conjuration",
            "Divination",
            "Enchantment",
            "Evocation",
            "Illusion",
            "Necromancy",
            "Transmutation",
            "Bladesinging",
            "War Magic",
            "Scribes",
        ],
    ),
    (
        "Artificer",
        &[
            "Alchemist",
            "Armorer",
            "Artillerist",
            "Battle Smith",
            "Cartographer",
        ],
    ),
    (
        "Blood Hunter",
        &["Ghostslayer", "Lycan", "Mutant", "Profane Soul", "Hollow"],
    ),
];

pub fn is_valid_species(species: &str) -> bool {
    SPECIES.contains(&species)
}

pub fn is_valid_class(class_name: &str) -> bool {
    CLASSES.contains(&class_name)
}

/// False when the class itself is unknown or has no subclass list.
pub fn is_valid_subclass(class_name: &str, subclass: &str) -> bool {
    subclasses_for(class_name)
        .map(|options| options.contains(&subclass))
        .unwrap_or(false)
}

/// The subclass options registered for a class, if any.
pub fn subclasses_for(class_name: &str) -> Option<&'static [&'static str]> {
    SUBCLASSES
        .iter()
        .find(|(class, _)| *class == class_name)
        .map(|(_, options)| *options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_sizes() {
        assert_eq!(SPECIES.len(), 30);
        assert_eq!(CLASSES.len(), 14);
        for (class, options) in SUBCLASSES {
            assert!(
                (5..=14).contains(&options.len()),
                "{class} has {} subclasses",
                options.len()
            );
        }
    }

    #[test]
    fn test_every_class_has_subclasses() {
        for class in CLASSES {
            assert!(subclasses_for(class).is_some(), "{class} missing subclasses");
        }
    }

    #[test]
    fn test_species_membership_is_case_sensitive() {
        assert!(is_valid_species("Human"));
        assert!(!is_valid_species("human"));
        assert!(!is_valid_species("Vampire"));
    }

    #[test]
    fn test_class_membership() {
        assert!(is_valid_class("Wizard"));
        assert!(is_valid_class("Blood Hunter"));
        assert!(!is_valid_class("Necromancer"));
    }

    #[test]
    fn test_subclass_membership() {
        assert!(is_valid_subclass("Wizard", "Evocation"));
        assert!(!is_valid_subclass("Wizard", "Berserker"));
        assert!(!is_valid_subclass("UnknownClass", "Anything"));
    }

    #[test]
    fn test_subclass_belongs_to_its_own_class() {
        assert!(is_valid_subclass("Barbarian", "Berserker"));
        assert!(!is_valid_subclass("Barbarian", "Evocation"));
    }
}
