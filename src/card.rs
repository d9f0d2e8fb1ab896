//! Catalog records and the closed attribute vocabularies used to index them.
//!
//! `RawCard` is the serde shape of one feed row; `Card` is the canonical
//! immutable record the engine works with after normalization. Attribute
//! dimensions with a bounded domain (formats, type buckets, rarities,
//! categories) are closed enums so downstream set algebra iterates a fixed,
//! type-checked list of keys instead of dynamically-keyed maps.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::color::{Color, ColorSet};
use crate::ids::CardId;

/// Set codes whose cards are treated as silly (un-sets and holiday promos).
pub const SILLY_SETS: [&str; 6] = ["ugl", "unh", "ust", "und", "unf", "hho"];

/// Tournament formats the engine knows how to filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Standard,
    Pioneer,
    Modern,
    Legacy,
    Vintage,
    Pauper,
    Commander,
    Brawl,
    Duel,
    Penny,
    Historic,
    Alchemy,
    Oathbreaker,
    Premodern,
    OldSchool,
}

impl Format {
    pub const ALL: [Format; 15] = [
        Format::Standard,
        Format::Pioneer,
        Format::Modern,
        Format::Legacy,
        Format::Vintage,
        Format::Pauper,
        Format::Commander,
        Format::Brawl,
        Format::Duel,
        Format::Penny,
        Format::Historic,
        Format::Alchemy,
        Format::Oathbreaker,
        Format::Premodern,
        Format::OldSchool,
    ];

    /// Parse a feed legality key. Formats the engine does not track
    /// (e.g. short-lived digital variants) return `None`.
    pub fn from_feed_key(key: &str) -> Option<Self> {
        match key {
            "standard" => Some(Format::Standard),
            "pioneer" => Some(Format::Pioneer),
            "modern" => Some(Format::Modern),
            "legacy" => Some(Format::Legacy),
            "vintage" => Some(Format::Vintage),
            "pauper" => Some(Format::Pauper),
            "commander" => Some(Format::Commander),
            "brawl" => Some(Format::Brawl),
            "duel" => Some(Format::Duel),
            "penny" => Some(Format::Penny),
            "historic" => Some(Format::Historic),
            "alchemy" => Some(Format::Alchemy),
            "oathbreaker" => Some(Format::Oathbreaker),
            "premodern" => Some(Format::Premodern),
            "oldschool" => Some(Format::OldSchool),
            _ => None,
        }
    }
}

/// Per-format legality outcome.
///
/// The feed distinguishes cards banned or restricted in a format from
/// cards that were never printed into it; both are filterable, but the
/// distinction is kept so callers can render them differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Legality {
    Legal,
    Illegal,
    NotPrinted,
}

impl Legality {
    /// Parse a feed legality value. `"restricted"` counts as illegal for
    /// filtering purposes: a one-of allowance is not tournament-legal in
    /// the sense the format filter promises.
    pub fn from_feed_value(value: &str) -> Self {
        match value {
            "legal" => Legality::Legal,
            "banned" | "restricted" => Legality::Illegal,
            _ => Legality::NotPrinted,
        }
    }
}

/// Super-type bucket a card's type line maps into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeBucket {
    Creature,
    Land,
    Artifact,
    Enchantment,
    Planeswalker,
    Instant,
    Sorcery,
    Battle,
    Kindred,
    Misc,
}

impl TypeBucket {
    pub const ALL: [TypeBucket; 10] = [
        TypeBucket::Creature,
        TypeBucket::Land,
        TypeBucket::Artifact,
        TypeBucket::Enchantment,
        TypeBucket::Planeswalker,
        TypeBucket::Instant,
        TypeBucket::Sorcery,
        TypeBucket::Battle,
        TypeBucket::Kindred,
        TypeBucket::Misc,
    ];

    /// Bucket a type line by its super-type half: everything before the
    /// em-dash, lower-cased and whitespace-stripped. Multi-typed cards
    /// land in the first matching bucket in `ALL` order; anything
    /// unrecognized lands in `Misc`.
    pub fn from_type_line(type_line: &str) -> Self {
        let supertype: String = type_line
            .split('—')
            .next()
            .unwrap_or("")
            .to_lowercase()
            .split_whitespace()
            .collect();
        for bucket in [
            TypeBucket::Creature,
            TypeBucket::Land,
            TypeBucket::Artifact,
            TypeBucket::Enchantment,
            TypeBucket::Planeswalker,
            TypeBucket::Instant,
            TypeBucket::Sorcery,
            TypeBucket::Battle,
        ] {
            if supertype.contains(bucket.keyword()) {
                return bucket;
            }
        }
        // "tribal" is the pre-2023 printing of kindred
        if supertype.contains("kindred") || supertype.contains("tribal") {
            return TypeBucket::Kindred;
        }
        TypeBucket::Misc
    }

    const fn keyword(self) -> &'static str {
        match self {
            TypeBucket::Creature => "creature",
            TypeBucket::Land => "land",
            TypeBucket::Artifact => "artifact",
            TypeBucket::Enchantment => "enchantment",
            TypeBucket::Planeswalker => "planeswalker",
            TypeBucket::Instant => "instant",
            TypeBucket::Sorcery => "sorcery",
            TypeBucket::Battle => "battle",
            TypeBucket::Kindred => "kindred",
            TypeBucket::Misc => "misc",
        }
    }
}

/// Rarity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Mythic,
    Special,
    Bonus,
}

impl Rarity {
    pub const ALL: [Rarity; 6] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Mythic,
        Rarity::Special,
        Rarity::Bonus,
    ];
}

/// Boolean category flags a card may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Silly,
    Promo,
    Digital,
    Token,
    BasicLand,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Silly,
        Category::Promo,
        Category::Digital,
        Category::Token,
        Category::BasicLand,
    ];
}

/// Image links of one printing or face. Presence of any of these is what
/// makes a record displayable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageUris {
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub normal: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
}

impl ImageUris {
    fn is_displayable(&self) -> bool {
        self.small.is_some() || self.normal.is_some() || self.large.is_some()
    }
}

/// One face of a multi-faced feed row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFace {
    #[serde(default)]
    pub oracle_text: Option<String>,
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
}

/// The serde shape of one feed row. Fields the engine never consumes are
/// not modeled; serde ignores them.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCard {
    pub id: CardId,
    pub name: String,
    #[serde(default)]
    pub lang: String,
    #[serde(default)]
    pub type_line: String,
    #[serde(default)]
    pub colors: Option<Vec<Color>>,
    #[serde(default)]
    pub legalities: HashMap<String, String>,
    pub rarity: Rarity,
    #[serde(default)]
    pub artist: String,
    #[serde(rename = "set")]
    pub set_code: String,
    #[serde(default)]
    pub cmc: f64,
    #[serde(default)]
    pub layout: String,
    #[serde(default)]
    pub oracle_text: Option<String>,
    #[serde(default)]
    pub promo: bool,
    #[serde(default)]
    pub digital: bool,
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
    #[serde(default)]
    pub card_faces: Option<Vec<RawFace>>,
}

impl RawCard {
    /// A row is displayable if it has images itself or on any face.
    pub fn has_image(&self) -> bool {
        if let Some(uris) = &self.image_uris
            && uris.is_displayable()
        {
            return true;
        }
        self.card_faces
            .as_deref()
            .unwrap_or_default()
            .iter()
            .any(|face| face.image_uris.as_ref().is_some_and(ImageUris::is_displayable))
    }

    /// Oracle text of the row, falling back to the concatenated face
    /// texts for multi-faced rows.
    pub fn full_oracle_text(&self) -> String {
        if let Some(text) = &self.oracle_text {
            return text.clone();
        }
        self.card_faces
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(|face| face.oracle_text.as_deref())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Canonical immutable catalog record.
///
/// Popularity counters are not stored here; they live in the counter
/// table, keyed by the record's dense catalog position.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    pub colors: ColorSet,
    pub type_line: String,
    pub bucket: TypeBucket,
    pub legalities: HashMap<Format, Legality>,
    pub rarity: Rarity,
    pub artist: String,
    pub set_code: String,
    pub mana_value: u32,
    pub layout: String,
    pub oracle_text: String,
    pub promo: bool,
    pub digital: bool,
}

impl Card {
    /// Legality of this card in a format; formats absent from the feed
    /// row were never printed into that format.
    pub fn legality(&self, format: Format) -> Legality {
        self.legalities
            .get(&format)
            .copied()
            .unwrap_or(Legality::NotPrinted)
    }

    pub fn is_legal(&self, format: Format) -> bool {
        self.legality(format) == Legality::Legal
    }

    pub fn is_basic_land(&self) -> bool {
        self.type_line.contains("Basic") && self.type_line.contains("Land")
    }

    /// Whether this card carries the given category flag.
    pub fn has_category(&self, category: Category) -> bool {
        match category {
            Category::Silly => SILLY_SETS.contains(&self.set_code.as_str()),
            Category::Promo => self.promo,
            Category::Digital => self.digital,
            Category::Token => self.layout == "token" || self.layout == "double_faced_token",
            Category::BasicLand => self.is_basic_land(),
        }
    }

    /// Commander eligibility: legal in commander, not a meld piece, and
    /// either a legendary creature or a planeswalker whose rules text
    /// says it can be your commander.
    pub fn is_commander_eligible(&self) -> bool {
        if !self.is_legal(Format::Commander) || self.layout == "meld" {
            return false;
        }
        if self.type_line.contains("Legendary") && self.type_line.contains("Creature") {
            return true;
        }
        self.type_line.contains("Planeswalker")
            && self
                .oracle_text
                .contains(&format!("{} can be your commander", self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(name: &str, type_line: &str, oracle: &str) -> Card {
        Card {
            id: CardId::random(),
            name: name.to_string(),
            colors: ColorSet::COLORLESS,
            type_line: type_line.to_string(),
            bucket: TypeBucket::from_type_line(type_line),
            legalities: HashMap::from([(Format::Commander, Legality::Legal)]),
            rarity: Rarity::Rare,
            artist: String::new(),
            set_code: "tst".to_string(),
            mana_value: 3,
            layout: "normal".to_string(),
            oracle_text: oracle.to_string(),
            promo: false,
            digital: false,
        }
    }

    #[test]
    fn test_type_bucket_supertype_half() {
        assert_eq!(
            TypeBucket::from_type_line("Creature — Goblin Wizard"),
            TypeBucket::Creature
        );
        assert_eq!(
            TypeBucket::from_type_line("Legendary Artifact Creature — Golem"),
            TypeBucket::Creature
        );
        assert_eq!(TypeBucket::from_type_line("Basic Land — Island"), TypeBucket::Land);
        assert_eq!(TypeBucket::from_type_line("Tribal Instant — Elf"), TypeBucket::Instant);
        assert_eq!(TypeBucket::from_type_line("Conspiracy"), TypeBucket::Misc);
        assert_eq!(TypeBucket::from_type_line(""), TypeBucket::Misc);
    }

    #[test]
    fn test_legality_feed_values() {
        assert_eq!(Legality::from_feed_value("legal"), Legality::Legal);
        assert_eq!(Legality::from_feed_value("banned"), Legality::Illegal);
        assert_eq!(Legality::from_feed_value("restricted"), Legality::Illegal);
        assert_eq!(Legality::from_feed_value("not_legal"), Legality::NotPrinted);
    }

    #[test]
    fn test_unknown_format_keys_are_skipped() {
        assert_eq!(Format::from_feed_key("gladiator"), None);
        assert_eq!(Format::from_feed_key("commander"), Some(Format::Commander));
    }

    #[test]
    fn test_commander_eligibility_legendary_creature() {
        let yes = card("Kels", "Legendary Creature — Human", "");
        assert!(yes.is_commander_eligible());

        let plain = card("Bears", "Creature — Bear", "");
        assert!(!plain.is_commander_eligible());
    }

    #[test]
    fn test_commander_eligibility_planeswalker_text() {
        let yes = card(
            "Teferi",
            "Legendary Planeswalker — Teferi",
            "Teferi can be your commander.",
        );
        assert!(yes.is_commander_eligible());

        let no = card("Jace", "Legendary Planeswalker — Jace", "Draw a card.");
        assert!(!no.is_commander_eligible());
    }

    #[test]
    fn test_commander_eligibility_requires_legality() {
        let mut c = card("Kels", "Legendary Creature — Human", "");
        c.legalities
            .insert(Format::Commander, Legality::Illegal);
        assert!(!c.is_commander_eligible());

        let mut meld = card("Brisela", "Legendary Creature — Angel", "");
        meld.layout = "meld".to_string();
        assert!(!meld.is_commander_eligible());
    }

    #[test]
    fn test_categories() {
        let mut c = card("Chicken", "Creature — Chicken", "");
        c.set_code = "ugl".to_string();
        assert!(c.has_category(Category::Silly));
        assert!(!c.has_category(Category::Promo));

        c.layout = "token".to_string();
        assert!(c.has_category(Category::Token));

        let basic = card("Island", "Basic Land — Island", "");
        assert!(basic.has_category(Category::BasicLand));
    }

    #[test]
    fn test_raw_card_image_and_oracle_fallback() {
        let json = r#"{
            "id": "6f442fa9-3397-4718-8e4a-359f4f7bbedb",
            "name": "Delver of Secrets",
            "lang": "en",
            "type_line": "Creature — Human Wizard // Creature — Human Insect",
            "rarity": "common",
            "set": "isd",
            "layout": "transform",
            "card_faces": [
                {"oracle_text": "At the beginning of your upkeep, look at the top card.",
                 "image_uris": {"normal": "https://img/front.jpg"}},
                {"oracle_text": "Flying.",
                 "image_uris": {"normal": "https://img/back.jpg"}}
            ]
        }"#;
        let raw: RawCard = serde_json::from_str(json).unwrap();
        assert!(raw.has_image());
        assert!(raw.full_oracle_text().contains("Flying."));

        let bare = r#"{
            "id": "47eea618-e311-4147-9809-24b23be3e303",
            "name": "Textless",
            "rarity": "rare",
            "set": "tst"
        }"#;
        let raw: RawCard = serde_json::from_str(bare).unwrap();
        assert!(!raw.has_image());
        assert_eq!(raw.full_oracle_text(), "");
    }
}
