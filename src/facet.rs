//! Per-attribute membership indices over a normalized catalog.
//!
//! Built in a single pass at startup and read-only afterwards. Every
//! facet maps a typed key to the set of record identifiers carrying that
//! attribute; facets with a bounded key domain (colors, formats,
//! mana-value buckets, commander eligibility) additionally carry a
//! precomputed complement set so negated filters cost one set union
//! instead of a catalog scan per request.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::card::{Category, Format, Rarity, TypeBucket};
use crate::catalog::Catalog;
use crate::color::Color;
use crate::ids::CardId;

static EMPTY: LazyLock<HashSet<CardId>> = LazyLock::new(HashSet::new);

/// Membership indices for every facet of the catalog.
#[derive(Debug)]
pub struct FacetIndex {
    all_ids: HashSet<CardId>,
    color_members: HashMap<Color, HashSet<CardId>>,
    color_complements: HashMap<Color, HashSet<CardId>>,
    format_legal: HashMap<Format, HashSet<CardId>>,
    format_complements: HashMap<Format, HashSet<CardId>>,
    bucket_members: HashMap<TypeBucket, HashSet<CardId>>,
    rarity_members: HashMap<Rarity, HashSet<CardId>>,
    artist_members: HashMap<String, HashSet<CardId>>,
    set_members: HashMap<String, HashSet<CardId>>,
    mana_value_members: HashMap<u32, HashSet<CardId>>,
    mana_value_complements: HashMap<u32, HashSet<CardId>>,
    category_members: HashMap<Category, HashSet<CardId>>,
    commander_eligible: HashSet<CardId>,
    commander_complement: HashSet<CardId>,
}

impl FacetIndex {
    /// Build the index in one pass over the catalog, then precompute
    /// the bounded-domain complements.
    pub fn build(catalog: &Catalog) -> Self {
        let mut all_ids = HashSet::with_capacity(catalog.len());
        let mut color_members: HashMap<Color, HashSet<CardId>> =
            Color::ALL.into_iter().map(|c| (c, HashSet::new())).collect();
        let mut format_legal: HashMap<Format, HashSet<CardId>> = Format::ALL
            .into_iter()
            .map(|f| (f, HashSet::new()))
            .collect();
        let mut bucket_members: HashMap<TypeBucket, HashSet<CardId>> = TypeBucket::ALL
            .into_iter()
            .map(|b| (b, HashSet::new()))
            .collect();
        let mut rarity_members: HashMap<Rarity, HashSet<CardId>> = Rarity::ALL
            .into_iter()
            .map(|r| (r, HashSet::new()))
            .collect();
        let mut category_members: HashMap<Category, HashSet<CardId>> = Category::ALL
            .into_iter()
            .map(|c| (c, HashSet::new()))
            .collect();
        let mut artist_members: HashMap<String, HashSet<CardId>> = HashMap::new();
        let mut set_members: HashMap<String, HashSet<CardId>> = HashMap::new();
        let mut mana_value_members: HashMap<u32, HashSet<CardId>> = HashMap::new();
        let mut commander_eligible = HashSet::new();

        for card in catalog.cards() {
            let id = card.id;
            all_ids.insert(id);

            for color in Color::ALL {
                if card.colors.contains(color) {
                    color_members.entry(color).or_default().insert(id);
                }
            }
            for format in Format::ALL {
                if card.is_legal(format) {
                    format_legal.entry(format).or_default().insert(id);
                }
            }
            bucket_members.entry(card.bucket).or_default().insert(id);
            rarity_members.entry(card.rarity).or_default().insert(id);
            if !card.artist.is_empty() {
                artist_members
                    .entry(card.artist.clone())
                    .or_default()
                    .insert(id);
            }
            set_members
                .entry(card.set_code.clone())
                .or_default()
                .insert(id);
            mana_value_members
                .entry(card.mana_value)
                .or_default()
                .insert(id);
            for category in Category::ALL {
                if card.has_category(category) {
                    category_members.entry(category).or_default().insert(id);
                }
            }
            if card.is_commander_eligible() {
                commander_eligible.insert(id);
            }
        }

        let complement = |members: &HashSet<CardId>| -> HashSet<CardId> {
            all_ids.difference(members).copied().collect()
        };
        let color_complements = color_members
            .iter()
            .map(|(&color, members)| (color, complement(members)))
            .collect();
        let format_complements = format_legal
            .iter()
            .map(|(&format, members)| (format, complement(members)))
            .collect();
        let mana_value_complements = mana_value_members
            .iter()
            .map(|(&mv, members)| (mv, complement(members)))
            .collect();
        let commander_complement = complement(&commander_eligible);

        Self {
            all_ids,
            color_members,
            color_complements,
            format_legal,
            format_complements,
            bucket_members,
            rarity_members,
            artist_members,
            set_members,
            mana_value_members,
            mana_value_complements,
            category_members,
            commander_eligible,
            commander_complement,
        }
    }

    /// Every record identifier in the indexed catalog.
    pub fn all_ids(&self) -> &HashSet<CardId> {
        &self.all_ids
    }

    pub fn len(&self) -> usize {
        self.all_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_ids.is_empty()
    }

    pub fn color_members(&self, color: Color) -> &HashSet<CardId> {
        self.color_members.get(&color).unwrap_or(&EMPTY)
    }

    /// Records lacking the given color.
    pub fn color_complement(&self, color: Color) -> &HashSet<CardId> {
        self.color_complements.get(&color).unwrap_or(&EMPTY)
    }

    /// Records legal in the given format.
    pub fn format_legal(&self, format: Format) -> &HashSet<CardId> {
        self.format_legal.get(&format).unwrap_or(&EMPTY)
    }

    /// Records not legal in the given format (illegal or never printed).
    pub fn format_complement(&self, format: Format) -> &HashSet<CardId> {
        self.format_complements.get(&format).unwrap_or(&EMPTY)
    }

    pub fn bucket_members(&self, bucket: TypeBucket) -> &HashSet<CardId> {
        self.bucket_members.get(&bucket).unwrap_or(&EMPTY)
    }

    pub fn rarity_members(&self, rarity: Rarity) -> &HashSet<CardId> {
        self.rarity_members.get(&rarity).unwrap_or(&EMPTY)
    }

    pub fn category_members(&self, category: Category) -> &HashSet<CardId> {
        self.category_members.get(&category).unwrap_or(&EMPTY)
    }

    /// Members of one set code, if the code is known to the catalog.
    pub fn set_members(&self, code: &str) -> Option<&HashSet<CardId>> {
        self.set_members.get(code)
    }

    /// All set codes present in the catalog with their member sets.
    pub fn sets(&self) -> impl Iterator<Item = (&str, &HashSet<CardId>)> {
        self.set_members
            .iter()
            .map(|(code, members)| (code.as_str(), members))
    }

    /// Number of distinct set codes in the catalog.
    pub fn set_count(&self) -> usize {
        self.set_members.len()
    }

    pub fn mana_value_members(&self, mana_value: u32) -> &HashSet<CardId> {
        self.mana_value_members.get(&mana_value).unwrap_or(&EMPTY)
    }

    /// Records whose mana value differs from the given one. For a mana
    /// value no record has, this is the whole catalog.
    pub fn mana_value_complement(&self, mana_value: u32) -> &HashSet<CardId> {
        self.mana_value_complements
            .get(&mana_value)
            .unwrap_or(&self.all_ids)
    }

    /// Members of one artist's set, if the artist is known.
    pub fn artist_members(&self, artist: &str) -> Option<&HashSet<CardId>> {
        self.artist_members.get(artist)
    }

    pub fn commander_eligible(&self) -> &HashSet<CardId> {
        &self.commander_eligible
    }

    /// Records that cannot head a commander deck.
    pub fn commander_complement(&self) -> &HashSet<CardId> {
        &self.commander_complement
    }
}
