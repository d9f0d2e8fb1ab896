//! Filter specifications and the exclusion compiler.
//!
//! A `FilterSpec` is the declarative payload a caller sends with a
//! selection request; every field is optional and an absent field means
//! "no constraint from this facet". The compiler folds the spec plus
//! the caller's already-voted identifiers into a single exclusion set
//! by unioning facet sets and precomputed complements. The accumulator
//! is monotonic: once a record is excluded, no later step readmits it.

use std::collections::HashSet;

use serde::Deserialize;

use crate::card::{Category, Format, Rarity, TypeBucket};
use crate::color::Color;
use crate::facet::FacetIndex;
use crate::ids::CardId;

/// Per-color flags plus the exclusive-mode bit.
///
/// The two modes are intentionally asymmetric. In exclusive mode every
/// checked color must be present on a record, so each checked color
/// contributes its complement; unchecked colors still disqualify any
/// record bearing them. In inclusive mode only the unchecked colors
/// constrain: a record bearing an explicitly unchecked color is
/// excluded, and checked colors add nothing. Exclusive mode therefore
/// always excludes a superset of what inclusive mode excludes for the
/// same flags.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColorFilter {
    pub exclusive: bool,
    pub white: bool,
    pub blue: bool,
    pub black: bool,
    pub red: bool,
    pub green: bool,
}

impl ColorFilter {
    /// Whether the given color's flag is checked.
    pub fn checked(&self, color: Color) -> bool {
        match color {
            Color::White => self.white,
            Color::Blue => self.blue,
            Color::Black => self.black,
            Color::Red => self.red,
            Color::Green => self.green,
        }
    }
}

/// Declarative description of what a selection request must not return.
/// All fields optional; `FilterSpec::default()` constrains nothing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterSpec {
    /// Color flags with the exclusive-mode bit.
    pub colors: Option<ColorFilter>,
    /// Formats a record must be legal in.
    pub formats: Vec<Format>,
    /// Type buckets allowed through; records in any other bucket are
    /// excluded. Absent means every bucket is allowed.
    pub allowed_types: Option<Vec<TypeBucket>>,
    /// Category flags allowed through; records carrying any other
    /// category flag are excluded. Absent means every category is
    /// allowed.
    pub allowed_categories: Option<Vec<Category>>,
    /// Only commander-eligible records.
    pub commander_only: bool,
    /// Exact mana value a record must have.
    pub mana_value: Option<u32>,
    /// Set codes whose records are excluded.
    pub excluded_sets: Vec<String>,
    /// Rarity tiers whose records are excluded.
    pub excluded_rarities: Vec<Rarity>,
    /// Keep only records by this artist (if the artist is known).
    pub artist: Option<String>,
}

/// The set of record identifiers a request must not return.
/// Rebuilt fresh per request, never persisted.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    ids: HashSet<CardId>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn insert(&mut self, id: CardId) {
        self.ids.insert(id);
    }

    /// Union another set of identifiers into the accumulator.
    pub fn absorb<'a, I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = &'a CardId>,
    {
        self.ids.extend(ids.into_iter().copied());
    }

    pub fn iter(&self) -> impl Iterator<Item = CardId> + '_ {
        self.ids.iter().copied()
    }
}

impl FromIterator<CardId> for ExclusionSet {
    fn from_iter<T: IntoIterator<Item = CardId>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

impl FacetIndex {
    /// Compile a filter spec plus the caller's already-voted ids into
    /// one exclusion set.
    pub fn compile_exclusions(
        &self,
        spec: &FilterSpec,
        already_voted: &HashSet<CardId>,
    ) -> ExclusionSet {
        let mut excluded = ExclusionSet::new();

        // already-voted records, restricted to ids the catalog knows
        excluded.absorb(already_voted.intersection(self.all_ids()));

        if let Some(colors) = &spec.colors {
            for color in Color::ALL {
                if colors.checked(color) {
                    if colors.exclusive {
                        excluded.absorb(self.color_complement(color));
                    }
                } else {
                    excluded.absorb(self.color_members(color));
                }
            }
        }

        for format in &spec.formats {
            excluded.absorb(self.format_complement(*format));
        }

        if let Some(allowed) = &spec.allowed_types {
            for bucket in TypeBucket::ALL {
                if !allowed.contains(&bucket) {
                    excluded.absorb(self.bucket_members(bucket));
                }
            }
        }

        if let Some(allowed) = &spec.allowed_categories {
            for category in Category::ALL {
                if !allowed.contains(&category) {
                    excluded.absorb(self.category_members(category));
                }
            }
        }

        if spec.commander_only {
            excluded.absorb(self.commander_complement());
        }

        if let Some(mana_value) = spec.mana_value {
            excluded.absorb(self.mana_value_complement(mana_value));
        }

        self.exclude_sets(&mut excluded, &spec.excluded_sets);

        for rarity in &spec.excluded_rarities {
            excluded.absorb(self.rarity_members(*rarity));
        }

        if let Some(artist) = spec.artist.as_deref()
            && let Some(members) = self.artist_members(artist)
        {
            excluded.absorb(self.all_ids().difference(members));
        }

        excluded
    }

    /// Set-code exclusion with a cost-based strategy switch. Excluding
    /// few sets unions their member sets directly; excluding most sets
    /// instead unions the members of the sets that stay, then excludes
    /// the complement of that union. Both sides produce the same set.
    fn exclude_sets(&self, excluded: &mut ExclusionSet, codes: &[String]) {
        if codes.is_empty() {
            return;
        }
        let known: Vec<&HashSet<CardId>> = codes
            .iter()
            .filter_map(|code| self.set_members(code))
            .collect();

        if known.len() * 2 < self.set_count() {
            for members in known {
                excluded.absorb(members);
            }
        } else {
            let names: HashSet<&str> = codes.iter().map(String::as_str).collect();
            let mut kept = HashSet::with_capacity(self.len());
            for (code, members) in self.sets() {
                if !names.contains(code) {
                    kept.extend(members.iter().copied());
                }
            }
            excluded.absorb(self.all_ids().difference(&kept));
        }
    }

    /// How many records a compiled exclusion leaves selectable.
    pub fn remaining_count(&self, excluded: &ExclusionSet) -> usize {
        self.len().saturating_sub(excluded.len())
    }
}
