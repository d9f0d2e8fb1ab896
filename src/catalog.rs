//! Catalog normalization: raw feed rows in, a dense stably-indexed
//! catalog of canonical records out.
//!
//! Normalization never fails on bad data. Rows that cannot be
//! deserialized, rows in a non-canonical language, rows with no
//! displayable image, and (under the default policy) basic lands are
//! dropped, counted, and logged once.

use std::collections::HashMap;

use rand::Rng;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::card::{Card, Format, Legality, RawCard, TypeBucket};
use crate::color::ColorSet;
use crate::ids::CardId;

/// Minimum query length for name search; shorter queries return nothing.
pub const MIN_SEARCH_LEN: usize = 3;

/// Errors raised while reading a card feed.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The feed document itself is not a JSON array.
    #[error("card feed is not a JSON array: {0}")]
    InvalidFeed(#[from] serde_json::Error),
}

/// Which rows the normalizer drops beyond the fixed rules.
#[derive(Debug, Clone)]
pub struct NormalizerPolicy {
    /// Language tag a row must carry to survive.
    pub canonical_lang: String,
    /// Drop basic lands at normalization time. On by default; catalogs
    /// normalized with this off can still fence lands off with the
    /// basic-land category filter.
    pub drop_basic_lands: bool,
}

impl Default for NormalizerPolicy {
    fn default() -> Self {
        Self {
            canonical_lang: "en".to_string(),
            drop_basic_lands: true,
        }
    }
}

/// A parsed feed: well-formed rows plus the count of rows that failed
/// to deserialize.
#[derive(Debug, Default)]
pub struct ParsedFeed {
    pub rows: Vec<RawCard>,
    pub malformed: usize,
}

/// Parse a feed document into rows, dropping malformed rows one by one
/// instead of failing the whole document.
pub fn parse_feed(json: &str) -> Result<ParsedFeed, CatalogError> {
    let values: Vec<Value> = serde_json::from_str(json)?;
    let mut feed = ParsedFeed {
        rows: Vec::with_capacity(values.len()),
        malformed: 0,
    };
    for value in values {
        match serde_json::from_value::<RawCard>(value) {
            Ok(row) => feed.rows.push(row),
            Err(err) => {
                feed.malformed += 1;
                debug!(%err, "dropping malformed feed row");
            }
        }
    }
    Ok(feed)
}

/// Dense, stably-indexed list of canonical records.
///
/// Built once at startup; records and positions never change afterwards.
#[derive(Debug, Default)]
pub struct Catalog {
    cards: Vec<Card>,
    by_id: HashMap<CardId, usize>,
    dropped: usize,
}

impl Catalog {
    /// Normalize a feed into a catalog. Surviving records are assigned
    /// 0-based positions in feed order.
    pub fn from_feed(rows: Vec<RawCard>, policy: &NormalizerPolicy) -> Self {
        let mut cards = Vec::with_capacity(rows.len());
        let mut by_id = HashMap::with_capacity(rows.len());
        let mut dropped = 0usize;
        let mut unknown_formats = 0usize;

        for raw in rows {
            if raw.lang != policy.canonical_lang || !raw.has_image() {
                dropped += 1;
                continue;
            }
            if policy.drop_basic_lands && raw.type_line.contains("Basic Land") {
                dropped += 1;
                continue;
            }
            if by_id.contains_key(&raw.id) {
                dropped += 1;
                continue;
            }

            let mut legalities = HashMap::new();
            for (key, value) in &raw.legalities {
                match Format::from_feed_key(key) {
                    Some(format) => {
                        legalities.insert(format, Legality::from_feed_value(value));
                    }
                    None => unknown_formats += 1,
                }
            }

            let card = Card {
                id: raw.id,
                name: raw.name.clone(),
                colors: raw
                    .colors
                    .as_deref()
                    .map(|colors| colors.iter().copied().collect())
                    .unwrap_or(ColorSet::COLORLESS),
                bucket: TypeBucket::from_type_line(&raw.type_line),
                type_line: raw.type_line.clone(),
                legalities,
                rarity: raw.rarity,
                artist: raw.artist.clone(),
                set_code: raw.set_code.clone(),
                mana_value: raw.cmc.max(0.0) as u32,
                layout: raw.layout.clone(),
                oracle_text: raw.full_oracle_text(),
                promo: raw.promo,
                digital: raw.digital,
            };

            by_id.insert(card.id, cards.len());
            cards.push(card);
        }

        info!(
            kept = cards.len(),
            dropped, unknown_formats, "normalized card catalog"
        );
        Self {
            cards,
            by_id,
            dropped,
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Records dropped during normalization.
    pub fn dropped_count(&self) -> usize {
        self.dropped
    }

    /// All records in position order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// O(1) lookup by identifier.
    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.by_id.get(&id).map(|&pos| &self.cards[pos])
    }

    /// Dense position of a record, if it is in the catalog.
    pub fn position(&self, id: CardId) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    /// Uniform random draw over the whole catalog.
    pub fn random_card<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<CardId> {
        if self.cards.is_empty() {
            return None;
        }
        Some(self.cards[rng.random_range(0..self.cards.len())].id)
    }

    /// Case-insensitive name search, ranked by how early the query
    /// appears in the name and paginated into `page_size` chunks.
    /// Queries shorter than [`MIN_SEARCH_LEN`] return no results.
    pub fn search(&self, query: &str, page_size: usize) -> Vec<Vec<&Card>> {
        let query = query.to_lowercase();
        if query.len() < MIN_SEARCH_LEN {
            return Vec::new();
        }
        let mut matches: Vec<(usize, &Card)> = self
            .cards
            .iter()
            .filter_map(|card| {
                card.name
                    .to_lowercase()
                    .find(&query)
                    .map(|at| (at, card))
            })
            .collect();
        matches.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.name.cmp(&b.1.name)));

        let ranked: Vec<&Card> = matches.into_iter().map(|(_, card)| card).collect();
        ranked
            .chunks(page_size.max(1))
            .map(<[&Card]>::to_vec)
            .collect()
    }

    /// Resolve a set of voted identifiers to records sorted by name,
    /// skipping ids unknown to the current catalog.
    pub fn cards_by_id<I>(&self, ids: I) -> Vec<&Card>
    where
        I: IntoIterator<Item = CardId>,
    {
        let mut found: Vec<&Card> = ids.into_iter().filter_map(|id| self.get(id)).collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found
    }
}
