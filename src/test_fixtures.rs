//! Small feed-row builder shared by the unit tests.

use std::collections::HashMap;

use crate::card::{Format, ImageUris, Rarity, RawCard};
use crate::catalog::{Catalog, NormalizerPolicy};
use crate::color::Color;
use crate::ids::CardId;

/// Builder for one well-formed feed row.
pub struct FixtureCard {
    raw: RawCard,
}

impl FixtureCard {
    pub fn new(name: &str, type_line: &str) -> Self {
        Self {
            raw: RawCard {
                id: CardId::random(),
                name: name.to_string(),
                lang: "en".to_string(),
                type_line: type_line.to_string(),
                colors: None,
                legalities: HashMap::new(),
                rarity: Rarity::Common,
                artist: String::new(),
                set_code: "tst".to_string(),
                cmc: 0.0,
                layout: "normal".to_string(),
                oracle_text: Some(String::new()),
                promo: false,
                digital: false,
                image_uris: Some(ImageUris {
                    normal: Some("https://img/fixture.jpg".to_string()),
                    small: None,
                    large: None,
                }),
                card_faces: None,
            },
        }
    }

    pub fn colors(mut self, colors: &[Color]) -> Self {
        self.raw.colors = Some(colors.to_vec());
        self
    }

    pub fn legal(mut self, formats: &[Format]) -> Self {
        for format in formats {
            let key = serde_json::to_value(format)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();
            self.raw.legalities.insert(key, "legal".to_string());
        }
        self
    }

    pub fn rarity(mut self, rarity: Rarity) -> Self {
        self.raw.rarity = rarity;
        self
    }

    pub fn artist(mut self, artist: &str) -> Self {
        self.raw.artist = artist.to_string();
        self
    }

    pub fn set(mut self, code: &str) -> Self {
        self.raw.set_code = code.to_string();
        self
    }

    pub fn cmc(mut self, cmc: f64) -> Self {
        self.raw.cmc = cmc;
        self
    }

    pub fn build(self) -> RawCard {
        self.raw
    }
}

/// Normalize a list of fixture rows into a catalog.
pub fn catalog_of(cards: Vec<FixtureCard>, policy: &NormalizerPolicy) -> Catalog {
    Catalog::from_feed(cards.into_iter().map(FixtureCard::build).collect(), policy)
}
