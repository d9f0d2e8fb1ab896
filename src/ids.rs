use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog record identifier, wrapping the card feed's UUID.
///
/// Identity comes from the external feed, so there is no in-process
/// counter behind these; a `CardId` is only ever minted by parsing feed
/// or persistence data (or randomly, for fixtures).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CardId(pub Uuid);

impl CardId {
    /// Create a card ID from a specific UUID.
    pub fn from_raw(id: Uuid) -> Self {
        Self(id)
    }

    /// Parse an ID from its string form, as stored in vote rows.
    /// Returns `None` for malformed input rather than failing the caller.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }

    /// Mint a fresh random ID (fixtures and ad hoc catalogs).
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for CardId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}
