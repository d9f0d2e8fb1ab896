pub mod card;
pub mod catalog;
pub mod color;
pub mod config;
pub mod facet;
pub mod filter;
pub mod ids;
pub mod rank;
pub mod selector;
pub mod tally;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use card::{Card, Category, Format, ImageUris, Legality, Rarity, RawCard, RawFace, TypeBucket};
pub use catalog::{
    Catalog, CatalogError, MIN_SEARCH_LEN, NormalizerPolicy, ParsedFeed, parse_feed,
};
pub use color::{Color, ColorSet};
pub use config::EngineConfig;
pub use facet::FacetIndex;
pub use filter::{ColorFilter, ExclusionSet, FilterSpec};
pub use ids::CardId;
pub use rank::{RankOrder, RankedCard, ranked};
pub use selector::{MAX_REJECTION_DRAWS, select, select_random};
pub use tally::{
    CounterSnapshot, CounterTable, MemoryVoteStore, Tallier, TallyOutcome, TallyReport, VoteError,
    VoteKind, VoteRow, VoteStatus, VoteStore, VoteStoreError, cast_vote, retract_vote, vote_status,
};
