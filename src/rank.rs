//! Ranked top-N listings over a counter snapshot.

use crate::card::Card;
use crate::catalog::Catalog;
use crate::tally::CounterSnapshot;

/// Named orderings for popularity listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOrder {
    /// Descending net score (`liked - disliked`).
    Top,
    /// Descending engagement-to-consensus ratio
    /// (`(liked + disliked) / max(|liked - disliked|, 1)`).
    Controversial,
    /// Ascending net score.
    Worst,
}

impl RankOrder {
    fn score(self, liked: u32, disliked: u32) -> i64 {
        let liked = i64::from(liked);
        let disliked = i64::from(disliked);
        match self {
            RankOrder::Top | RankOrder::Worst => liked - disliked,
            RankOrder::Controversial => (liked + disliked) / (liked - disliked).abs().max(1),
        }
    }

    const fn ascending(self) -> bool {
        matches!(self, RankOrder::Worst)
    }
}

/// One row of a ranked listing.
#[derive(Debug, Clone)]
pub struct RankedCard<'a> {
    pub card: &'a Card,
    pub liked: u32,
    pub disliked: u32,
    pub score: i64,
}

/// Rank the whole catalog under the given ordering and keep the first
/// `n` rows. Ties break by card name so identical snapshots always
/// produce identical listings.
pub fn ranked<'a>(
    catalog: &'a Catalog,
    snapshot: &CounterSnapshot,
    order: RankOrder,
    n: usize,
) -> Vec<RankedCard<'a>> {
    let mut rows: Vec<RankedCard<'a>> = catalog
        .cards()
        .iter()
        .enumerate()
        .map(|(pos, card)| {
            let liked = snapshot.liked(pos);
            let disliked = snapshot.disliked(pos);
            RankedCard {
                card,
                liked,
                disliked,
                score: order.score(liked, disliked),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        let by_score = if order.ascending() {
            a.score.cmp(&b.score)
        } else {
            b.score.cmp(&a.score)
        };
        by_score.then_with(|| a.card.name.cmp(&b.card.name))
    });
    rows.truncate(n);
    rows
}
