//! Random selection of an unexcluded record.
//!
//! The fast path is free: when the initial uniform draw is not
//! excluded, it is returned untouched. When it is, the retry strategy
//! depends on how much of the catalog the exclusion covers. Below half,
//! rejection sampling finds a survivor in O(1) expected draws; at half
//! or above, the survivors are materialized once and drawn from
//! directly, which also doubles as the exhaustion check.

use rand::Rng;

use crate::catalog::Catalog;
use crate::filter::ExclusionSet;
use crate::ids::CardId;

/// Cap on rejection-sampling draws before falling back to the dense
/// survivor scan. With less than half the catalog excluded the chance
/// of hitting this is below 2^-64 per selection.
pub const MAX_REJECTION_DRAWS: usize = 64;

/// Pick an unexcluded record identifier, starting from an initial
/// uniform draw. Returns `None` only when the exclusion covers the
/// whole catalog (or the catalog is empty).
pub fn select<R: Rng + ?Sized>(
    rng: &mut R,
    candidate: CardId,
    excluded: &ExclusionSet,
    catalog: &Catalog,
) -> Option<CardId> {
    if catalog.is_empty() {
        return None;
    }
    if !excluded.contains(candidate) {
        return Some(candidate);
    }

    if excluded.len() * 2 < catalog.len() {
        for _ in 0..MAX_REJECTION_DRAWS {
            if let Some(id) = catalog.random_card(rng)
                && !excluded.contains(id)
            {
                return Some(id);
            }
        }
        // statistically unreachable; fall through to the dense scan
    }

    let survivors: Vec<CardId> = catalog
        .cards()
        .iter()
        .map(|card| card.id)
        .filter(|id| !excluded.contains(*id))
        .collect();
    if survivors.is_empty() {
        return None;
    }
    Some(survivors[rng.random_range(0..survivors.len())])
}

/// Draw the initial candidate and select in one call.
pub fn select_random<R: Rng + ?Sized>(
    rng: &mut R,
    excluded: &ExclusionSet,
    catalog: &Catalog,
) -> Option<CardId> {
    let candidate = catalog.random_card(rng)?;
    select(rng, candidate, excluded, catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::NormalizerPolicy;
    use crate::test_fixtures::{FixtureCard, catalog_of};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn fixture_catalog(n: usize) -> Catalog {
        catalog_of(
            (0..n)
                .map(|i| FixtureCard::new(&format!("Card {i}"), "Instant"))
                .collect(),
            &NormalizerPolicy::default(),
        )
    }

    #[test]
    fn test_unexcluded_candidate_returned_unchanged() {
        let catalog = fixture_catalog(10);
        let candidate = catalog.cards()[3].id;
        let mut rng = StdRng::seed_from_u64(1);

        let picked = select(&mut rng, candidate, &ExclusionSet::new(), &catalog);
        assert_eq!(picked, Some(candidate));
    }

    #[test]
    fn test_never_returns_excluded_id_small_exclusion() {
        let catalog = fixture_catalog(20);
        // exclude 5 of 20: rejection-sampling branch
        let excluded: ExclusionSet = catalog.cards()[..5].iter().map(|c| c.id).collect();
        let mut rng = StdRng::seed_from_u64(2);

        for _ in 0..200 {
            let candidate = catalog.cards()[0].id; // always excluded
            let picked = select(&mut rng, candidate, &excluded, &catalog);
            assert!(picked.is_some_and(|id| !excluded.contains(id)));
        }
    }

    #[test]
    fn test_never_returns_excluded_id_large_exclusion() {
        let catalog = fixture_catalog(20);
        // exclude 19 of 20: dense survivor branch
        let survivor = catalog.cards()[19].id;
        let excluded: ExclusionSet = catalog.cards()[..19].iter().map(|c| c.id).collect();
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..50 {
            let picked = select_random(&mut rng, &excluded, &catalog);
            assert_eq!(picked, Some(survivor));
        }
    }

    #[test]
    fn test_full_exclusion_yields_none() {
        let catalog = fixture_catalog(8);
        let excluded: ExclusionSet = catalog.cards().iter().map(|c| c.id).collect();
        let mut rng = StdRng::seed_from_u64(4);

        assert_eq!(select_random(&mut rng, &excluded, &catalog), None);
    }

    #[test]
    fn test_empty_catalog_yields_none() {
        let catalog = fixture_catalog(0);
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(select_random(&mut rng, &ExclusionSet::new(), &catalog), None);
        assert_eq!(
            select(&mut rng, CardId::random(), &ExclusionSet::new(), &catalog),
            None
        );
    }

    #[test]
    fn test_half_boundary_uses_dense_scan() {
        let catalog = fixture_catalog(10);
        // exactly half excluded: len * 2 == catalog.len(), dense branch
        let excluded: ExclusionSet = catalog.cards()[..5].iter().map(|c| c.id).collect();
        let mut rng = StdRng::seed_from_u64(6);

        for _ in 0..50 {
            let candidate = catalog.cards()[0].id;
            let picked = select(&mut rng, candidate, &excluded, &catalog);
            assert!(picked.is_some_and(|id| !excluded.contains(id)));
        }
    }
}
