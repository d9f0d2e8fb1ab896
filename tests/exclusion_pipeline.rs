//! End-to-end pipeline tests: feed rows through normalization, facet
//! indexing, exclusion compilation, and selection.

use std::collections::{HashMap, HashSet};

use rand::SeedableRng;
use rand::rngs::StdRng;

use topdeck::{
    Card, CardId, Catalog, Color, ColorFilter, ExclusionSet, FacetIndex, FilterSpec, Format,
    ImageUris, NormalizerPolicy, Rarity, RawCard, select, select_random,
};

fn raw_card(name: &str, set_code: &str, colors: &[Color]) -> RawCard {
    RawCard {
        id: CardId::random(),
        name: name.to_string(),
        lang: "en".to_string(),
        type_line: "Creature — Elemental".to_string(),
        colors: Some(colors.to_vec()),
        legalities: HashMap::from([
            ("commander".to_string(), "legal".to_string()),
            ("modern".to_string(), "not_legal".to_string()),
        ]),
        rarity: Rarity::Common,
        artist: "Fixture Artist".to_string(),
        set_code: set_code.to_string(),
        cmc: 3.0,
        layout: "normal".to_string(),
        oracle_text: Some(String::new()),
        promo: false,
        digital: false,
        image_uris: Some(ImageUris {
            small: None,
            normal: Some("https://img/card.jpg".to_string()),
            large: None,
        }),
        card_faces: None,
    }
}

/// 50 cards spread over 10 set codes, one of each color per set.
fn wide_catalog() -> Catalog {
    let mut rows = Vec::new();
    for set_index in 0..10 {
        let code = format!("s{set_index:02}");
        for card_index in 0..5 {
            let color = Color::ALL[card_index % Color::ALL.len()];
            rows.push(raw_card(
                &format!("{code} card {card_index}"),
                &code,
                &[color],
            ));
        }
    }
    Catalog::from_feed(rows, &NormalizerPolicy::default())
}

fn excluded_names(catalog: &Catalog, excluded: &ExclusionSet) -> HashSet<String> {
    catalog
        .cards()
        .iter()
        .filter(|card| excluded.contains(card.id))
        .map(|card| card.name.clone())
        .collect()
}

#[test]
fn set_code_strategy_switch_is_semantically_invisible() {
    let catalog = wide_catalog();
    let index = FacetIndex::build(&catalog);

    // 2 of 10 sets: direct-union side of the switch
    let few = FilterSpec {
        excluded_sets: vec!["s00".to_string(), "s01".to_string()],
        ..FilterSpec::default()
    };
    // 8 of 10 sets: complement side of the switch
    let most = FilterSpec {
        excluded_sets: (2..10).map(|i| format!("s{i:02}")).collect(),
        ..FilterSpec::default()
    };

    let few_excluded = index.compile_exclusions(&few, &HashSet::new());
    let most_excluded = index.compile_exclusions(&most, &HashSet::new());

    // the two requests exclude complementary halves of the catalog
    let expect_few: HashSet<String> = catalog
        .cards()
        .iter()
        .filter(|card| card.set_code == "s00" || card.set_code == "s01")
        .map(|card| card.name.clone())
        .collect();
    assert_eq!(excluded_names(&catalog, &few_excluded), expect_few);

    let expect_most: HashSet<String> = catalog
        .cards()
        .iter()
        .filter(|card| card.set_code != "s00" && card.set_code != "s01")
        .map(|card| card.name.clone())
        .collect();
    assert_eq!(excluded_names(&catalog, &most_excluded), expect_most);

    // together they cover the catalog exactly once
    assert_eq!(few_excluded.len() + most_excluded.len(), catalog.len());
}

#[test]
fn compiled_exclusion_always_contains_voted_ids() {
    let catalog = wide_catalog();
    let index = FacetIndex::build(&catalog);
    let voted: HashSet<CardId> = catalog
        .cards()
        .iter()
        .step_by(3)
        .map(|card| card.id)
        .collect();

    for spec in [
        FilterSpec::default(),
        FilterSpec {
            formats: vec![Format::Commander],
            ..FilterSpec::default()
        },
        FilterSpec {
            colors: Some(ColorFilter {
                exclusive: true,
                red: true,
                ..ColorFilter::default()
            }),
            excluded_rarities: vec![Rarity::Common],
            ..FilterSpec::default()
        },
    ] {
        let excluded = index.compile_exclusions(&spec, &voted);
        for id in &voted {
            assert!(excluded.contains(*id), "voted id escaped the exclusion");
        }
    }
}

#[test]
fn selection_respects_compiled_exclusions() {
    let catalog = wide_catalog();
    let index = FacetIndex::build(&catalog);
    let mut rng = StdRng::seed_from_u64(42);

    // exclude all but green cards via inclusive color flags
    let spec = FilterSpec {
        colors: Some(ColorFilter {
            green: true,
            ..ColorFilter::default()
        }),
        ..FilterSpec::default()
    };
    let excluded = index.compile_exclusions(&spec, &HashSet::new());

    for _ in 0..100 {
        let picked = select_random(&mut rng, &excluded, &catalog)
            .expect("green cards remain selectable");
        let card: &Card = catalog.get(picked).expect("picked id is in the catalog");
        assert!(card.colors.contains(Color::Green));
        assert!(!excluded.contains(picked));
    }
}

#[test]
fn exhausted_filter_yields_no_candidates_not_a_hang() {
    let catalog = wide_catalog();
    let index = FacetIndex::build(&catalog);
    let mut rng = StdRng::seed_from_u64(7);

    // no fixture card has mana value 15, so everything is excluded
    let spec = FilterSpec {
        mana_value: Some(15),
        ..FilterSpec::default()
    };
    let excluded = index.compile_exclusions(&spec, &HashSet::new());
    assert_eq!(index.remaining_count(&excluded), 0);

    for _ in 0..10 {
        assert_eq!(select_random(&mut rng, &excluded, &catalog), None);
    }
}

#[test]
fn remaining_count_tracks_exclusion_size() {
    let catalog = wide_catalog();
    let index = FacetIndex::build(&catalog);

    let none = index.compile_exclusions(&FilterSpec::default(), &HashSet::new());
    assert_eq!(index.remaining_count(&none), catalog.len());

    let spec = FilterSpec {
        excluded_sets: vec!["s05".to_string()],
        ..FilterSpec::default()
    };
    let some = index.compile_exclusions(&spec, &HashSet::new());
    assert_eq!(index.remaining_count(&some), catalog.len() - 5);
}

#[test]
fn filter_payload_end_to_end() {
    let catalog = wide_catalog();
    let index = FacetIndex::build(&catalog);
    let mut rng = StdRng::seed_from_u64(3);

    let spec: FilterSpec = serde_json::from_str(
        r#"{
            "colors": {"white": true, "blue": true},
            "formats": ["commander"],
            "excludedSets": ["s09"]
        }"#,
    )
    .expect("payload parses");
    let excluded = index.compile_exclusions(&spec, &HashSet::new());

    let candidate = catalog.cards()[0].id;
    if let Some(picked) = select(&mut rng, candidate, &excluded, &catalog) {
        let card = catalog.get(picked).expect("picked id is in the catalog");
        assert_ne!(card.set_code, "s09");
        assert!(card.is_legal(Format::Commander));
        assert!(!card.colors.contains(Color::Black));
        assert!(!card.colors.contains(Color::Red));
        assert!(!card.colors.contains(Color::Green));
    } else {
        panic!("white/blue commander cards remain in the fixture catalog");
    }
}
