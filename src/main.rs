//! Topdeck - random card recommendation engine
//!
//! One-shot CLI over the library: load a card feed, build the facet
//! index, apply a filter payload, and print a random pick plus the
//! current popularity listings.
//!
//! ## Usage
//!
//! ```
//! topdeck <cards.json> [OPTIONS]
//!
//! Options:
//!   --filter <filter.json>   Filter payload to apply (camelCase JSON)
//!   --seed <n>               Seed the RNG for a reproducible pick
//!   --top <n>                Rows to print per ranking (default 5)
//! ```

use std::fs;
use std::process::ExitCode;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::collections::HashSet;
use tracing_subscriber::EnvFilter;

use topdeck::{
    Catalog, CounterTable, EngineConfig, FacetIndex, FilterSpec, MemoryVoteStore, RankOrder,
    Tallier, parse_feed, ranked, select_random,
};

struct Args {
    feed_path: String,
    filter_path: Option<String>,
    seed: Option<u64>,
    top: usize,
}

fn parse_args() -> Result<Args, String> {
    let mut args = std::env::args().skip(1);
    let feed_path = args.next().ok_or("usage: topdeck <cards.json> [OPTIONS]")?;
    let mut parsed = Args {
        feed_path,
        filter_path: None,
        seed: None,
        top: 5,
    };
    while let Some(flag) = args.next() {
        match flag.as_str() {
            "--filter" => {
                parsed.filter_path = Some(args.next().ok_or("--filter needs a path")?);
            }
            "--seed" => {
                let raw = args.next().ok_or("--seed needs a number")?;
                parsed.seed = Some(raw.parse().map_err(|_| format!("bad seed: {raw}"))?);
            }
            "--top" => {
                let raw = args.next().ok_or("--top needs a number")?;
                parsed.top = raw.parse().map_err(|_| format!("bad count: {raw}"))?;
            }
            other => return Err(format!("unknown flag: {other}")),
        }
    }
    Ok(parsed)
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    let config = EngineConfig::from_env();
    let feed_json = match fs::read_to_string(&args.feed_path) {
        Ok(json) => json,
        Err(err) => {
            eprintln!("cannot read {}: {err}", args.feed_path);
            return ExitCode::FAILURE;
        }
    };
    let feed = match parse_feed(&feed_json) {
        Ok(feed) => feed,
        Err(err) => {
            eprintln!("cannot parse {}: {err}", args.feed_path);
            return ExitCode::FAILURE;
        }
    };
    if feed.malformed > 0 {
        eprintln!("dropped {} malformed feed rows", feed.malformed);
    }

    let catalog = Arc::new(Catalog::from_feed(feed.rows, &config.normalizer));
    let index = FacetIndex::build(&catalog);

    let spec = match &args.filter_path {
        Some(path) => {
            let payload = match fs::read_to_string(path) {
                Ok(payload) => payload,
                Err(err) => {
                    eprintln!("cannot read {path}: {err}");
                    return ExitCode::FAILURE;
                }
            };
            match serde_json::from_str::<FilterSpec>(&payload) {
                Ok(spec) => spec,
                Err(err) => {
                    eprintln!("cannot parse {path}: {err}");
                    return ExitCode::FAILURE;
                }
            }
        }
        None => FilterSpec::default(),
    };

    let excluded = index.compile_exclusions(&spec, &HashSet::new());
    println!(
        "{} of {} cards selectable under this filter",
        index.remaining_count(&excluded),
        catalog.len()
    );

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::seed_from_u64(rand::rng().next_u64()),
    };
    match select_random(&mut rng, &excluded, &catalog) {
        Some(id) => {
            if let Some(card) = catalog.get(id) {
                println!(
                    "pick: {} [{}] {} ({:?})",
                    card.name, card.set_code, card.type_line, card.rarity
                );
            }
        }
        None => println!("no candidates remain under this filter"),
    }

    // a fresh store has no votes, but the listing path is the real one
    let store = Arc::new(MemoryVoteStore::new());
    let counters = Arc::new(CounterTable::for_catalog(&catalog));
    let tallier = Tallier::new(store, Arc::clone(&catalog), Arc::clone(&counters));
    if let Err(err) = tallier.recompute().await {
        eprintln!("tally pass failed: {err}");
    }

    let snapshot = counters.snapshot();
    for order in [RankOrder::Top, RankOrder::Controversial, RankOrder::Worst] {
        println!("{order:?}:");
        for row in ranked(&catalog, &snapshot, order, args.top) {
            println!(
                "  {:+} ({} up / {} down)  {}",
                row.score, row.liked, row.disliked, row.card.name
            );
        }
    }

    ExitCode::SUCCESS
}
