//! Popularity counters, the external vote store boundary, and the
//! periodic tally pass.
//!
//! Counters live in one table of per-record atomics parallel to the
//! catalog, not on the records themselves; every write goes through the
//! table. A completed tally pass bumps the table's generation number,
//! so readers snapshot a generation-stamped copy instead of reading
//! mid-recompute state. Consistency is eventual, not transactional.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::ids::CardId;

/// The two vote tables of the persistence collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteKind {
    Liked,
    Blocked,
}

impl VoteKind {
    pub const ALL: [VoteKind; 2] = [VoteKind::Liked, VoteKind::Blocked];

    const fn index(self) -> usize {
        match self {
            VoteKind::Liked => 0,
            VoteKind::Blocked => 1,
        }
    }
}

/// One row of a vote table: one user's vote on one card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteRow {
    pub user_id: String,
    pub card_id: CardId,
}

/// Failure reported by a vote store backend. Writes that fail this way
/// are retryable; the in-memory counters are left untouched.
#[derive(Debug, Error)]
#[error("vote store: {message}")]
pub struct VoteStoreError {
    message: String,
}

impl VoteStoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors from the vote mutation path.
#[derive(Debug, Error)]
pub enum VoteError {
    /// The external write did not confirm; safe to retry.
    #[error(transparent)]
    Store(#[from] VoteStoreError),
    /// The card is not in the current catalog.
    #[error("card {0} is not in the catalog")]
    UnknownCard(CardId),
}

/// The external liked/blocked persistence, keyed by user and card.
///
/// Implementations wrap whatever key-value store the deployment uses;
/// the engine only needs full scans, per-user reads, and single-row
/// writes. All methods may fail transiently and are treated as
/// retryable by callers.
#[async_trait]
pub trait VoteStore: Send + Sync {
    /// Every row of the given table, across all users.
    async fn scan(&self, kind: VoteKind) -> Result<Vec<VoteRow>, VoteStoreError>;

    /// All card ids one user has voted into the given table.
    async fn user_votes(
        &self,
        user_id: &str,
        kind: VoteKind,
    ) -> Result<HashSet<CardId>, VoteStoreError>;

    /// Insert one row. Inserting an existing row is a no-op.
    async fn put(
        &self,
        kind: VoteKind,
        user_id: &str,
        card_id: CardId,
    ) -> Result<(), VoteStoreError>;

    /// Delete one row. Deleting a missing row is a no-op.
    async fn remove(
        &self,
        kind: VoteKind,
        user_id: &str,
        card_id: CardId,
    ) -> Result<(), VoteStoreError>;

    /// Whether the user has a row of this kind for this card.
    async fn contains(
        &self,
        kind: VoteKind,
        user_id: &str,
        card_id: CardId,
    ) -> Result<bool, VoteStoreError>;
}

/// In-memory vote store used by tests and the demo binary.
#[derive(Debug, Default)]
pub struct MemoryVoteStore {
    tables: RwLock<[HashMap<String, HashSet<CardId>>; 2]>,
}

impl MemoryVoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, [HashMap<String, HashSet<CardId>>; 2]> {
        // a poisoned lock means a panicked test; propagate the panic
        match self.tables.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, [HashMap<String, HashSet<CardId>>; 2]> {
        match self.tables.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl VoteStore for MemoryVoteStore {
    async fn scan(&self, kind: VoteKind) -> Result<Vec<VoteRow>, VoteStoreError> {
        let tables = self.read();
        let mut rows = Vec::new();
        for (user_id, cards) in &tables[kind.index()] {
            for card_id in cards {
                rows.push(VoteRow {
                    user_id: user_id.clone(),
                    card_id: *card_id,
                });
            }
        }
        Ok(rows)
    }

    async fn user_votes(
        &self,
        user_id: &str,
        kind: VoteKind,
    ) -> Result<HashSet<CardId>, VoteStoreError> {
        Ok(self.read()[kind.index()]
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn put(
        &self,
        kind: VoteKind,
        user_id: &str,
        card_id: CardId,
    ) -> Result<(), VoteStoreError> {
        self.write()[kind.index()]
            .entry(user_id.to_string())
            .or_default()
            .insert(card_id);
        Ok(())
    }

    async fn remove(
        &self,
        kind: VoteKind,
        user_id: &str,
        card_id: CardId,
    ) -> Result<(), VoteStoreError> {
        if let Some(cards) = self.write()[kind.index()].get_mut(user_id) {
            cards.remove(&card_id);
        }
        Ok(())
    }

    async fn contains(
        &self,
        kind: VoteKind,
        user_id: &str,
        card_id: CardId,
    ) -> Result<bool, VoteStoreError> {
        Ok(self.read()[kind.index()]
            .get(user_id)
            .is_some_and(|cards| cards.contains(&card_id)))
    }
}

/// Per-record like/dislike counters, stored as two dense columns of
/// atomics parallel to the catalog positions.
#[derive(Debug)]
pub struct CounterTable {
    liked: Vec<AtomicU32>,
    disliked: Vec<AtomicU32>,
    generation: AtomicU64,
}

impl CounterTable {
    /// One zeroed counter pair per catalog record.
    pub fn for_catalog(catalog: &Catalog) -> Self {
        Self::with_len(catalog.len())
    }

    pub fn with_len(len: usize) -> Self {
        Self {
            liked: (0..len).map(|_| AtomicU32::new(0)).collect(),
            disliked: (0..len).map(|_| AtomicU32::new(0)).collect(),
            generation: AtomicU64::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.liked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.liked.is_empty()
    }

    fn column(&self, kind: VoteKind) -> &[AtomicU32] {
        match kind {
            VoteKind::Liked => &self.liked,
            VoteKind::Blocked => &self.disliked,
        }
    }

    /// Zero one counter column.
    pub fn reset(&self, kind: VoteKind) {
        for counter in self.column(kind) {
            counter.store(0, Ordering::SeqCst);
        }
    }

    pub fn increment(&self, pos: usize, kind: VoteKind) {
        if let Some(counter) = self.column(kind).get(pos) {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Saturating decrement; an underflow is ignored rather than wrapped.
    pub fn decrement(&self, pos: usize, kind: VoteKind) {
        if let Some(counter) = self.column(kind).get(pos) {
            let _ = counter.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| v.checked_sub(1));
        }
    }

    pub fn get(&self, pos: usize, kind: VoteKind) -> u32 {
        self.column(kind)
            .get(pos)
            .map_or(0, |counter| counter.load(Ordering::SeqCst))
    }

    /// Tally passes completed since startup.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn bump_generation(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Generation-stamped copy of both columns for readers.
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            liked: self.liked.iter().map(|c| c.load(Ordering::SeqCst)).collect(),
            disliked: self
                .disliked
                .iter()
                .map(|c| c.load(Ordering::SeqCst))
                .collect(),
            generation: self.generation(),
        }
    }
}

/// Immutable copy of the counter columns at one point in time.
#[derive(Debug, Clone)]
pub struct CounterSnapshot {
    liked: Vec<u32>,
    disliked: Vec<u32>,
    generation: u64,
}

impl CounterSnapshot {
    pub fn liked(&self, pos: usize) -> u32 {
        self.liked.get(pos).copied().unwrap_or(0)
    }

    pub fn disliked(&self, pos: usize) -> u32 {
        self.disliked.get(pos).copied().unwrap_or(0)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What a tally pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TallyOutcome {
    Completed(TallyReport),
    /// A pass was already running; this one was skipped rather than
    /// risk double-counting during the reset.
    SkippedInProgress,
}

/// Row counts of one completed tally pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TallyReport {
    pub liked_rows: usize,
    pub blocked_rows: usize,
    /// Rows referencing cards absent from the current catalog.
    pub unknown_cards: usize,
}

/// Recomputes the popularity counters from full scans of the vote
/// store, once at startup and then on a fixed interval.
pub struct Tallier<S> {
    store: Arc<S>,
    catalog: Arc<Catalog>,
    counters: Arc<CounterTable>,
    running: Mutex<()>,
}

impl<S: VoteStore> Tallier<S> {
    pub fn new(store: Arc<S>, catalog: Arc<Catalog>, counters: Arc<CounterTable>) -> Self {
        Self {
            store,
            catalog,
            counters,
            running: Mutex::new(()),
        }
    }

    /// One full tally pass: reset both columns, then scan the liked and
    /// blocked tables concurrently. The two scans write disjoint
    /// columns, so they need no coordination beyond the final join.
    /// If a pass is already running the call returns immediately.
    pub async fn recompute(&self) -> Result<TallyOutcome, VoteStoreError> {
        let Ok(_guard) = self.running.try_lock() else {
            debug!("tally pass already running, skipping");
            return Ok(TallyOutcome::SkippedInProgress);
        };

        let (liked, blocked) = tokio::try_join!(
            self.scan_into(VoteKind::Liked),
            self.scan_into(VoteKind::Blocked),
        )?;

        self.counters.bump_generation();
        let report = TallyReport {
            liked_rows: liked.0,
            blocked_rows: blocked.0,
            unknown_cards: liked.1 + blocked.1,
        };
        info!(
            liked = report.liked_rows,
            blocked = report.blocked_rows,
            unknown = report.unknown_cards,
            generation = self.counters.generation(),
            "tally pass complete"
        );
        Ok(TallyOutcome::Completed(report))
    }

    /// Scan one table into its counter column. Returns the number of
    /// rows counted and the number skipped for referencing unknown
    /// cards.
    async fn scan_into(&self, kind: VoteKind) -> Result<(usize, usize), VoteStoreError> {
        self.counters.reset(kind);
        let rows = self.store.scan(kind).await?;
        let mut counted = 0usize;
        let mut unknown = 0usize;
        for row in rows {
            match self.catalog.position(row.card_id) {
                Some(pos) => {
                    self.counters.increment(pos, kind);
                    counted += 1;
                }
                None => unknown += 1,
            }
        }
        Ok((counted, unknown))
    }

    /// Run forever: one pass immediately, then one per interval tick.
    /// Failed passes are logged and retried at the next tick.
    pub async fn run(&self, period: Duration) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(err) = self.recompute().await {
                warn!(%err, "tally pass failed");
            }
        }
    }
}

/// Result of a per-user membership probe across both tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteStatus {
    pub liked: bool,
    pub blocked: bool,
}

/// Record one vote: the external write must confirm before the
/// in-memory counter moves, so a failed write cannot drift the counts.
pub async fn cast_vote<S: VoteStore>(
    store: &S,
    counters: &CounterTable,
    catalog: &Catalog,
    user_id: &str,
    card_id: CardId,
    kind: VoteKind,
) -> Result<(), VoteError> {
    let pos = catalog
        .position(card_id)
        .ok_or(VoteError::UnknownCard(card_id))?;
    store.put(kind, user_id, card_id).await?;
    counters.increment(pos, kind);
    Ok(())
}

/// Withdraw one vote, with the same write-then-count ordering as
/// [`cast_vote`].
pub async fn retract_vote<S: VoteStore>(
    store: &S,
    counters: &CounterTable,
    catalog: &Catalog,
    user_id: &str,
    card_id: CardId,
    kind: VoteKind,
) -> Result<(), VoteError> {
    let pos = catalog
        .position(card_id)
        .ok_or(VoteError::UnknownCard(card_id))?;
    store.remove(kind, user_id, card_id).await?;
    counters.decrement(pos, kind);
    Ok(())
}

/// Whether one user has liked and/or blocked one card. The two probes
/// run concurrently.
pub async fn vote_status<S: VoteStore>(
    store: &S,
    user_id: &str,
    card_id: CardId,
) -> Result<VoteStatus, VoteStoreError> {
    let (liked, blocked) = tokio::try_join!(
        store.contains(VoteKind::Liked, user_id, card_id),
        store.contains(VoteKind::Blocked, user_id, card_id),
    )?;
    Ok(VoteStatus { liked, blocked })
}
