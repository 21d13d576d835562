//! Defines the [`RankStore`] trait, which specifies the required interface for the sorted-set
//! store provided by the user, and the [`WriteBatch`] trait through which all mutation flows.
//!
//! The engine treats every store call as blocking I/O against a shared backend. It never takes an
//! in-process lock around mutation: instead, every logical operation (casting a vote, registering
//! a target, purging a target) is expressed as one `WriteBatch`, and [`RankStore::write`] must
//! apply that batch as a single atomic unit. A crash or a concurrent reader must never observe
//! some of a batch's mutations without the others. Backends can satisfy this with a transactional
//! pipeline (`MULTI`/`EXEC`), a database transaction, or a single mutex around an in-memory map.

use std::fmt::{self, Display, Formatter};

/// A handle to the backing store. Handles are cheap to clone; each engine operation clones the
/// handle it needs, so implementations should put shared state behind an `Arc` or an internal
/// connection pool.
pub trait RankStore: RankRead + Clone + Send + Sync + 'static {
    type WriteBatch: WriteBatch;

    /// Atomically apply every mutation recorded in `wb`. Either all of them become visible, or
    /// (on error) none of them do.
    fn write(&mut self, wb: Self::WriteBatch) -> Result<(), StoreError>;
}

/// Read-side primitives. Each method maps onto one command of a sorted-set store; reads carry no
/// ordering guarantee relative to each other beyond per-call consistency.
pub trait RankRead {
    /// The score recorded for `member` in the sorted set at `key`, or `None` if either the key
    /// or the member is absent.
    fn member_score(&self, key: &[u8], member: &[u8]) -> Result<Option<f64>, StoreError>;

    /// Members of the sorted set at `key` in descending score order, skipping the first
    /// `offset` and returning at most `limit`. Ties are broken by member bytes, descending, so
    /// repeated calls with no intervening writes return the same page.
    fn page_desc(&self, key: &[u8], offset: u64, limit: u64) -> Result<Vec<Vec<u8>>, StoreError>;

    /// Like [`page_desc`](RankRead::page_desc), but returning each member together with its
    /// score.
    fn page_desc_with_scores(
        &self,
        key: &[u8],
        offset: u64,
        limit: u64,
    ) -> Result<Vec<(Vec<u8>, f64)>, StoreError>;

    /// Number of members of the sorted set at `key` whose score lies in `[min, max]`.
    fn count_in_score_range(&self, key: &[u8], min: f64, max: f64) -> Result<u64, StoreError>;

    /// [`count_in_score_range`](RankRead::count_in_score_range) over many keys in **one**
    /// multiplexed round-trip, returning one count per key in the same order. Implementations
    /// must not degrade this into sequential single-key calls: batch listings issue this with
    /// tens of keys on the latency-sensitive read path.
    fn counts_in_score_range(
        &self,
        keys: &[Vec<u8>],
        min: f64,
        max: f64,
    ) -> Result<Vec<u64>, StoreError>;

    /// All members of the plain (unscored) set at `key`, in no particular order.
    fn set_members(&self, key: &[u8]) -> Result<Vec<Vec<u8>>, StoreError>;
}

/// A batch of mutations applied atomically by [`RankStore::write`]. Mutations are recorded in
/// call order and must be applied in call order.
pub trait WriteBatch {
    fn new() -> Self;

    /// Add `delta` to the score of `member` in the sorted set at `key`, treating an absent
    /// member as having score 0. This is a relative increment at the store: two concurrent
    /// batches incrementing the same member both take effect.
    fn increment_member(&mut self, key: &[u8], member: &[u8], delta: f64);

    /// Insert `member` into the sorted set at `key` with exactly `score`, replacing any previous
    /// score.
    fn put_member(&mut self, key: &[u8], member: &[u8], score: f64);

    /// Remove `member` from the sorted set at `key`, if present.
    fn remove_member(&mut self, key: &[u8], member: &[u8]);

    /// Insert `member` into the plain set at `key`.
    fn add_to_set(&mut self, key: &[u8], member: &[u8]);

    /// Remove `member` from the plain set at `key`, if present.
    fn remove_from_set(&mut self, key: &[u8], member: &[u8]);

    /// Delete the whole key, whatever it holds.
    fn delete_key(&mut self, key: &[u8]);
}

/// Error surfaced by store implementations. `Unavailable` is transient: the underlying write is
/// atomic, so callers may retry the whole engine operation from the top. `CorruptMember` means a
/// member read back from the store failed to decode as an id, which only happens if the keyspace
/// was written by something other than this engine.
#[derive(Debug)]
pub enum StoreError {
    Unavailable { detail: String },
    CorruptMember { member: Vec<u8>, source: std::io::Error },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable { detail } => {
                write!(f, "store unavailable: {}", detail)
            }
            StoreError::CorruptMember { member, source } => {
                write!(f, "corrupt member {:?} in store: {}", member, source)
            }
        }
    }
}

impl std::error::Error for StoreError {}
