//! The core of the engine: target registration, the vote state machine, and the time-window
//! policy. Pagination lives in [`query`], purging and reconciliation in [`reconcile`].
//!
//! # The vote state machine
//!
//! A vote request carries a target, a voter, and a requested direction in {Up, Down, None},
//! where None withdraws any standing vote. With `old` the ledger's current direction for the
//! (target, voter) pair:
//!
//! 1. `old == requested` fails with [`VoteError::DuplicateVote`]. No state changes. This also
//!    rejects withdrawing when no vote stands.
//! 2. A target with no time entry fails with [`VoteError::UnknownTarget`]; a target older than
//!    the voting window fails with [`VoteError::VotingClosed`].
//! 3. `delta = value(requested) − value(old)`, over values Up = 1, Down = −1, None = 0, so
//!    `delta` ranges over {−2, −1, 1, 2}. The score moves by `vote_unit · delta`: flipping a
//!    vote moves the score by two units, casting or withdrawing by one.
//! 4. The ledger write and the score increment commit as one atomic batch. A concurrent reader
//!    never observes one without the other.
//! 5. The fresh approval count (ledger records with direction Up) is returned.

pub mod query;

pub mod reconcile;

use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::sync::mpsc::Sender;
use std::sync::Mutex;
use std::time::{Instant, SystemTime};

use crate::config::Configuration;
use crate::events::{Event, TargetRegisteredEvent, VoteCastEvent};
use crate::store::accessors::{RankReadExt, RankWriteBatch};
use crate::store::pluggables::{RankStore, StoreError};
use crate::types::basic::{
    direction_value, CommunityId, RankOrder, TargetId, TargetKind, UnixSeconds, VoteCount,
    VoteDirection, VoterId,
};
use crate::types::target::Target;

use self::query::CachedIntersection;

/// The engine core, generic over the backing store. Shared behind an `Arc` between request
/// threads and the reconciler; all methods take `&self`.
pub struct RankingEngine<S: RankStore> {
    store: S,
    config: Configuration,
    intersection_cache:
        Mutex<HashMap<(TargetKind, RankOrder, CommunityId), CachedIntersection>>,
    event_publisher: Option<Sender<Event>>,
}

impl<S: RankStore> RankingEngine<S> {
    pub(crate) fn new(
        store: S,
        config: Configuration,
        event_publisher: Option<Sender<Event>>,
    ) -> RankingEngine<S> {
        RankingEngine {
            store,
            config,
            intersection_cache: Mutex::new(HashMap::new()),
            event_publisher,
        }
    }

    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn config(&self) -> &Configuration {
        &self.config
    }

    pub(crate) fn cache_entry(
        &self,
        key: (TargetKind, RankOrder, CommunityId),
    ) -> Option<CachedIntersection> {
        // Cache entries are idempotent recomputations, so a poisoned lock is safe to reuse.
        let cache = self
            .intersection_cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cache.get(&key).cloned()
    }

    pub(crate) fn cache_insert(
        &self,
        key: (TargetKind, RankOrder, CommunityId),
        entry: CachedIntersection,
    ) {
        let mut cache = self
            .intersection_cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cache.insert(key, entry);
    }

    /// Register a freshly created target. The time entry, the score entry (seeded with
    /// `created_at + vote_unit`, so new content starts as if freshly bumped by one vote) and,
    /// for posts, the community membership commit as one atomic batch.
    pub fn register_target(&self, target: &Target) -> Result<(), StoreError> {
        let initial_score = target.created_at().secs() + self.config.vote_unit;
        let mut wb = RankWriteBatch::<S::WriteBatch>::new();
        wb.register_target(target, initial_score);
        self.store.clone().write(wb.into_inner())?;

        Event::publish(
            &self.event_publisher,
            Event::TargetRegistered(TargetRegisteredEvent {
                timestamp: SystemTime::now(),
                kind: target.kind(),
                target: target.id(),
                community: target.community(),
                initial_score,
            }),
        );
        Ok(())
    }

    /// Whether a target is still open for voting. Targets with no time entry (never registered,
    /// or already purged) fail with [`VoteError::UnknownTarget`].
    pub fn voting_open(&self, kind: TargetKind, target: TargetId) -> Result<bool, VoteError> {
        let created_at = self
            .store
            .created_at(kind, target)?
            .ok_or(VoteError::UnknownTarget)?;
        Ok(self.window_open(created_at, UnixSeconds::now()))
    }

    fn window_open(&self, created_at: UnixSeconds, now: UnixSeconds) -> bool {
        now.since(created_at) <= self.config.voting_window.as_secs_f64()
    }

    /// Run the vote state machine for one request and return the target's fresh approval count.
    pub fn cast_vote(
        &self,
        voter: VoterId,
        kind: TargetKind,
        target: TargetId,
        requested: Option<VoteDirection>,
    ) -> Result<VoteCount, VoteError> {
        let old = self.store.vote_direction(kind, target, voter)?;
        if old == requested {
            return Err(VoteError::DuplicateVote);
        }

        let created_at = self
            .store
            .created_at(kind, target)?
            .ok_or(VoteError::UnknownTarget)?;
        if !self.window_open(created_at, UnixSeconds::now()) {
            return Err(VoteError::VotingClosed);
        }

        let delta = direction_value(requested) - direction_value(old);
        let score_delta = self.config.vote_unit * delta;

        let mut wb = RankWriteBatch::<S::WriteBatch>::new();
        wb.apply_vote(kind, target, voter, requested, score_delta);
        self.store.clone().write(wb.into_inner())?;

        let approval_count = self.store.approval_count(kind, target)?;

        Event::publish(
            &self.event_publisher,
            Event::VoteCast(VoteCastEvent {
                timestamp: SystemTime::now(),
                kind,
                target,
                voter,
                direction: requested,
                score_delta,
                approval_count,
            }),
        );
        Ok(approval_count)
    }

    pub(crate) fn event_publisher(&self) -> &Option<Sender<Event>> {
        &self.event_publisher
    }
}

/// A fresh `Instant`, used to timestamp cache entries. Kept here so both the cache reader and
/// writer agree on the clock.
pub(crate) fn cache_now() -> Instant {
    Instant::now()
}

/// Error when processing a vote request. The first three variants are terminal: retrying the
/// identical request cannot succeed. `Store` with
/// [`StoreError::Unavailable`](crate::store::pluggables::StoreError) is transient; a caller may
/// retry, and the retry re-runs the state machine from the duplicate check rather than resuming
/// mid-transition.
#[derive(Debug)]
pub enum VoteError {
    /// The requested direction equals the recorded one; the request is a no-op.
    DuplicateVote,
    /// The target's voting window has elapsed.
    VotingClosed,
    /// The target was never registered, or has been purged.
    UnknownTarget,
    Store(StoreError),
}

impl From<StoreError> for VoteError {
    fn from(err: StoreError) -> Self {
        VoteError::Store(err)
    }
}

impl Display for VoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            VoteError::DuplicateVote => write!(f, "duplicate vote"),
            VoteError::VotingClosed => write!(f, "voting window has elapsed"),
            VoteError::UnknownTarget => write!(f, "unknown target"),
            VoteError::Store(err) => write!(f, "store error: {}", err),
        }
    }
}

impl std::error::Error for VoteError {}
