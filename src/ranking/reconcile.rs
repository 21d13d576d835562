//! Cascading purges and asynchronous reconciliation.
//!
//! Purging runs synchronously on the caller's thread, after the durable store has soft-deleted
//! the content: one atomic batch removes every engine structure the target owns, and for posts
//! the same batch covers every child comment (the caller collects child ids from the durable
//! store before the soft-delete commits, while they are still queryable).
//!
//! Reconciliation runs detached. Read paths that notice ranked ids with no durable counterpart
//! hand them to the reconciler thread through a channel and move on; the thread removes the
//! stale index entries and logs failures without ever propagating them back to a reader.

use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};

use crate::events::{Event, StaleEntriesRemovedEvent, TargetPurgedEvent};
use crate::store::accessors::RankWriteBatch;
use crate::store::pluggables::{RankStore, StoreError};
use crate::types::basic::{CommunityId, TargetId, TargetKind};

use super::RankingEngine;

/// A batch of ranked ids that failed to resolve against the durable store.
pub struct ReconcileRequest {
    pub kind: TargetKind,
    pub ids: Vec<TargetId>,
}

impl<S: RankStore> RankingEngine<S> {
    /// Purge a soft-deleted post: its ledger, time and score entries, its community membership,
    /// and the complete engine state of every child comment, in one atomic batch.
    pub fn purge_post(
        &self,
        post: TargetId,
        community: CommunityId,
        child_comments: &[TargetId],
    ) -> Result<(), StoreError> {
        let mut wb = RankWriteBatch::<S::WriteBatch>::new();
        wb.purge_target(TargetKind::Post, post);
        wb.remove_community_post(community, post);
        for comment in child_comments {
            wb.purge_target(TargetKind::Comment, *comment);
        }
        self.store().clone().write(wb.into_inner())?;

        Event::publish(
            self.event_publisher(),
            Event::TargetPurged(TargetPurgedEvent {
                timestamp: SystemTime::now(),
                kind: TargetKind::Post,
                target: post,
                children_purged: child_comments.len(),
            }),
        );
        Ok(())
    }

    /// Purge a soft-deleted comment: its ledger and its time/score entries.
    pub fn purge_comment(&self, comment: TargetId) -> Result<(), StoreError> {
        let mut wb = RankWriteBatch::<S::WriteBatch>::new();
        wb.purge_target(TargetKind::Comment, comment);
        self.store().clone().write(wb.into_inner())?;

        Event::publish(
            self.event_publisher(),
            Event::TargetPurged(TargetPurgedEvent {
                timestamp: SystemTime::now(),
                kind: TargetKind::Comment,
                target: comment,
                children_purged: 0,
            }),
        );
        Ok(())
    }

    /// Remove index entries for targets that no longer exist durably. Also drops their ledger
    /// keys: every structure of a target leaves together.
    pub(crate) fn remove_stale(
        &self,
        kind: TargetKind,
        ids: &[TargetId],
    ) -> Result<(), StoreError> {
        if ids.is_empty() {
            return Ok(());
        }
        let mut wb = RankWriteBatch::<S::WriteBatch>::new();
        for id in ids {
            wb.purge_target(kind, *id);
        }
        self.store().clone().write(wb.into_inner())?;

        Event::publish(
            self.event_publisher(),
            Event::StaleEntriesRemoved(StaleEntriesRemovedEvent {
                timestamp: SystemTime::now(),
                kind,
                removed: ids.len(),
            }),
        );
        Ok(())
    }
}

/// Start the reconciler thread. It drains [`ReconcileRequest`]s until told to shut down;
/// failures are logged and dropped, never surfaced to the read path that filed the request.
pub(crate) fn start_reconciler<S: RankStore>(
    engine: Arc<RankingEngine<S>>,
    requests: Receiver<ReconcileRequest>,
    shutdown_signal: Receiver<()>,
) -> JoinHandle<()> {
    thread::spawn(move || loop {
        match shutdown_signal.try_recv() {
            Ok(()) => return,
            Err(TryRecvError::Empty) => (),
            Err(TryRecvError::Disconnected) => return,
        }

        match requests.recv_timeout(Duration::from_millis(50)) {
            Ok(request) => {
                if let Err(err) = engine.remove_stale(request.kind, &request.ids) {
                    log::warn!(
                        "reconciliation of {} stale {} entries failed: {}",
                        request.ids.len(),
                        request.kind,
                        err
                    );
                }
            }
            Err(RecvTimeoutError::Timeout) => (),
            Err(RecvTimeoutError::Disconnected) => return,
        }
    })
}
