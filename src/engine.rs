//! Methods to build and run the engine.
//!
//! The key components of this module are:
//! - The builder-pattern interface to construct a [specification of the engine](EngineSpec)
//!   with:
//!   1. `EngineSpec::builder` to construct an `EngineSpecBuilder`,
//!   2. The setters of the `EngineSpecBuilder`, and
//!   3. The `EngineSpecBuilder::build` method to construct an [EngineSpec],
//! - The function to [start](EngineSpec::start) an [Engine] given its specification,
//! - [The type](Engine) which keeps the engine's background threads alive.
//!
//! ## Starting an engine
//!
//! ```ignore
//! let engine =
//!     EngineSpec::builder()
//!     .store(store)
//!     .configuration(configuration)
//!     .on_vote_cast(vote_handler)
//!     .build()
//!     .start();
//! ```
//!
//! ### Required setters
//!
//! - `.store(...)`
//! - `.configuration(...)`
//!
//! ### Optional setters
//!
//! The optional setters register user-defined handlers for events from [crate::events]:
//! - `.on_target_registered(...)`
//! - `.on_vote_cast(...)`
//! - `.on_target_purged(...)`
//! - `.on_stale_entries_removed(...)`

use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;

use typed_builder::TypedBuilder;

use crate::config::Configuration;
use crate::event_bus::{start_event_bus, EventHandlers, HandlerPtr};
use crate::events::*;
use crate::ranking::reconcile::{start_reconciler, ReconcileRequest};
use crate::ranking::{RankingEngine, VoteError};
use crate::store::pluggables::{RankStore, StoreError};
use crate::types::basic::{
    CommunityId, RankOrder, TargetId, TargetKind, VoteCount, VoteDirection, VoterId,
};
use crate::types::target::Target;

/// Stores all necessary parameters and trait implementations required to run an [Engine].
#[derive(TypedBuilder)]
#[builder(builder_method(doc = "
    Create a builder for building an [EngineSpec]. On the builder call the following methods to
    construct a valid [EngineSpec].

    Required:
    - `.store(...)`
    - `.configuration(...)`

    Optional:
    - `.on_target_registered(...)`
    - `.on_vote_cast(...)`
    - `.on_target_purged(...)`
    - `.on_stale_entries_removed(...)`
"))]
pub struct EngineSpec<S: RankStore> {
    // Required parameters
    #[builder(setter(doc = "Set the implementation of the backing sorted-set store. The argument must implement the [RankStore](crate::store::pluggables::RankStore) trait. Required."))]
    store: S,
    #[builder(setter(doc = "Set the [configuration](Configuration). Required."))]
    configuration: Configuration,
    // Optional parameters
    #[builder(default, setter(transform = |handler: impl Fn(&TargetRegisteredEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<TargetRegisteredEvent>),
    doc = "Register a handler closure to be invoked after a target is registered. Optional."))]
    on_target_registered: Option<HandlerPtr<TargetRegisteredEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&VoteCastEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<VoteCastEvent>),
    doc = "Register a handler closure to be invoked after a vote transition commits. Optional."))]
    on_vote_cast: Option<HandlerPtr<VoteCastEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&TargetPurgedEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<TargetPurgedEvent>),
    doc = "Register a handler closure to be invoked after a target is purged. Optional."))]
    on_target_purged: Option<HandlerPtr<TargetPurgedEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&StaleEntriesRemovedEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<StaleEntriesRemovedEvent>),
    doc = "Register a handler closure to be invoked after the reconciler removes stale index entries. Optional."))]
    on_stale_entries_removed: Option<HandlerPtr<StaleEntriesRemovedEvent>>,
}

impl<S: RankStore> EngineSpec<S> {
    /// Starts the background threads associated with running the engine, and returns the handle
    /// to them in an [Engine] struct.
    pub fn start(self) -> Engine<S> {
        let event_handlers = EventHandlers::new(
            self.configuration.log_events,
            self.on_target_registered,
            self.on_vote_cast,
            self.on_target_purged,
            self.on_stale_entries_removed,
        );

        let (event_publisher, event_subscriber) = if !event_handlers.is_empty() {
            Some(mpsc::channel()).unzip()
        } else {
            (None, None)
        };

        let core = Arc::new(RankingEngine::new(
            self.store,
            self.configuration,
            event_publisher,
        ));

        let (reconcile_requests, reconcile_receiver) = mpsc::channel();
        let (reconciler_shutdown, reconciler_shutdown_receiver) = mpsc::channel();
        let reconciler = start_reconciler(
            Arc::clone(&core),
            reconcile_receiver,
            reconciler_shutdown_receiver,
        );

        let (event_bus_shutdown, event_bus_shutdown_receiver) = if !event_handlers.is_empty() {
            Some(mpsc::channel()).unzip()
        } else {
            (None, None)
        };

        let event_bus = if !event_handlers.is_empty() {
            Some(start_event_bus(
                event_handlers,
                event_subscriber.unwrap(), // Safety: should be Some(...).
                event_bus_shutdown_receiver.unwrap(), // Safety: should be Some(...).
            ))
        } else {
            None
        };

        Engine {
            core,
            reconciler: Some(reconciler),
            reconciler_shutdown,
            reconcile_requests,
            event_bus,
            event_bus_shutdown,
        }
    }
}

/// A handle to a running engine and its background threads. When this value is dropped, the
/// reconciler and the event bus are gracefully shut down.
pub struct Engine<S: RankStore> {
    core: Arc<RankingEngine<S>>,
    reconciler: Option<JoinHandle<()>>,
    reconciler_shutdown: Sender<()>,
    reconcile_requests: Sender<ReconcileRequest>,
    event_bus: Option<JoinHandle<()>>,
    event_bus_shutdown: Option<Sender<()>>,
}

impl<S: RankStore> Engine<S> {
    /// Register a freshly created target. Called by the content service after the durable row
    /// has been inserted.
    pub fn register_target(&self, target: &Target) -> Result<(), StoreError> {
        self.core.register_target(target)
    }

    /// Run the vote state machine for one request. On success, returns the target's fresh
    /// approval count.
    pub fn cast_vote(
        &self,
        voter: VoterId,
        kind: TargetKind,
        target: TargetId,
        requested: Option<VoteDirection>,
    ) -> Result<VoteCount, VoteError> {
        self.core.cast_vote(voter, kind, target, requested)
    }

    /// Whether a target is still open for voting.
    pub fn voting_open(&self, kind: TargetKind, target: TargetId) -> Result<bool, VoteError> {
        self.core.voting_open(kind, target)
    }

    /// One page of target ids, descending by the chosen order, optionally scoped to one
    /// community. `page` is 1-based.
    pub fn ranked_page(
        &self,
        kind: TargetKind,
        order: RankOrder,
        community: Option<CommunityId>,
        page: u64,
        size: u64,
    ) -> Result<Vec<TargetId>, StoreError> {
        self.core.ranked_page(kind, order, community, page, size)
    }

    /// Approval counts for a batch of ids, order preserved, one multiplexed round-trip.
    pub fn approval_counts(
        &self,
        kind: TargetKind,
        targets: &[TargetId],
    ) -> Result<Vec<VoteCount>, StoreError> {
        self.core.approval_counts(kind, targets)
    }

    /// A page of ids together with their approval counts.
    pub fn list_ranked(
        &self,
        kind: TargetKind,
        order: RankOrder,
        community: Option<CommunityId>,
        page: u64,
        size: u64,
    ) -> Result<(Vec<TargetId>, Vec<VoteCount>), StoreError> {
        self.core.list_ranked(kind, order, community, page, size)
    }

    /// Purge a soft-deleted post and all of its child comments. The caller collects
    /// `child_comments` from the durable store before the soft-delete commits.
    pub fn purge_post(
        &self,
        post: TargetId,
        community: CommunityId,
        child_comments: &[TargetId],
    ) -> Result<(), StoreError> {
        self.core.purge_post(post, community, child_comments)
    }

    /// Purge a soft-deleted comment.
    pub fn purge_comment(&self, comment: TargetId) -> Result<(), StoreError> {
        self.core.purge_comment(comment)
    }

    /// Hand a batch of unresolvable ranked ids to the reconciler. Returns immediately; the
    /// removal happens on the reconciler thread and is never awaited by the read path.
    pub fn request_reconcile(&self, kind: TargetKind, ids: Vec<TargetId>) {
        if self
            .reconcile_requests
            .send(ReconcileRequest { kind, ids })
            .is_err()
        {
            log::warn!("reconciler thread is gone; dropping reconcile request");
        }
    }
}

impl<S: RankStore> Drop for Engine<S> {
    fn drop(&mut self) {
        // The reconciler publishes events, so it is shut down before the event bus.
        let _ = self.reconciler_shutdown.send(());
        if let Some(reconciler) = self.reconciler.take() {
            let _ = reconciler.join();
        }

        if let Some(shutdown) = &self.event_bus_shutdown {
            let _ = shutdown.send(());
        }
        if let Some(event_bus) = self.event_bus.take() {
            let _ = event_bus.join();
        }
    }
}
