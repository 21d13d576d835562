//! Definitions of engine events for event handling and logging.
//! Note: an event for a given action indicates that the action's write batch has committed.

use crate::types::basic::{CommunityId, TargetId, TargetKind, VoteCount, VoteDirection, VoterId};
use std::sync::mpsc::Sender;
use std::time::SystemTime;

pub enum Event {
    TargetRegistered(TargetRegisteredEvent),
    VoteCast(VoteCastEvent),
    TargetPurged(TargetPurgedEvent),
    StaleEntriesRemoved(StaleEntriesRemovedEvent),
}

impl Event {
    pub(crate) fn publish(event_publisher: &Option<Sender<Event>>, event: Event) {
        if let Some(event_publisher) = event_publisher {
            // The bus thread may already have shut down; events are best-effort.
            let _ = event_publisher.send(event);
        }
    }
}

pub struct TargetRegisteredEvent {
    pub timestamp: SystemTime,
    pub kind: TargetKind,
    pub target: TargetId,
    pub community: Option<CommunityId>,
    pub initial_score: f64,
}

pub struct VoteCastEvent {
    pub timestamp: SystemTime,
    pub kind: TargetKind,
    pub target: TargetId,
    pub voter: VoterId,
    pub direction: Option<VoteDirection>,
    pub score_delta: f64,
    pub approval_count: VoteCount,
}

pub struct TargetPurgedEvent {
    pub timestamp: SystemTime,
    pub kind: TargetKind,
    pub target: TargetId,
    /// Number of child comments purged in the same batch. Always 0 for comments.
    pub children_purged: usize,
}

pub struct StaleEntriesRemovedEvent {
    pub timestamp: SystemTime,
    pub kind: TargetKind,
    pub removed: usize,
}
