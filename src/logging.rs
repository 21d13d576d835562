//! Functions that log out events.
//!
//! The logs defined in this module are printed if the user enabled them via the engine's
//! [config](crate::config::Configuration).
//!
//! The engine logs using the [log](https://docs.rs/log/latest/log/) crate. To get these messages
//! printed onto a terminal or to a file, set up a
//! [logging implementation](https://docs.rs/log/latest/log/#available-logging-implementations).
//!
//! ## Log message format
//!
//! Log messages are CSVs (Comma Separated Values) with at least two values. The first two values
//! are always:
//! 1. The name of the [event](crate::events) in PascalCase (defined in this module as constants).
//! 2. The time the event was emitted (as number of seconds since the Unix Epoch).
//!
//! The rest of the values differ depending on the kind of event. For example, the following
//! snippet is how a [VoteCast](crate::events::VoteCastEvent) is printed:
//!
//! ```text
//! VoteCast, 1701329264, Post, 8231, 114, Up, 432, 3
//! ```
//!
//! In the snippet, the values after the timestamp are the target kind, the target id, the voter
//! id, the new direction (`Withdrawn` for a removed vote), the score delta, and the fresh
//! approval count.

use crate::events::*;
use log;
use std::time::SystemTime;

// Names of each event in PascalCase for printing:
pub const TARGET_REGISTERED: &str = "TargetRegistered";
pub const VOTE_CAST: &str = "VoteCast";
pub const TARGET_PURGED: &str = "TargetPurged";
pub const STALE_ENTRIES_REMOVED: &str = "StaleEntriesRemoved";

/// Implemented by event types. Used to get a closure that logs the event.
pub(crate) trait Logger {
    /// Returns a pointer to the default logging handler for a given event type.
    fn get_logger() -> Box<dyn Fn(&Self) + Send>;
}

impl Logger for TargetRegisteredEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |target_registered_event: &TargetRegisteredEvent| {
            log::info!(
                "{}, {}, {}, {}, {}, {}",
                TARGET_REGISTERED,
                secs_since_unix_epoch(target_registered_event.timestamp),
                target_registered_event.kind,
                target_registered_event.target,
                community_info(&target_registered_event.community),
                target_registered_event.initial_score,
            )
        };
        Box::new(logger)
    }
}

impl Logger for VoteCastEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |vote_cast_event: &VoteCastEvent| {
            log::info!(
                "{}, {}, {}, {}, {}, {}, {}, {}",
                VOTE_CAST,
                secs_since_unix_epoch(vote_cast_event.timestamp),
                vote_cast_event.kind,
                vote_cast_event.target,
                vote_cast_event.voter,
                direction_info(&vote_cast_event.direction),
                vote_cast_event.score_delta,
                vote_cast_event.approval_count,
            )
        };
        Box::new(logger)
    }
}

impl Logger for TargetPurgedEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |target_purged_event: &TargetPurgedEvent| {
            log::info!(
                "{}, {}, {}, {}, {}",
                TARGET_PURGED,
                secs_since_unix_epoch(target_purged_event.timestamp),
                target_purged_event.kind,
                target_purged_event.target,
                target_purged_event.children_purged,
            )
        };
        Box::new(logger)
    }
}

impl Logger for StaleEntriesRemovedEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |stale_entries_removed_event: &StaleEntriesRemovedEvent| {
            log::info!(
                "{}, {}, {}, {}",
                STALE_ENTRIES_REMOVED,
                secs_since_unix_epoch(stale_entries_removed_event.timestamp),
                stale_entries_removed_event.kind,
                stale_entries_removed_event.removed,
            )
        };
        Box::new(logger)
    }
}

fn secs_since_unix_epoch(timestamp: SystemTime) -> u64 {
    timestamp
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

fn direction_info(direction: &Option<crate::types::basic::VoteDirection>) -> String {
    match direction {
        Some(direction) => direction.to_string(),
        None => String::from("Withdrawn"),
    }
}

fn community_info(community: &Option<crate::types::basic::CommunityId>) -> String {
    match community {
        Some(community) => community.to_string(),
        None => String::from("-"),
    }
}
