//! Tests the vote state machine: every legal transition moves the score by the right number of
//! vote units, every illegal request is rejected without changing any state, and the time-window
//! policy closes voting one window after creation.

use std::time::Duration;

use log::LevelFilter;

use hotrank::config::{Configuration, VOTE_UNIT};
use hotrank::engine::EngineSpec;
use hotrank::ranking::VoteError;
use hotrank::store::accessors::RankReadExt;
use hotrank::types::basic::{
    CommunityId, TargetId, TargetKind, UnixSeconds, VoteCount, VoteDirection, VoterId,
};
use hotrank::types::target::Target;

mod common;

use crate::common::{logging::setup_logger, mem_store::MemStore};

#[test]
fn vote_transition_magnitudes_test() {
    setup_logger(LevelFilter::Trace);

    // 1. Start an engine over an empty in-memory store and register one post.
    let store = MemStore::new();
    let engine = EngineSpec::builder()
        .store(store.clone())
        .configuration(Configuration::builder().log_events(true).build())
        .build()
        .start();

    let post = TargetId::new(1);
    let voter = VoterId::new(10);
    let created_at = UnixSeconds::now();
    engine
        .register_target(&Target::post(post, CommunityId::new(7), created_at))
        .unwrap();

    // 2. A fresh post's score is its creation time plus one vote unit.
    let initial_score = created_at.secs() + VOTE_UNIT;
    assert_eq!(
        store.score(TargetKind::Post, post).unwrap(),
        Some(initial_score)
    );

    // 3. Walk the six transitions. Each moves the score by vote_unit times the direction delta.

    // 3.1. None -> Up: +1 unit, and the approval count becomes 1.
    let count = engine
        .cast_vote(voter, TargetKind::Post, post, Some(VoteDirection::Up))
        .unwrap();
    assert_eq!(count, VoteCount::new(1));
    assert_eq!(
        store.score(TargetKind::Post, post).unwrap(),
        Some(initial_score + VOTE_UNIT)
    );

    // 3.2. Up -> Down: -2 units, approval count back to 0.
    let count = engine
        .cast_vote(voter, TargetKind::Post, post, Some(VoteDirection::Down))
        .unwrap();
    assert_eq!(count, VoteCount::new(0));
    assert_eq!(
        store.score(TargetKind::Post, post).unwrap(),
        Some(initial_score - VOTE_UNIT)
    );

    // 3.3. Down -> None (withdrawal): +1 unit, and the ledger record disappears.
    engine.cast_vote(voter, TargetKind::Post, post, None).unwrap();
    assert_eq!(
        store.score(TargetKind::Post, post).unwrap(),
        Some(initial_score)
    );
    assert_eq!(
        store.vote_direction(TargetKind::Post, post, voter).unwrap(),
        None
    );

    // 3.4. None -> Down: -1 unit.
    engine
        .cast_vote(voter, TargetKind::Post, post, Some(VoteDirection::Down))
        .unwrap();
    assert_eq!(
        store.score(TargetKind::Post, post).unwrap(),
        Some(initial_score - VOTE_UNIT)
    );

    // 3.5. Down -> Up: +2 units.
    engine
        .cast_vote(voter, TargetKind::Post, post, Some(VoteDirection::Up))
        .unwrap();
    assert_eq!(
        store.score(TargetKind::Post, post).unwrap(),
        Some(initial_score + VOTE_UNIT)
    );

    // 3.6. Up -> None: -1 unit. The full cycle nets out to the initial score.
    engine.cast_vote(voter, TargetKind::Post, post, None).unwrap();
    assert_eq!(
        store.score(TargetKind::Post, post).unwrap(),
        Some(initial_score)
    );

    // 4. Two voters are independent: each contributes one unit and one approval record.
    let second_voter = VoterId::new(11);
    engine
        .cast_vote(voter, TargetKind::Post, post, Some(VoteDirection::Up))
        .unwrap();
    let count = engine
        .cast_vote(second_voter, TargetKind::Post, post, Some(VoteDirection::Up))
        .unwrap();
    assert_eq!(count, VoteCount::new(2));
    assert_eq!(
        store.score(TargetKind::Post, post).unwrap(),
        Some(initial_score + 2.0 * VOTE_UNIT)
    );
}

#[test]
fn duplicate_vote_rejection_test() {
    setup_logger(LevelFilter::Trace);

    // 1. Start an engine and register one comment under a post.
    let store = MemStore::new();
    let engine = EngineSpec::builder()
        .store(store.clone())
        .configuration(Configuration::builder().build())
        .build()
        .start();

    let comment = TargetId::new(2);
    let voter = VoterId::new(10);
    let created_at = UnixSeconds::now();
    engine
        .register_target(&Target::comment(comment, TargetId::new(1), created_at))
        .unwrap();

    // 2. Withdrawing when no vote stands is a duplicate of the absent state.
    let err = engine
        .cast_vote(voter, TargetKind::Comment, comment, None)
        .unwrap_err();
    assert!(matches!(err, VoteError::DuplicateVote));

    // 3. Re-requesting the recorded direction is rejected, and neither the score nor the ledger
    //    moves.
    engine
        .cast_vote(voter, TargetKind::Comment, comment, Some(VoteDirection::Up))
        .unwrap();
    let score_before = store.score(TargetKind::Comment, comment).unwrap();

    let err = engine
        .cast_vote(voter, TargetKind::Comment, comment, Some(VoteDirection::Up))
        .unwrap_err();
    assert!(matches!(err, VoteError::DuplicateVote));
    assert_eq!(store.score(TargetKind::Comment, comment).unwrap(), score_before);
    assert_eq!(
        store
            .vote_direction(TargetKind::Comment, comment, voter)
            .unwrap(),
        Some(VoteDirection::Up)
    );
}

#[test]
fn voting_window_test() {
    setup_logger(LevelFilter::Trace);

    // 1. Start an engine with the default one-week window.
    let store = MemStore::new();
    let engine = EngineSpec::builder()
        .store(store.clone())
        .configuration(Configuration::builder().build())
        .build()
        .start();

    // 2. Register one fresh post and one created eight days ago.
    let now = UnixSeconds::now();
    let fresh = TargetId::new(1);
    let stale = TargetId::new(2);
    let eight_days_ago = UnixSeconds::new(now.secs() - Duration::from_secs(8 * 24 * 3600).as_secs_f64());
    engine
        .register_target(&Target::post(fresh, CommunityId::new(7), now))
        .unwrap();
    engine
        .register_target(&Target::post(stale, CommunityId::new(7), eight_days_ago))
        .unwrap();

    // 3. The fresh post accepts votes, the stale one does not.
    assert!(engine.voting_open(TargetKind::Post, fresh).unwrap());
    assert!(!engine.voting_open(TargetKind::Post, stale).unwrap());

    engine
        .cast_vote(VoterId::new(10), TargetKind::Post, fresh, Some(VoteDirection::Up))
        .unwrap();
    let err = engine
        .cast_vote(VoterId::new(10), TargetKind::Post, stale, Some(VoteDirection::Up))
        .unwrap_err();
    assert!(matches!(err, VoteError::VotingClosed));

    // 4. The rejected vote left no trace.
    assert_eq!(
        store
            .vote_direction(TargetKind::Post, stale, VoterId::new(10))
            .unwrap(),
        None
    );
    assert_eq!(
        store.score(TargetKind::Post, stale).unwrap(),
        Some(eight_days_ago.secs() + 432.0)
    );

    // 5. A target that was never registered is unknown, not closed.
    let err = engine
        .cast_vote(
            VoterId::new(10),
            TargetKind::Post,
            TargetId::new(99),
            Some(VoteDirection::Up),
        )
        .unwrap_err();
    assert!(matches!(err, VoteError::UnknownTarget));
    let err = engine.voting_open(TargetKind::Post, TargetId::new(99)).unwrap_err();
    assert!(matches!(err, VoteError::UnknownTarget));
}
