//! A vote-ranking engine for user-generated content, generic over a pluggable sorted-set store.
//!
//! The engine maintains the hot state that a forum's durable store is bad at serving: per-target
//! vote ledgers, time- and score-ordered indexes over posts and comments, community membership
//! sets, and the derived approval counts. Every vote transition commits as one atomic batch
//! against the [store](crate::store), so a concurrent reader never sees a ledger entry without
//! its score adjustment or vice versa.
//!
//! To use the crate:
//! 1. Implement [`RankStore`](store::pluggables::RankStore) for your backing store, or use the
//!    bundled [`RedisRankStore`](store::redis::RedisRankStore).
//! 2. Build a [`Configuration`](config::Configuration).
//! 3. Build an [`EngineSpec`](engine::EngineSpec) and [`start`](engine::EngineSpec::start) it.
//! 4. Drive it through the [`Engine`](engine::Engine) handle: `register_target`, `cast_vote`,
//!    `ranked_page`, `list_ranked`, `purge_post`, `purge_comment`, `request_reconcile`.

pub mod config;

pub mod engine;

pub mod events;

pub(crate) mod event_bus;

pub(crate) mod logging;

pub mod ranking;

pub mod store;

pub mod types;
