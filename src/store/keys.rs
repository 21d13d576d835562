//! Namespaced keys under which the engine's structures live in the user-provided store.
//!
//! Every key starts with [`KEY_PREFIX`] so that a shared store can be queried and split by
//! namespace. Per target kind there are three structures: a time index (sorted set of target id
//! → creation time), a score index (sorted set of target id → score), and one vote ledger per
//! target (sorted set of voter id → direction value). Communities additionally get one plain set
//! of post ids each.
//!
//! Members appended to a key prefix (target ids in ledger keys, community ids in membership
//! keys) are the 8-byte little-endian encoding of the id, which coincides with its borsh
//! encoding.

use crate::types::basic::{CommunityId, TargetId, TargetKind};

pub const KEY_PREFIX: &[u8] = b"hotrank:";

const POST_TIME: &[u8] = b"post:time";
const POST_SCORE: &[u8] = b"post:score";
const POST_VOTED: &[u8] = b"post:voted:";
const COMMENT_TIME: &[u8] = b"comment:time";
const COMMENT_SCORE: &[u8] = b"comment:score";
const COMMENT_VOTED: &[u8] = b"comment:voted:";
const COMMUNITY_POSTS: &[u8] = b"community:";

/// Key of the time index (target id → creation time) for `kind`.
pub fn time_index(kind: TargetKind) -> Vec<u8> {
    match kind {
        TargetKind::Post => combine(KEY_PREFIX, POST_TIME),
        TargetKind::Comment => combine(KEY_PREFIX, COMMENT_TIME),
    }
}

/// Key of the score index (target id → score) for `kind`.
pub fn score_index(kind: TargetKind) -> Vec<u8> {
    match kind {
        TargetKind::Post => combine(KEY_PREFIX, POST_SCORE),
        TargetKind::Comment => combine(KEY_PREFIX, COMMENT_SCORE),
    }
}

/// Key of the vote ledger (voter id → direction value) of one target.
pub fn vote_ledger(kind: TargetKind, target: TargetId) -> Vec<u8> {
    let prefix = match kind {
        TargetKind::Post => combine(KEY_PREFIX, POST_VOTED),
        TargetKind::Comment => combine(KEY_PREFIX, COMMENT_VOTED),
    };
    combine(&prefix, &target.to_le_bytes())
}

/// Key of the set of post ids belonging to one community.
pub fn community_posts(community: CommunityId) -> Vec<u8> {
    let prefix = combine(KEY_PREFIX, COMMUNITY_POSTS);
    combine(&prefix, &community.int().to_le_bytes())
}

/// Concatenate two byteslices into one vector.
pub fn combine(a: &[u8], b: &[u8]) -> Vec<u8> {
    let mut res = Vec::with_capacity(a.len() + b.len());
    res.extend_from_slice(a);
    res.extend_from_slice(b);
    res
}
