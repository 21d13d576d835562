//! Inert newtypes shared across the engine.
//!
//! These follow the newtype pattern: they are sent around and inspected, but have no active
//! behavior of their own. The API for using them is defined in this module.

use borsh::{BorshDeserialize, BorshSerialize};
use std::{
    fmt::{self, Display, Formatter},
    time::{Duration, SystemTime},
};

/// Id of a votable target (a post or a comment). Opaque and unique across both kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, BorshDeserialize, BorshSerialize)]
pub struct TargetId(u64);

impl TargetId {
    pub const fn new(int: u64) -> Self {
        Self(int)
    }

    pub const fn int(&self) -> u64 {
        self.0
    }

    pub fn to_le_bytes(&self) -> [u8; 8] {
        self.0.to_le_bytes()
    }
}

impl Display for TargetId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Id of a user casting votes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, BorshDeserialize, BorshSerialize)]
pub struct VoterId(u64);

impl VoterId {
    pub const fn new(int: u64) -> Self {
        Self(int)
    }

    pub const fn int(&self) -> u64 {
        self.0
    }

    pub fn to_le_bytes(&self) -> [u8; 8] {
        self.0.to_le_bytes()
    }
}

impl Display for VoterId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Id of a community. Posts (and only posts) belong to exactly one community.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, BorshDeserialize, BorshSerialize)]
pub struct CommunityId(u64);

impl CommunityId {
    pub const fn new(int: u64) -> Self {
        Self(int)
    }

    pub const fn int(&self) -> u64 {
        self.0
    }
}

impl Display for CommunityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Count of approval (up-direction) votes on a target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, BorshDeserialize, BorshSerialize)]
pub struct VoteCount(u64);

impl VoteCount {
    pub const fn new(int: u64) -> Self {
        Self(int)
    }

    pub const fn int(&self) -> u64 {
        self.0
    }
}

impl Display for VoteCount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// A point in time expressed as float seconds since the Unix epoch. Creation times and ranking
/// scores share this unit, which is what lets a vote "buy" a post extra time at the head of the
/// recency-weighted ranking.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct UnixSeconds(f64);

impl UnixSeconds {
    pub const fn new(secs: f64) -> Self {
        Self(secs)
    }

    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs_f64())
            .unwrap_or(0.0);
        Self(secs)
    }

    pub const fn secs(&self) -> f64 {
        self.0
    }

    /// Seconds elapsed from `earlier` to `self`. Negative if `earlier` is in the future.
    pub fn since(&self, earlier: UnixSeconds) -> f64 {
        self.0 - earlier.0
    }

    pub fn plus(&self, duration: Duration) -> UnixSeconds {
        UnixSeconds(self.0 + duration.as_secs_f64())
    }
}

impl Display for UnixSeconds {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// The two kinds of votable target. Each kind has its own time index, score index and ledger
/// namespace in the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Post,
    Comment,
}

impl Display for TargetKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Post => write!(f, "Post"),
            TargetKind::Comment => write!(f, "Comment"),
        }
    }
}

/// Direction of a recorded vote. A requested direction is `Option<VoteDirection>`, with `None`
/// meaning "withdraw my vote"; an absent ledger record likewise reads back as `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    /// The numeric value stored in the ledger and fed into delta computation.
    pub const fn value(&self) -> f64 {
        match self {
            VoteDirection::Up => 1.0,
            VoteDirection::Down => -1.0,
        }
    }

    pub fn from_value(value: f64) -> Option<VoteDirection> {
        if value == 1.0 {
            Some(VoteDirection::Up)
        } else if value == -1.0 {
            Some(VoteDirection::Down)
        } else {
            None
        }
    }
}

/// The numeric value of a requested or recorded direction, with absence counting as 0.
pub fn direction_value(direction: Option<VoteDirection>) -> f64 {
    direction.map_or(0.0, |d| d.value())
}

impl Display for VoteDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            VoteDirection::Up => write!(f, "Up"),
            VoteDirection::Down => write!(f, "Down"),
        }
    }
}

/// Which of the two ordered indexes a ranking query pages over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RankOrder {
    /// Order by creation time ("recent").
    Time,
    /// Order by popularity score ("hot").
    Score,
}

impl Display for RankOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RankOrder::Time => write!(f, "Time"),
            RankOrder::Score => write!(f, "Score"),
        }
    }
}
