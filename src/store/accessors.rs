//! Typed views over the raw store primitives.
//!
//! [`RankReadExt`] gives every [`RankRead`] implementation getters for the engine's structures
//! (creation times, scores, ledger directions, approval counts, ranked pages), and
//! [`RankWriteBatch`] wraps a raw [`WriteBatch`] behind mutators that form keys and encode
//! members, so that engine code never touches raw keys.

use borsh::BorshDeserialize;

use crate::types::basic::{
    CommunityId, RankOrder, TargetId, TargetKind, UnixSeconds, VoteCount, VoteDirection, VoterId,
};
use crate::types::target::Target;

use super::keys;
use super::pluggables::{RankRead, StoreError, WriteBatch};

/// Typed read access. Blanket-implemented for every [`RankRead`].
pub trait RankReadExt: RankRead {
    /// Creation time of a target, or `None` if the target was never registered or has been
    /// purged.
    fn created_at(
        &self,
        kind: TargetKind,
        target: TargetId,
    ) -> Result<Option<UnixSeconds>, StoreError> {
        let secs = self.member_score(&keys::time_index(kind), &target.to_le_bytes())?;
        Ok(secs.map(UnixSeconds::new))
    }

    /// Current ranking score of a target, or `None` if it has no score entry.
    fn score(&self, kind: TargetKind, target: TargetId) -> Result<Option<f64>, StoreError> {
        self.member_score(&keys::score_index(kind), &target.to_le_bytes())
    }

    /// The direction `voter` currently has recorded against `target`, or `None` if no vote is
    /// recorded. A ledger value that is neither +1 nor −1 is reported as corrupt.
    fn vote_direction(
        &self,
        kind: TargetKind,
        target: TargetId,
        voter: VoterId,
    ) -> Result<Option<VoteDirection>, StoreError> {
        let ledger = keys::vote_ledger(kind, target);
        match self.member_score(&ledger, &voter.to_le_bytes())? {
            None => Ok(None),
            Some(value) => match VoteDirection::from_value(value) {
                Some(direction) => Ok(Some(direction)),
                None => Err(StoreError::CorruptMember {
                    member: voter.to_le_bytes().to_vec(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("ledger value {} is not a vote direction", value),
                    ),
                }),
            },
        }
    }

    /// Number of up-direction records in a target's ledger.
    fn approval_count(&self, kind: TargetKind, target: TargetId) -> Result<VoteCount, StoreError> {
        let count = self.count_in_score_range(&keys::vote_ledger(kind, target), 1.0, 1.0)?;
        Ok(VoteCount::new(count))
    }

    /// Approval counts for many targets in one multiplexed round-trip, order preserved. A purged
    /// target's ledger key is simply absent and counts as 0.
    fn approval_counts(
        &self,
        kind: TargetKind,
        targets: &[TargetId],
    ) -> Result<Vec<VoteCount>, StoreError> {
        let ledgers: Vec<Vec<u8>> = targets
            .iter()
            .map(|target| keys::vote_ledger(kind, *target))
            .collect();
        let counts = self.counts_in_score_range(&ledgers, 1.0, 1.0)?;
        Ok(counts.into_iter().map(VoteCount::new).collect())
    }

    /// One page of target ids from the chosen index, descending.
    fn ranked_ids(
        &self,
        kind: TargetKind,
        order: RankOrder,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<TargetId>, StoreError> {
        let key = order_index(kind, order);
        let members = self.page_desc(&key, offset, limit)?;
        members.iter().map(|member| decode_id(member)).collect()
    }

    /// The entire chosen index with scores, descending. Used to build community intersections.
    fn ranked_ids_with_scores(
        &self,
        kind: TargetKind,
        order: RankOrder,
    ) -> Result<Vec<(TargetId, f64)>, StoreError> {
        let key = order_index(kind, order);
        let members = self.page_desc_with_scores(&key, 0, u64::MAX)?;
        members
            .iter()
            .map(|(member, score)| Ok((decode_id(member)?, *score)))
            .collect()
    }

    /// Ids of the posts belonging to a community.
    fn community_post_ids(&self, community: CommunityId) -> Result<Vec<TargetId>, StoreError> {
        let members = self.set_members(&keys::community_posts(community))?;
        members.iter().map(|member| decode_id(member)).collect()
    }
}

impl<R: RankRead + ?Sized> RankReadExt for R {}

pub(crate) fn order_index(kind: TargetKind, order: RankOrder) -> Vec<u8> {
    match order {
        RankOrder::Time => keys::time_index(kind),
        RankOrder::Score => keys::score_index(kind),
    }
}

fn decode_id(member: &[u8]) -> Result<TargetId, StoreError> {
    TargetId::deserialize(&mut &*member).map_err(|err| StoreError::CorruptMember {
        member: member.to_vec(),
        source: err,
    })
}

/// A typed batch of mutations. Built up by the engine, then handed to
/// [`RankStore::write`](super::pluggables::RankStore::write) as one atomic unit.
pub struct RankWriteBatch<W: WriteBatch>(W);

impl<W: WriteBatch> RankWriteBatch<W> {
    pub fn new() -> RankWriteBatch<W> {
        RankWriteBatch(W::new())
    }

    pub fn into_inner(self) -> W {
        self.0
    }

    /// Insert a freshly created target: its time entry, its score entry seeded with
    /// `initial_score`, and (for posts) its community membership. One batch, so a target is
    /// never visible in one index but not the other.
    pub fn register_target(&mut self, target: &Target, initial_score: f64) {
        let kind = target.kind();
        let member = target.id().to_le_bytes();
        self.0.put_member(
            &keys::time_index(kind),
            &member,
            target.created_at().secs(),
        );
        self.0
            .put_member(&keys::score_index(kind), &member, initial_score);
        if let Some(community) = target.community() {
            self.0
                .add_to_set(&keys::community_posts(community), &member);
        }
    }

    /// Record the outcome of a vote transition: the ledger upsert (or removal, when the new
    /// direction is a withdrawal) and the score adjustment, together.
    pub fn apply_vote(
        &mut self,
        kind: TargetKind,
        target: TargetId,
        voter: VoterId,
        new_direction: Option<VoteDirection>,
        score_delta: f64,
    ) {
        let ledger = keys::vote_ledger(kind, target);
        match new_direction {
            Some(direction) => {
                self.0
                    .put_member(&ledger, &voter.to_le_bytes(), direction.value())
            }
            None => self.0.remove_member(&ledger, &voter.to_le_bytes()),
        }
        self.0.increment_member(
            &keys::score_index(kind),
            &target.to_le_bytes(),
            score_delta,
        );
    }

    /// Remove every structure belonging to one target: ledger, time entry, score entry.
    pub fn purge_target(&mut self, kind: TargetKind, target: TargetId) {
        let member = target.to_le_bytes();
        self.0.delete_key(&keys::vote_ledger(kind, target));
        self.0.remove_member(&keys::time_index(kind), &member);
        self.0.remove_member(&keys::score_index(kind), &member);
    }

    /// Remove a post from its community's membership set.
    pub fn remove_community_post(&mut self, community: CommunityId, post: TargetId) {
        self.0
            .remove_from_set(&keys::community_posts(community), &post.to_le_bytes());
    }
}
