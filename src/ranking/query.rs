//! Paginated ranking queries.
//!
//! Global listings page straight over the chosen index. Community-scoped listings intersect the
//! community's membership set with the index, aggregate by MAX where the same id would surface
//! twice, and cache the ordered result for a bounded TTL so that consecutive page requests do
//! not recompute the intersection. The cache is the engine's only local mutable state; it is
//! safe to recompute redundantly under races, and a zero TTL disables it.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use crate::store::accessors::RankReadExt;
use crate::store::pluggables::{RankStore, StoreError};
use crate::types::basic::{CommunityId, RankOrder, TargetId, TargetKind, VoteCount};

use super::{cache_now, RankingEngine};

/// An ordered community intersection plus the instant it was computed.
#[derive(Clone)]
pub(crate) struct CachedIntersection {
    pub(crate) computed_at: Instant,
    pub(crate) ids: Vec<TargetId>,
}

impl<S: RankStore> RankingEngine<S> {
    /// One page of target ids, descending by the chosen order. `page` is 1-based; page 0 is
    /// treated as page 1.
    pub fn ranked_page(
        &self,
        kind: TargetKind,
        order: RankOrder,
        community: Option<CommunityId>,
        page: u64,
        size: u64,
    ) -> Result<Vec<TargetId>, StoreError> {
        let offset = page.saturating_sub(1).saturating_mul(size);
        match community {
            None => self.store().ranked_ids(kind, order, offset, size),
            Some(community) => {
                let ids = self.community_ranked_ids(kind, order, community)?;
                let start = (offset as usize).min(ids.len());
                let end = start.saturating_add(size as usize).min(ids.len());
                Ok(ids[start..end].to_vec())
            }
        }
    }

    /// Approval counts for a batch of target ids, one multiplexed round-trip, order preserved.
    /// Ids whose ledger no longer exists (purged concurrently) count as 0; a count mismatch
    /// against the durable store is the caller's cue to
    /// [`request_reconcile`](crate::engine::Engine::request_reconcile).
    pub fn approval_counts(
        &self,
        kind: TargetKind,
        targets: &[TargetId],
    ) -> Result<Vec<VoteCount>, StoreError> {
        self.store().approval_counts(kind, targets)
    }

    /// A page of ids together with their approval counts, in the same order.
    pub fn list_ranked(
        &self,
        kind: TargetKind,
        order: RankOrder,
        community: Option<CommunityId>,
        page: u64,
        size: u64,
    ) -> Result<(Vec<TargetId>, Vec<VoteCount>), StoreError> {
        let ids = self.ranked_page(kind, order, community, page, size)?;
        let counts = self.approval_counts(kind, &ids)?;
        Ok((ids, counts))
    }

    /// The full ordered id list for one (kind, order, community), served from the cache while
    /// fresh.
    fn community_ranked_ids(
        &self,
        kind: TargetKind,
        order: RankOrder,
        community: CommunityId,
    ) -> Result<Vec<TargetId>, StoreError> {
        let cache_key = (kind, order, community);
        let ttl = self.config().intersection_cache_ttl;
        if let Some(cached) = self.cache_entry(cache_key) {
            if cached.computed_at.elapsed() < ttl {
                return Ok(cached.ids);
            }
        }

        let members: HashSet<TargetId> =
            self.store().community_post_ids(community)?.into_iter().collect();
        let index = self.store().ranked_ids_with_scores(kind, order)?;

        // MAX aggregation: if an id ever surfaced with two scores, the larger one wins rather
        // than both being counted.
        let mut best: HashMap<TargetId, f64> = HashMap::new();
        for (id, score) in index {
            if !members.contains(&id) {
                continue;
            }
            best.entry(id)
                .and_modify(|existing| {
                    if score > *existing {
                        *existing = score
                    }
                })
                .or_insert(score);
        }

        let mut ordered: Vec<(TargetId, f64)> = best.into_iter().collect();
        // Score descending, ties by member bytes descending: the same order the index itself
        // pages in, so repeated reads are deterministic.
        ordered.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.0.to_le_bytes().cmp(&a.0.to_le_bytes()))
        });
        let ids: Vec<TargetId> = ordered.into_iter().map(|(id, _)| id).collect();

        self.cache_insert(
            cache_key,
            CachedIntersection {
                computed_at: cache_now(),
                ids: ids.clone(),
            },
        );
        Ok(ids)
    }
}
