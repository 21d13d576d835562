//! A simple, volatile, in-memory implementation of [`RankStore`].

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use hotrank::store::pluggables::{RankRead, RankStore, StoreError, WriteBatch};

/// An in-memory implementation of [`RankStore`]. Every key holds either a sorted set or a plain
/// set, like the Redis keyspace the engine was designed around. Batches apply under one lock, so
/// they are atomic with respect to every read.
#[derive(Clone)]
pub(crate) struct MemStore(Arc<Mutex<HashMap<Vec<u8>, Entry>>>);

pub(crate) enum Entry {
    Sorted(HashMap<Vec<u8>, f64>),
    Set(HashSet<Vec<u8>>),
}

impl MemStore {
    /// Create a new, empty `MemStore`.
    pub(crate) fn new() -> MemStore {
        MemStore(Arc::new(Mutex::new(HashMap::new())))
    }
}

impl RankStore for MemStore {
    type WriteBatch = MemWriteBatch;

    fn write(&mut self, wb: Self::WriteBatch) -> Result<(), StoreError> {
        let mut map = self.0.lock().unwrap();
        for op in wb.ops {
            match op {
                Op::IncrementMember(key, member, delta) => {
                    let entry = map.entry(key).or_insert_with(|| Entry::Sorted(HashMap::new()));
                    match entry {
                        Entry::Sorted(members) => {
                            *members.entry(member).or_insert(0.0) += delta;
                        }
                        Entry::Set(_) => panic!("sorted-set op against a plain set key"),
                    }
                }
                Op::PutMember(key, member, score) => {
                    let entry = map.entry(key).or_insert_with(|| Entry::Sorted(HashMap::new()));
                    match entry {
                        Entry::Sorted(members) => {
                            members.insert(member, score);
                        }
                        Entry::Set(_) => panic!("sorted-set op against a plain set key"),
                    }
                }
                Op::RemoveMember(key, member) => {
                    if let Some(Entry::Sorted(members)) = map.get_mut(&key) {
                        members.remove(&member);
                        if members.is_empty() {
                            map.remove(&key);
                        }
                    }
                }
                Op::AddToSet(key, member) => {
                    let entry = map.entry(key).or_insert_with(|| Entry::Set(HashSet::new()));
                    match entry {
                        Entry::Set(members) => {
                            members.insert(member);
                        }
                        Entry::Sorted(_) => panic!("plain-set op against a sorted set key"),
                    }
                }
                Op::RemoveFromSet(key, member) => {
                    if let Some(Entry::Set(members)) = map.get_mut(&key) {
                        members.remove(&member);
                        if members.is_empty() {
                            map.remove(&key);
                        }
                    }
                }
                Op::DeleteKey(key) => {
                    map.remove(&key);
                }
            }
        }
        Ok(())
    }
}

impl RankRead for MemStore {
    fn member_score(&self, key: &[u8], member: &[u8]) -> Result<Option<f64>, StoreError> {
        let map = self.0.lock().unwrap();
        match map.get(key) {
            Some(Entry::Sorted(members)) => Ok(members.get(member).copied()),
            _ => Ok(None),
        }
    }

    fn page_desc(&self, key: &[u8], offset: u64, limit: u64) -> Result<Vec<Vec<u8>>, StoreError> {
        let page = self.page_desc_with_scores(key, offset, limit)?;
        Ok(page.into_iter().map(|(member, _)| member).collect())
    }

    fn page_desc_with_scores(
        &self,
        key: &[u8],
        offset: u64,
        limit: u64,
    ) -> Result<Vec<(Vec<u8>, f64)>, StoreError> {
        let map = self.0.lock().unwrap();
        let mut members: Vec<(Vec<u8>, f64)> = match map.get(key) {
            Some(Entry::Sorted(members)) => members
                .iter()
                .map(|(member, score)| (member.clone(), *score))
                .collect(),
            _ => return Ok(Vec::new()),
        };
        // Score descending, ties by member bytes descending.
        members.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.0.cmp(&a.0))
        });
        Ok(members
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect())
    }

    fn count_in_score_range(&self, key: &[u8], min: f64, max: f64) -> Result<u64, StoreError> {
        let map = self.0.lock().unwrap();
        match map.get(key) {
            Some(Entry::Sorted(members)) => Ok(members
                .values()
                .filter(|score| min <= **score && **score <= max)
                .count() as u64),
            _ => Ok(0),
        }
    }

    fn counts_in_score_range(
        &self,
        keys: &[Vec<u8>],
        min: f64,
        max: f64,
    ) -> Result<Vec<u64>, StoreError> {
        // One lock acquisition covers the whole batch, mirroring a pipelined round-trip.
        let map = self.0.lock().unwrap();
        Ok(keys
            .iter()
            .map(|key| match map.get(key) {
                Some(Entry::Sorted(members)) => members
                    .values()
                    .filter(|score| min <= **score && **score <= max)
                    .count() as u64,
                _ => 0,
            })
            .collect())
    }

    fn set_members(&self, key: &[u8]) -> Result<Vec<Vec<u8>>, StoreError> {
        let map = self.0.lock().unwrap();
        match map.get(key) {
            Some(Entry::Set(members)) => Ok(members.iter().cloned().collect()),
            _ => Ok(Vec::new()),
        }
    }
}

enum Op {
    IncrementMember(Vec<u8>, Vec<u8>, f64),
    PutMember(Vec<u8>, Vec<u8>, f64),
    RemoveMember(Vec<u8>, Vec<u8>),
    AddToSet(Vec<u8>, Vec<u8>),
    RemoveFromSet(Vec<u8>, Vec<u8>),
    DeleteKey(Vec<u8>),
}

// A simple implementation of [`WriteBatch`] that records mutations in call order.
pub(crate) struct MemWriteBatch {
    ops: Vec<Op>,
}

impl WriteBatch for MemWriteBatch {
    fn new() -> Self {
        MemWriteBatch { ops: Vec::new() }
    }

    fn increment_member(&mut self, key: &[u8], member: &[u8], delta: f64) {
        self.ops
            .push(Op::IncrementMember(key.to_vec(), member.to_vec(), delta));
    }

    fn put_member(&mut self, key: &[u8], member: &[u8], score: f64) {
        self.ops
            .push(Op::PutMember(key.to_vec(), member.to_vec(), score));
    }

    fn remove_member(&mut self, key: &[u8], member: &[u8]) {
        self.ops
            .push(Op::RemoveMember(key.to_vec(), member.to_vec()));
    }

    fn add_to_set(&mut self, key: &[u8], member: &[u8]) {
        self.ops.push(Op::AddToSet(key.to_vec(), member.to_vec()));
    }

    fn remove_from_set(&mut self, key: &[u8], member: &[u8]) {
        self.ops
            .push(Op::RemoveFromSet(key.to_vec(), member.to_vec()));
    }

    fn delete_key(&mut self, key: &[u8]) {
        self.ops.push(Op::DeleteKey(key.to_vec()));
    }
}
