// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The node cache: `cid -> {node, info}`, capacity-bounded, upsert-merged.

use indexmap::IndexMap;
use ipfsd_core::{Cid, FileInfo};
use parking_lot::Mutex;

use crate::ipld::Node;

#[derive(Debug, Clone, Default)]
pub struct NodeRecord {
    pub node: Option<Node>,
    pub info: Option<FileInfo>,
}

/// Capacity-bounded, thread-safe cache of resolved nodes.
///
/// `capacity <= 0` disables caching outright: every `get`/`upsert` is a
/// no-op miss, so callers always re-fetch.
pub struct NodeCache {
    capacity: usize,
    enabled: bool,
    entries: Mutex<IndexMap<Cid, NodeRecord>>,
}

impl NodeCache {
    pub fn new(capacity: i64) -> Self {
        Self {
            capacity: capacity.max(0) as usize,
            enabled: capacity > 0,
            entries: Mutex::new(IndexMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a clone of the current record for `cid`, if cached, and
    /// marks it most-recently-used.
    pub fn get(&self, cid: &Cid) -> Option<NodeRecord> {
        if !self.enabled {
            return None;
        }
        let mut entries = self.entries.lock();
        let record = entries.get(cid).cloned()?;
        entries.shift_remove(cid);
        entries.insert(*cid, record.clone());
        Some(record)
    }

    /// Inserts or merges a record: a provided field overwrites, an absent
    /// one preserves whatever was already cached (upsert, not replace).
    pub fn upsert(&self, cid: Cid, node: Option<Node>, info: Option<FileInfo>) {
        if !self.enabled {
            return;
        }
        let mut entries = self.entries.lock();
        let mut record = entries.shift_remove(&cid).unwrap_or_default();
        if node.is_some() {
            record.node = node;
        }
        if info.is_some() {
            record.info = info;
        }
        entries.insert(cid, record);
        while entries.len() > self.capacity {
            entries.shift_remove_index(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipfsd_core::FileType;
    use std::time::SystemTime;

    fn cid(n: u64) -> Cid {
        let hash = cid::multihash::Multihash::<64>::wrap(0, &n.to_be_bytes()).unwrap();
        Cid::new_v1(0x55, hash)
    }

    fn info() -> FileInfo {
        FileInfo::new("x", 0, ipfsd_core::Mode::new(FileType::Regular, 0o644), SystemTime::now())
    }

    #[test]
    fn disabled_cache_never_stores() {
        let cache = NodeCache::new(0);
        cache.upsert(cid(1), None, Some(info()));
        assert!(cache.get(&cid(1)).is_none());
    }

    #[test]
    fn capacity_bound_is_respected() {
        let cache = NodeCache::new(2);
        for i in 0..5u64 {
            cache.upsert(cid(i), None, Some(info()));
        }
        assert!(cache.len() <= 2);
    }

    #[test]
    fn last_insertion_wins_for_present_entries() {
        let cache = NodeCache::new(4);
        let id = cid(1);
        cache.upsert(id, Some(Node::File(bytes::Bytes::from_static(b"a"))), None);
        cache.upsert(id, Some(Node::File(bytes::Bytes::from_static(b"bb"))), None);
        let record = cache.get(&id).unwrap();
        assert_eq!(record.node.unwrap().size(), 2);
    }

    #[test]
    fn upsert_merges_rather_than_replaces() {
        let cache = NodeCache::new(4);
        let id = cid(1);
        cache.upsert(id, Some(Node::File(bytes::Bytes::from_static(b"hello"))), None);
        cache.upsert(id, None, Some(info()));
        let record = cache.get(&id).unwrap();
        assert!(record.node.is_some());
        assert!(record.info.is_some());
    }
}
