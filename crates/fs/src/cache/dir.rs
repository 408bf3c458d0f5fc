// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The directory cache: `cid -> [DirEntry]`, populated only by a fully
//! consumed, error-free listing stream.

use indexmap::IndexMap;
use ipfsd_core::Cid;
use parking_lot::Mutex;

use crate::ipld::DirEntry;

pub struct DirectoryCache {
    entries: Mutex<IndexMap<Cid, Vec<DirEntry>>>,
}

impl DirectoryCache {
    pub fn new() -> Self {
        Self { entries: Mutex::new(IndexMap::new()) }
    }

    /// A snapshot for `cid`, if a complete listing was ever installed.
    pub fn get(&self, cid: &Cid) -> Option<Vec<DirEntry>> {
        self.entries.lock().get(cid).cloned()
    }

    /// Installs a listing. Callers must only call this after a stream
    /// completed with no errors and without its context cancelling —
    /// partial or failed listings must never reach here.
    pub fn install(&self, cid: Cid, snapshot: Vec<DirEntry>) {
        self.entries.lock().insert(cid, snapshot);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DirectoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipfsd_core::FileType;

    fn cid(n: u64) -> Cid {
        let hash = cid::multihash::Multihash::<64>::wrap(0, &n.to_be_bytes()).unwrap();
        Cid::new_v1(0x55, hash)
    }

    fn entry(name: &str) -> DirEntry {
        DirEntry { name: name.into(), cid: cid(1), file_type: FileType::Regular, size: 0 }
    }

    #[test]
    fn miss_until_installed() {
        let cache = DirectoryCache::new();
        assert!(cache.get(&cid(1)).is_none());
        cache.install(cid(1), vec![entry("a")]);
        assert_eq!(cache.get(&cid(1)).unwrap().len(), 1);
    }

    #[test]
    fn never_populated_for_uncalled_keys() {
        let cache = DirectoryCache::new();
        assert!(cache.is_empty());
        assert!(cache.get(&cid(2)).is_none());
    }
}
