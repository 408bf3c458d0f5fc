// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An in-memory `IpfsApi`, grounded on the fake-adapter pattern used
//! elsewhere in the workspace for exercising engine logic without a real
//! upstream node.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use ipfsd_core::Cid;
use parking_lot::Mutex;

use super::{ApiError, IpfsApi, KeyEntry};
use crate::ipld::{DirEntry, Node};

fn synthetic_cid(seed: u64) -> Cid {
    let hash = cid::multihash::Multihash::<64>::wrap(0x12, &seed.to_be_bytes())
        .unwrap_or_else(|_| cid::multihash::Multihash::<64>::wrap(0x12, &[0]).unwrap());
    Cid::new_v1(0x70, hash)
}

#[derive(Default)]
struct Inner {
    nodes: HashMap<Cid, Node>,
    names: HashMap<String, Cid>,
    pins: Vec<Cid>,
    keys: Vec<KeyEntry>,
    next_seed: u64,
}

/// A fake IPFS node: callers build a DAG with [`add_node`](Self::add_node)
/// / [`add_directory`](Self::add_directory) and the engine drives it
/// exactly like it would a real one.
pub struct FakeIpfsApi {
    inner: Mutex<Inner>,
}

impl FakeIpfsApi {
    pub fn new() -> Self {
        Self { inner: Mutex::new(Inner::default()) }
    }

    /// Inserts `node` under a freshly minted CID and returns it.
    pub fn add_node(&self, node: Node) -> Cid {
        let mut inner = self.inner.lock();
        inner.next_seed += 1;
        let cid = synthetic_cid(inner.next_seed);
        inner.nodes.insert(cid, node);
        cid
    }

    /// Convenience: builds a directory node from `(name, child)` pairs,
    /// inserting each child first.
    pub fn add_directory(&self, children: Vec<(&str, Node)>) -> Cid {
        let entries: Vec<DirEntry> = children
            .into_iter()
            .map(|(name, node)| {
                let file_type = node.file_type();
                let size = node.size();
                let cid = self.add_node(node);
                DirEntry { name: name.to_string(), cid, file_type, size }
            })
            .collect();
        self.add_node(Node::Directory(entries))
    }

    pub fn publish_name(&self, name: &str, cid: Cid) {
        self.inner.lock().names.insert(name.to_string(), cid);
    }

    pub fn add_pin(&self, cid: Cid) {
        self.inner.lock().pins.push(cid);
    }

    pub fn add_key(&self, name: &str, ipns_name: &str) {
        self.inner.lock().keys.push(KeyEntry { name: name.into(), ipns_name: ipns_name.into() });
    }
}

impl Default for FakeIpfsApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IpfsApi for FakeIpfsApi {
    async fn dag_get(&self, cid: &Cid) -> Result<Node, ApiError> {
        self.inner
            .lock()
            .nodes
            .get(cid)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(cid.to_string()))
    }

    fn unixfs_ls(&self, cid: &Cid) -> BoxStream<'static, Result<DirEntry, ApiError>> {
        let entries = self
            .inner
            .lock()
            .nodes
            .get(cid)
            .and_then(|n| n.as_directory().map(<[DirEntry]>::to_vec))
            .unwrap_or_default();
        Box::pin(stream::iter(entries.into_iter().map(Ok)))
    }

    async fn name_resolve(&self, name: &str) -> Result<Cid, ApiError> {
        self.inner
            .lock()
            .names
            .get(name)
            .copied()
            .ok_or_else(|| ApiError::NotFound(name.to_string()))
    }

    fn pin_ls(&self) -> BoxStream<'static, Result<Cid, ApiError>> {
        let pins = self.inner.lock().pins.clone();
        Box::pin(stream::iter(pins.into_iter().map(Ok)))
    }

    fn key_list(&self) -> BoxStream<'static, Result<KeyEntry, ApiError>> {
        let keys = self.inner.lock().keys.clone();
        Box::pin(stream::iter(keys.into_iter().map(Ok)))
    }

    async fn key_publish(&self, name: &str, target: &str) -> Result<(), ApiError> {
        let cid = self.add_node(Node::Symlink(target.to_string()));
        self.inner.lock().keys.push(KeyEntry { name: name.into(), ipns_name: cid.to_string() });
        Ok(())
    }

    async fn pin_add(&self, cid: &Cid) -> Result<(), ApiError> {
        self.inner.lock().pins.push(*cid);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[tokio::test]
    async fn dag_get_returns_inserted_node() {
        let mut api = FakeIpfsApi::new();
        let cid = api.add_node(Node::File(Bytes::from_static(b"hi")));
        let node = api.dag_get(&cid).await.unwrap();
        assert_eq!(node.as_file_bytes().unwrap(), &Bytes::from_static(b"hi"));
    }

    #[tokio::test]
    async fn name_resolve_round_trips() {
        let api = FakeIpfsApi::new();
        let cid = synthetic_cid(1);
        api.publish_name("self", cid);
        assert_eq!(api.name_resolve("self").await.unwrap(), cid);
    }
}
