// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The IPFS file-system engine: path -> CID walk, `Stat`, `Open`, streaming
//! `ReadDir`.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use futures::StreamExt;
use ipfsd_core::{Error, FileInfo, FileType, Mode};
use tokio_util::sync::CancellationToken;

use crate::api::IpfsApi;
use crate::cache::{DirectoryCache, NodeCache};
use crate::handle::{DirHandle, FileHandle, OpenHandle};
use crate::ipld::Node;

/// Permissions granted on the synthetic engine root.
const ROOT_PERMISSIONS: u32 = 0o555;
/// Permissions used for derived `FileInfo` on resolved nodes.
const DEFAULT_PERMISSIONS: u32 = 0o444;

pub struct IpfsEngine {
    api: Arc<dyn IpfsApi>,
    node_cache: Arc<NodeCache>,
    dir_cache: Arc<DirectoryCache>,
    /// `None` means "no deadline" (spec: `0` disables the per-fetch timeout).
    node_timeout: Option<Duration>,
}

impl IpfsEngine {
    pub fn new(api: Arc<dyn IpfsApi>, node_cache_capacity: i64, node_timeout: Duration) -> Self {
        Self {
            api,
            node_cache: Arc::new(NodeCache::new(node_cache_capacity)),
            dir_cache: Arc::new(DirectoryCache::new()),
            node_timeout: if node_timeout.is_zero() { None } else { Some(node_timeout) },
        }
    }

    fn root_info() -> FileInfo {
        FileInfo::new(".", 0, Mode::new(FileType::Directory, ROOT_PERMISSIONS), SystemTime::now())
    }

    pub async fn stat(&self, name: &str) -> Result<FileInfo, Error> {
        if name == "." {
            return Ok(Self::root_info());
        }
        let cid = self.resolve(name).await?;
        self.fetch_info(&cid).await
    }

    pub async fn open(&self, name: &str) -> Result<OpenHandle, Error> {
        if name == "." {
            return Ok(OpenHandle::Directory(DirHandle::root(Self::root_info())));
        }
        let cid = self.resolve(name).await?;
        let info = self.fetch_info(&cid).await?;
        self.open_resolved(cid, info).await
    }

    /// Opens an already-resolved node. Used directly by the IPNS engine,
    /// which does its own symlink-aware path walk.
    pub(crate) async fn open_resolved(&self, cid: ipfsd_core::Cid, info: FileInfo) -> Result<OpenHandle, Error> {
        match info.mode.file_type() {
            FileType::Directory => Ok(OpenHandle::Directory(self.open_directory(cid, info).await?)),
            FileType::Regular | FileType::Irregular => {
                let node = self.fetch_node(&cid).await?;
                let bytes = node
                    .as_file_bytes()
                    .cloned()
                    .ok_or_else(|| Error::invalid_item("node has no byte payload"))?;
                Ok(OpenHandle::File(FileHandle::new(info, bytes)))
            }
            FileType::Symlink => Err(Error::invalid_item("symlinks are resolved by the IPNS engine")),
        }
    }

    /// Resolves `name` and returns its symlink target; errors if the
    /// resolved node isn't a symlink.
    pub async fn read_symlink(&self, name: &str) -> Result<String, Error> {
        let cid = self.resolve(name).await?;
        self.symlink_target(&cid).await
    }

    /// Returns `cid`'s symlink target; errors if it isn't a symlink node.
    pub(crate) async fn symlink_target(&self, cid: &ipfsd_core::Cid) -> Result<String, Error> {
        let node = self.fetch_node(cid).await?;
        node.as_symlink_target()
            .map(str::to_string)
            .ok_or_else(|| Error::invalid_item(format!("{cid} is not a symlink")))
    }

    /// Fetches `info` for an already-known CID (the IPNS engine's
    /// component-at-a-time walk knows CIDs directly, not paths).
    pub(crate) async fn node_info(&self, cid: &ipfsd_core::Cid) -> Result<FileInfo, Error> {
        self.fetch_info(cid).await
    }

    /// Resolves a single path component under a known-directory CID.
    pub(crate) async fn child(&self, cid: &ipfsd_core::Cid, name: &str) -> Result<ipfsd_core::Cid, Error> {
        let node = self.fetch_node(cid).await?;
        let entries = node
            .as_directory()
            .ok_or_else(|| Error::not_dir(format!("{cid} is not a directory")))?;
        entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.cid)
            .ok_or_else(|| Error::not_exist(format!("no such link {name:?}")))
    }

    /// Splits `name` on `/`, resolving every component after the first
    /// (a CID) against the node cache's directory entries.
    async fn resolve(&self, name: &str) -> Result<ipfsd_core::Cid, Error> {
        let mut parts = name.split('/').filter(|s| !s.is_empty());
        let first = parts.next().ok_or_else(|| Error::invalid_item("empty path"))?;
        let mut current = ipfsd_core::cid::parse(first)?;
        for component in parts {
            let node = self.fetch_node(&current).await?;
            let entries = node
                .as_directory()
                .ok_or_else(|| Error::not_dir(format!("{current} is not a directory")))?;
            let entry = entries
                .iter()
                .find(|e| e.name == component)
                .ok_or_else(|| Error::not_exist(format!("no such link {component:?}")))?;
            current = entry.cid;
        }
        Ok(current)
    }

    async fn fetch_node(&self, cid: &ipfsd_core::Cid) -> Result<Node, Error> {
        if let Some(record) = self.node_cache.get(cid) {
            if let Some(node) = record.node {
                return Ok(node);
            }
        }
        let node = match self.node_timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.api.dag_get(cid))
                .await
                .map_err(|_| Error::io(std::io::Error::new(std::io::ErrorKind::TimedOut, "node fetch timed out")))??,
            None => self.api.dag_get(cid).await?,
        };
        self.node_cache.upsert(*cid, Some(node.clone()), None);
        Ok(node)
    }

    async fn fetch_info(&self, cid: &ipfsd_core::Cid) -> Result<FileInfo, Error> {
        if let Some(record) = self.node_cache.get(cid) {
            if let Some(info) = record.info {
                return Ok(info);
            }
            if let Some(node) = record.node {
                let info = node.to_file_info(cid.to_string(), DEFAULT_PERMISSIONS);
                self.node_cache.upsert(*cid, None, Some(info.clone()));
                return Ok(info);
            }
        }
        let node = self.fetch_node(cid).await?;
        let info = node.to_file_info(cid.to_string(), DEFAULT_PERMISSIONS);
        self.node_cache.upsert(*cid, None, Some(info.clone()));
        Ok(info)
    }

    async fn open_directory(&self, cid: ipfsd_core::Cid, info: FileInfo) -> Result<DirHandle, Error> {
        if let Some(snapshot) = self.dir_cache.get(&cid) {
            return Ok(DirHandle::from_snapshot(info, snapshot));
        }

        let (tx, rx) = tokio::sync::mpsc::channel(64);
        let api = self.api.clone();
        let dir_cache = self.dir_cache.clone();
        let cancel = CancellationToken::new();
        let child_cancel = cancel.clone();

        tokio::spawn(async move {
            let mut stream = api.unixfs_ls(&cid);
            let mut accumulated = Vec::new();
            let mut failed = false;
            loop {
                tokio::select! {
                    _ = child_cancel.cancelled() => {
                        failed = true;
                        break;
                    }
                    item = stream.next() => {
                        match item {
                            Some(Ok(entry)) => {
                                accumulated.push(entry.clone());
                                if tx.send(Ok(entry)).await.is_err() {
                                    break;
                                }
                            }
                            Some(Err(err)) => {
                                failed = true;
                                let _ = tx.send(Err(err.into())).await;
                                break;
                            }
                            None => break,
                        }
                    }
                }
            }
            if !failed && !child_cancel.is_cancelled() {
                dir_cache.install(cid, accumulated);
            }
        });

        Ok(DirHandle::from_stream(info, rx, cancel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeIpfsApi;
    use crate::ipld::DirEntry;
    use bytes::Bytes;

    fn engine(api: FakeIpfsApi) -> IpfsEngine {
        IpfsEngine::new(Arc::new(api), 64, Duration::from_secs(60))
    }

    #[tokio::test]
    async fn stat_root_is_a_directory() {
        let e = engine(FakeIpfsApi::new());
        let info = e.stat(".").await.unwrap();
        assert!(info.is_dir());
    }

    #[tokio::test]
    async fn open_and_read_dir_then_read_file() {
        let mut api = FakeIpfsApi::new();
        let root = api.add_directory(vec![
            ("a", Node::File(Bytes::from_static(b"hello"))),
            ("b", Node::Directory(vec![])),
        ]);

        let e = engine(api);
        let info = e.stat(&root.to_string()).await.unwrap();
        assert!(info.is_dir());

        let handle = e.open(&root.to_string()).await.unwrap();
        let mut dir = match handle {
            OpenHandle::Directory(d) => d,
            _ => panic!("expected directory"),
        };
        let entries = dir.read_dir(-1).await.unwrap().unwrap();
        assert_eq!(entries.len(), 2);

        let file_path = format!("{root}/a");
        let file_handle = e.open(&file_path).await.unwrap();
        let mut file = match file_handle {
            OpenHandle::File(f) => f,
            _ => panic!("expected file"),
        };
        let mut buf = [0u8; 5];
        file.read(&mut buf).unwrap();
        assert_eq!(&buf, b"hello");
    }

    #[tokio::test]
    async fn missing_link_is_not_exist() {
        let mut api = FakeIpfsApi::new();
        let root = api.add_directory(vec![("a", Node::File(Bytes::from_static(b"x")))]);
        let e = engine(api);
        let err = e.stat(&format!("{root}/missing")).await.unwrap_err();
        assert!(err.is_not_exist());
    }

    #[test]
    fn fake_helper_compiles() {
        let _entries: Vec<DirEntry> = Vec::new();
    }
}
