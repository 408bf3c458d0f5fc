// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The IPNS file-system engine: root-name resolution with a cache,
//! delegating to the IPFS engine for the rest of the path, and
//! iterative symlink resolution with rebasing.

use std::collections::{HashMap, VecDeque};
use std::io::SeekFrom;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ipfsd_core::{Cid, Clock, Error, FileInfo};
use parking_lot::Mutex;

use crate::api::IpfsApi;
use crate::engine::IpfsEngine;
use crate::handle::{Capabilities, FileHandle, OpenHandle};

/// Default symlink resolution limit before a chain is rejected as a
/// recursion error.
pub const DEFAULT_LINK_LIMIT: u32 = 40;
/// Default root-name cache TTL.
pub const DEFAULT_ROOT_EXPIRY: Duration = Duration::from_secs(60);

/// How long a resolved root name stays cached.
#[derive(Debug, Clone, Copy)]
pub enum RootExpiry {
    /// Resolved once, never re-resolved.
    Never,
    /// Every lookup re-resolves; nothing is cached.
    Disabled,
    /// Cached for the given duration.
    After(Duration),
}

impl RootExpiry {
    /// Spec convention: negative means never-expires, zero means disabled.
    pub fn from_seconds(secs: i64) -> Self {
        match secs {
            s if s < 0 => RootExpiry::Never,
            0 => RootExpiry::Disabled,
            s => RootExpiry::After(Duration::from_secs(s as u64)),
        }
    }
}

enum RebaseOutcome {
    Ipfs(String),
    Ipns(String),
}

/// Re-walks a path to its current terminal CID, and opens an
/// already-resolved node. Implemented by `IpnsEngine` itself; boxed as a
/// trait object so `IpnsFileHandle` can hold one without being generic
/// over the engine's clock type.
#[async_trait]
trait PathResolver: Send + Sync {
    async fn resolve_path(&self, name: &str) -> Result<(Cid, FileInfo), Error>;
    async fn open_resolved(&self, cid: Cid, info: FileInfo) -> Result<OpenHandle, Error>;
}

#[derive(Clone)]
pub struct IpnsEngine<C: Clock + 'static = ipfsd_core::SystemClock> {
    ipfs: Arc<IpfsEngine>,
    api: Arc<dyn IpfsApi>,
    clock: C,
    expiry: RootExpiry,
    link_limit: u32,
    node_timeout: Duration,
    root_cache: Arc<Mutex<HashMap<String, (Cid, u64)>>>,
}

impl<C: Clock + 'static> IpnsEngine<C> {
    pub fn new(
        ipfs: Arc<IpfsEngine>,
        api: Arc<dyn IpfsApi>,
        clock: C,
        expiry: RootExpiry,
        link_limit: u32,
        node_timeout: Duration,
    ) -> Self {
        Self {
            ipfs,
            api,
            clock,
            expiry,
            link_limit,
            node_timeout,
            root_cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn stat(&self, name: &str) -> Result<FileInfo, Error> {
        let (_, info) = self.walk(name, true).await?;
        Ok(info)
    }

    /// Like `stat`, but does not follow a symlink in the path's final
    /// component: a terminal UnixFS symlink is reported as itself
    /// (`FileType::Symlink`), not as whatever it points at.
    pub async fn lstat(&self, name: &str) -> Result<FileInfo, Error> {
        let (_, info) = self.walk(name, false).await?;
        Ok(info)
    }

    /// Resolves `name` against the root cache and IPFS engine, following
    /// symlinks (iteratively, counted against `link_limit`) wherever they
    /// are encountered along the path, including the terminal node.
    ///
    /// A resolved file is wrapped so that each later read/seek re-checks
    /// the root's current CID and transparently reopens against it if the
    /// root has since been republished; a resolved directory is returned
    /// as-is, since a directory listing is always re-fetched fresh.
    pub async fn open(&self, name: &str) -> Result<OpenHandle, Error> {
        let (cid, info) = self.walk(name, true).await?;
        match self.ipfs.open_resolved(cid, info).await? {
            OpenHandle::File(inner) => {
                let resolver: Arc<dyn PathResolver> = Arc::new(self.clone());
                Ok(OpenHandle::IpnsFile(IpnsFileHandle::new(resolver, name.to_string(), cid, inner)))
            }
            other => Ok(other),
        }
    }

    /// Resolves `name` against the root cache and IPFS engine, following
    /// symlinks (iteratively, counted against `link_limit`) wherever they
    /// are encountered along the path, including the terminal node.
    ///
    /// `follow_terminal` controls only the last path component: symlinks
    /// encountered earlier are always followed, since there is more path
    /// left to resolve through them regardless.
    async fn walk(&self, name: &str, follow_terminal: bool) -> Result<(Cid, FileInfo), Error> {
        let (root, rest) = split_root(name);
        let mut cid = self.resolve_root(root).await?;
        let mut current_path = vec![cid.to_string()];
        let mut pending: VecDeque<String> =
            rest.split('/').filter(|s| !s.is_empty()).map(String::from).collect();
        let mut info = self.ipfs.node_info(&cid).await?;
        let mut steps = 0u32;

        loop {
            if info.is_symlink() && (follow_terminal || !pending.is_empty()) {
                if steps >= self.link_limit {
                    return Err(Error::recursion("symlink resolution exceeded the link limit"));
                }
                steps += 1;
                let target = self.ipfs.symlink_target(&cid).await?;
                let mut rebased: VecDeque<String> = match self.rebase(&current_path.join("/"), &target)? {
                    RebaseOutcome::Ipfs(path) => {
                        path.split('/').filter(|s| !s.is_empty()).map(String::from).collect()
                    }
                    RebaseOutcome::Ipns(named) => {
                        let (r2, rest2) = split_root(&named);
                        let root_cid = self.resolve_root(r2).await?;
                        let mut segs = VecDeque::new();
                        segs.push_back(root_cid.to_string());
                        segs.extend(rest2.split('/').filter(|s| !s.is_empty()).map(String::from));
                        segs
                    }
                };
                let new_root = rebased
                    .pop_front()
                    .ok_or_else(|| Error::invalid_item("symlink target resolved to an empty path"))?;
                cid = ipfsd_core::cid::parse(&new_root)?;
                current_path = vec![cid.to_string()];
                rebased.extend(pending.drain(..));
                pending = rebased;
                info = self.ipfs.node_info(&cid).await?;
                continue;
            }

            match pending.pop_front() {
                None => return Ok((cid, info)),
                Some(component) => {
                    cid = self.ipfs.child(&cid, &component).await?;
                    current_path.push(cid.to_string());
                    info = self.ipfs.node_info(&cid).await?;
                }
            }
        }
    }

    async fn resolve_root(&self, root: &str) -> Result<Cid, Error> {
        match self.expiry {
            RootExpiry::Disabled => self.fetch_root(root, false).await,
            RootExpiry::Never => {
                if let Some((cid, _)) = self.root_cache.lock().get(root).copied() {
                    return Ok(cid);
                }
                self.fetch_root(root, true).await
            }
            RootExpiry::After(ttl) => {
                let now = self.clock.epoch_ms();
                if let Some((cid, ts)) = self.root_cache.lock().get(root).copied() {
                    if now.saturating_sub(ts) < ttl.as_millis() as u64 {
                        return Ok(cid);
                    }
                }
                self.fetch_root(root, true).await
            }
        }
    }

    async fn fetch_root(&self, root: &str, cache: bool) -> Result<Cid, Error> {
        let name = format!("/ipns/{root}");
        let cid = tokio::time::timeout(self.node_timeout, self.api.name_resolve(&name))
            .await
            .map_err(|_| {
                Error::io(std::io::Error::new(std::io::ErrorKind::TimedOut, "name resolve timed out"))
            })??;
        if cache {
            self.root_cache.lock().insert(root.to_string(), (cid, self.clock.epoch_ms()));
        }
        Ok(cid)
    }

    fn rebase(&self, current_ipfs_path: &str, target: &str) -> Result<RebaseOutcome, Error> {
        if let Some(rest) = target.strip_prefix("/ipns/") {
            return Ok(RebaseOutcome::Ipns(rest.to_string()));
        }
        if let Some(rest) = target.strip_prefix("/ipfs/") {
            return Ok(RebaseOutcome::Ipfs(rest.to_string()));
        }
        if target.starts_with('/') {
            return Err(Error::invalid_item(format!("invalid absolute symlink target {target:?}")));
        }
        let parent = parent_of(current_ipfs_path);
        Ok(RebaseOutcome::Ipfs(normalize_segments(parent, target)?))
    }
}

#[async_trait]
impl<C: Clock + 'static> PathResolver for IpnsEngine<C> {
    async fn resolve_path(&self, name: &str) -> Result<(Cid, FileInfo), Error> {
        self.walk(name, true).await
    }

    async fn open_resolved(&self, cid: Cid, info: FileInfo) -> Result<OpenHandle, Error> {
        self.ipfs.open_resolved(cid, info).await
    }
}

/// An open IPNS file. Wraps a plain [`FileHandle`] resolved against some
/// root CID, and re-validates that CID before every read/seek: if the
/// name now resolves elsewhere (the key was republished), it transparently
/// reopens against the new target, carrying the cursor across when both
/// the old and new handles are seekable.
pub struct IpnsFileHandle {
    resolver: Arc<dyn PathResolver>,
    path: String,
    cid: Cid,
    inner: FileHandle,
}

impl IpnsFileHandle {
    fn new(resolver: Arc<dyn PathResolver>, path: String, cid: Cid, inner: FileHandle) -> Self {
        Self { resolver, path, cid, inner }
    }

    pub fn stat(&self) -> FileInfo {
        self.inner.stat()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.inner.capabilities()
    }

    pub fn close(&mut self) {
        self.inner.close();
    }

    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        self.refresh().await?;
        self.inner.read(buf)
    }

    pub async fn seek(&mut self, from: SeekFrom) -> Result<u64, Error> {
        self.refresh().await?;
        self.inner.seek(from)
    }

    /// Re-resolves `path`; if the CID it names has changed, reopens
    /// against the new one and carries the read cursor across. Reopening
    /// onto a handle whose seekability differs from the old one is an
    /// error rather than a silent reset of the cursor.
    async fn refresh(&mut self) -> Result<(), Error> {
        let (cid, info) = self.resolver.resolve_path(&self.path).await?;
        if cid == self.cid {
            return Ok(());
        }
        let position = self.inner.position();
        let was_seekable = self.inner.capabilities().seek;
        let new_inner = match self.resolver.open_resolved(cid, info).await? {
            OpenHandle::File(f) => f,
            OpenHandle::IpnsFile(_) => {
                return Err(Error::invalid_item("reopen produced a nested ipns file handle"));
            }
            OpenHandle::Directory(_) => {
                return Err(Error::invalid_item("ipns root changed from a file to a directory"));
            }
        };
        if was_seekable != new_inner.capabilities().seek {
            return Err(Error::invalid_item("ipns root reopen changed seekability"));
        }
        self.cid = cid;
        self.inner = new_inner;
        if was_seekable {
            self.inner.seek(SeekFrom::Start(position))?;
        }
        Ok(())
    }
}

fn split_root(name: &str) -> (&str, &str) {
    match name.split_once('/') {
        Some((root, rest)) => (root, rest),
        None => (name, ""),
    }
}

fn parent_of(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some((parent, _)) => parent,
        None => "",
    }
}

fn normalize_segments(base: &str, rel: &str) -> Result<String, Error> {
    let mut segs: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for part in rel.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if segs.pop().is_none() {
                    return Err(Error::invalid_item("symlink target escapes the engine root"));
                }
            }
            other => segs.push(other),
        }
    }
    Ok(segs.join("/"))
}
