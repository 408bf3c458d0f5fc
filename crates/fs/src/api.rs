// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The host IPFS API: the "engine env" the orchestrator injects into the
//! file-system engines. Grounded on the adapter-trait shape used for the
//! daemon's other external integrations, with a fake test double standing
//! in for a real node during tests.

use async_trait::async_trait;
use futures::stream::BoxStream;
use ipfsd_core::Cid;
use thiserror::Error;

use crate::ipld::Node;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("upstream request failed: {0}")]
    Transport(String),

    #[error("no such node: {0}")]
    NotFound(String),

    #[error("could not decode node: {0}")]
    Decode(String),
}

impl From<ApiError> for ipfsd_core::Error {
    fn from(err: ApiError) -> Self {
        match &err {
            ApiError::NotFound(_) => ipfsd_core::Error::not_exist(err.to_string()),
            ApiError::Transport(_) | ApiError::Decode(_) => ipfsd_core::Error::io(err),
        }
    }
}

/// A named mutable-name key, as returned by `key_list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEntry {
    pub name: String,
    pub ipns_name: String,
}

/// The subset of a go-ipfs-compatible RPC API the engines depend on.
#[async_trait]
pub trait IpfsApi: Send + Sync {
    /// Fetches and decodes a single IPLD node.
    async fn dag_get(&self, cid: &Cid) -> Result<Node, ApiError>;

    /// Streams a directory node's entries without materializing the
    /// whole listing first.
    fn unixfs_ls(&self, cid: &Cid) -> BoxStream<'static, Result<crate::ipld::DirEntry, ApiError>>;

    /// Resolves an IPNS name to the CID it currently points at.
    async fn name_resolve(&self, name: &str) -> Result<Cid, ApiError>;

    /// Streams the node's recursively pinned CID set.
    fn pin_ls(&self) -> BoxStream<'static, Result<Cid, ApiError>>;

    /// Streams the node's named (mutable) key set.
    fn key_list(&self) -> BoxStream<'static, Result<KeyEntry, ApiError>>;

    /// Creates `name` as a new key and publishes `target` under it.
    /// `None` unless the injected API supports key mutation (KeyFS's
    /// optional `Symlink`).
    async fn key_publish(&self, _name: &str, _target: &str) -> Result<(), ApiError> {
        Err(ApiError::Transport("key publish not supported by this API".into()))
    }

    /// Recursively pins `cid`. Only used by KeyFS's optional `Symlink`
    /// when a pin API is supplied.
    async fn pin_add(&self, _cid: &Cid) -> Result<(), ApiError> {
        Err(ApiError::Transport("pin add not supported by this API".into()))
    }
}

pub mod http;

#[cfg(any(test, feature = "fake"))]
pub mod fake;
