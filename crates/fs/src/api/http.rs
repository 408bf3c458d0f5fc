// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A real `IpfsApi` talking to a go-ipfs-compatible RPC API over HTTP.
//! Favors the endpoints Kubo exposes specifically so callers never have
//! to decode dag-pb themselves: `ls`/`cat` for node bodies, `dag/get`
//! only to learn a node's UnixFS type.

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures_util::stream::{self, StreamExt};
use ipfsd_core::Cid;
use serde::Deserialize;
use std::collections::HashMap;

use super::{ApiError, IpfsApi, KeyEntry};
use crate::ipld::{DirEntry, Node};

const UNIXFS_TYPE_RAW: u8 = 0;
const UNIXFS_TYPE_DIRECTORY: u8 = 1;
const UNIXFS_TYPE_FILE: u8 = 2;
const UNIXFS_TYPE_METADATA: u8 = 3;
const UNIXFS_TYPE_SYMLINK: u8 = 4;
const UNIXFS_TYPE_HAMT_SHARD: u8 = 5;

fn unixfs_file_type(node_type: u8) -> ipfsd_core::FileType {
    match node_type {
        UNIXFS_TYPE_DIRECTORY | UNIXFS_TYPE_HAMT_SHARD => ipfsd_core::FileType::Directory,
        UNIXFS_TYPE_FILE | UNIXFS_TYPE_METADATA => ipfsd_core::FileType::Regular,
        UNIXFS_TYPE_SYMLINK => ipfsd_core::FileType::Symlink,
        _ => ipfsd_core::FileType::Irregular,
    }
}

/// An `IpfsApi` backed by a running Kubo (or compatible) node's HTTP RPC
/// API, reached at `base_url` (e.g. `http://127.0.0.1:5001`).
pub struct HttpIpfsApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpIpfsApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.into() }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        arg: &str,
    ) -> Result<T, ApiError> {
        let resp = self
            .client
            .post(self.endpoint(path))
            .query(&[("arg", arg)])
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ApiError::Transport(format!("{path} returned {}", resp.status())));
        }
        resp.json::<T>().await.map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn post_bytes(&self, path: &str, arg: &str) -> Result<bytes::Bytes, ApiError> {
        let resp = self
            .client
            .post(self.endpoint(path))
            .query(&[("arg", arg)])
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ApiError::Transport(format!("{path} returned {}", resp.status())));
        }
        resp.bytes().await.map_err(|e| ApiError::Transport(e.to_string()))
    }

    async fn post_unit(&self, path: &str, args: &[(&str, &str)]) -> Result<(), ApiError> {
        let resp = self
            .client
            .post(self.endpoint(path))
            .query(args)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ApiError::Transport(format!("{path} returned {}", resp.status())));
        }
        Ok(())
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self
            .client
            .post(self.endpoint(path))
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ApiError::Transport(format!("{path} returned {}", resp.status())));
        }
        resp.json::<T>().await.map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn ls_entries(&self, cid: &Cid) -> Result<Vec<DirEntry>, ApiError> {
        #[derive(Deserialize)]
        struct LsResponse {
            #[serde(rename = "Objects", default)]
            objects: Vec<LsObject>,
        }
        #[derive(Deserialize)]
        struct LsObject {
            #[serde(rename = "Links", default)]
            links: Vec<LsLink>,
        }
        #[derive(Deserialize)]
        struct LsLink {
            #[serde(rename = "Name", default)]
            name: String,
            #[serde(rename = "Hash")]
            hash: String,
            #[serde(rename = "Size", default)]
            size: u64,
            #[serde(rename = "Type", default)]
            node_type: u8,
        }

        let resp: LsResponse = self.post_json("/api/v0/ls", &cid.to_string()).await?;
        let mut entries = Vec::new();
        for object in resp.objects {
            for link in object.links {
                let cid = ipfsd_core::cid::parse(&link.hash).map_err(|e| ApiError::Decode(e.to_string()))?;
                entries.push(DirEntry {
                    name: link.name,
                    cid,
                    file_type: unixfs_file_type(link.node_type),
                    size: link.size,
                });
            }
        }
        Ok(entries)
    }
}

#[async_trait]
impl IpfsApi for HttpIpfsApi {
    async fn dag_get(&self, cid: &Cid) -> Result<Node, ApiError> {
        #[derive(Deserialize, Default)]
        struct DagGetData {
            #[serde(rename = "Type", default)]
            node_type: Option<u8>,
        }
        #[derive(Deserialize)]
        struct DagGetResponse {
            #[serde(rename = "Data", default)]
            data: DagGetData,
        }

        let meta: DagGetResponse = self.post_json("/api/v0/dag/get", &cid.to_string()).await?;
        match meta.data.node_type {
            Some(UNIXFS_TYPE_DIRECTORY) | Some(UNIXFS_TYPE_HAMT_SHARD) => {
                Ok(Node::Directory(self.ls_entries(cid).await?))
            }
            Some(UNIXFS_TYPE_SYMLINK) => {
                let bytes = self.post_bytes("/api/v0/cat", &cid.to_string()).await?;
                let target = String::from_utf8(bytes.to_vec()).map_err(|e| ApiError::Decode(e.to_string()))?;
                Ok(Node::Symlink(target))
            }
            Some(UNIXFS_TYPE_FILE) | Some(UNIXFS_TYPE_METADATA) => {
                Ok(Node::File(self.post_bytes("/api/v0/cat", &cid.to_string()).await?))
            }
            _ => Ok(Node::Raw(self.post_bytes("/api/v0/cat", &cid.to_string()).await?)),
        }
    }

    fn unixfs_ls(&self, cid: &Cid) -> BoxStream<'static, Result<DirEntry, ApiError>> {
        let client = self.client.clone();
        let base_url = self.base_url.clone();
        let cid = *cid;
        Box::pin(
            stream::once(async move {
                let api = HttpIpfsApi { client, base_url };
                api.ls_entries(&cid).await
            })
            .flat_map(|result| match result {
                Ok(entries) => stream::iter(entries.into_iter().map(Ok)).boxed(),
                Err(e) => stream::iter(vec![Err(e)]).boxed(),
            }),
        )
    }

    async fn name_resolve(&self, name: &str) -> Result<Cid, ApiError> {
        #[derive(Deserialize)]
        struct NameResolveResponse {
            #[serde(rename = "Path")]
            path: String,
        }
        let resp: NameResolveResponse =
            self.post_json("/api/v0/name/resolve", &format!("/ipns/{name}")).await?;
        let cid_text = resp.path.strip_prefix("/ipfs/").unwrap_or(&resp.path);
        ipfsd_core::cid::parse(cid_text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn pin_ls(&self) -> BoxStream<'static, Result<Cid, ApiError>> {
        #[derive(Deserialize)]
        struct PinLsResponse {
            #[serde(rename = "Keys", default)]
            keys: HashMap<String, serde_json::Value>,
        }

        let client = self.client.clone();
        let base_url = self.base_url.clone();
        Box::pin(
            stream::once(async move {
                let api = HttpIpfsApi { client, base_url };
                let parsed: PinLsResponse = api.fetch_json("/api/v0/pin/ls").await?;
                parsed
                    .keys
                    .into_keys()
                    .map(|text| ipfsd_core::cid::parse(&text).map_err(|e| ApiError::Decode(e.to_string())))
                    .collect::<Result<Vec<Cid>, ApiError>>()
            })
            .flat_map(|result| match result {
                Ok(cids) => stream::iter(cids.into_iter().map(Ok)).boxed(),
                Err(e) => stream::iter(vec![Err(e)]).boxed(),
            }),
        )
    }

    fn key_list(&self) -> BoxStream<'static, Result<KeyEntry, ApiError>> {
        #[derive(Deserialize)]
        struct KeyListResponse {
            #[serde(rename = "Keys", default)]
            keys: Vec<KeyListEntry>,
        }
        #[derive(Deserialize)]
        struct KeyListEntry {
            #[serde(rename = "Name")]
            name: String,
            #[serde(rename = "Id")]
            id: String,
        }

        let client = self.client.clone();
        let base_url = self.base_url.clone();
        Box::pin(
            stream::once(async move {
                let api = HttpIpfsApi { client, base_url };
                let resp: KeyListResponse = api.fetch_json("/api/v0/key/list").await?;
                Ok(resp
                    .keys
                    .into_iter()
                    .map(|entry| KeyEntry { name: entry.name, ipns_name: format!("/ipns/{}", entry.id) })
                    .collect::<Vec<_>>())
            })
            .flat_map(|result: Result<Vec<KeyEntry>, ApiError>| match result {
                Ok(entries) => stream::iter(entries.into_iter().map(Ok)).boxed(),
                Err(e) => stream::iter(vec![Err(e)]).boxed(),
            }),
        )
    }

    async fn key_publish(&self, name: &str, target: &str) -> Result<(), ApiError> {
        self.post_unit("/api/v0/key/gen", &[("arg", name), ("type", "ed25519")]).await?;
        self.post_unit("/api/v0/name/publish", &[("arg", target), ("key", name)]).await
    }

    async fn pin_add(&self, cid: &Cid) -> Result<(), ApiError> {
        self.post_unit("/api/v0/pin/add", &[("arg", &cid.to_string())]).await
    }
}
