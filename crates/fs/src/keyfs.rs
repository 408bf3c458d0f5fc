// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! KeyFS: a virtual root directory listing the host's named (mutable) IPNS
//! keys, with `Open` forwarded to an injected IPNS engine and an optional
//! `Symlink` mutation.

use std::sync::Arc;
use std::time::SystemTime;

use futures::StreamExt;
use ipfsd_core::{Clock, Error, FileInfo, FileType, Mode};

use crate::api::IpfsApi;
use crate::engine::IpnsEngine;
use crate::handle::{DirHandle, OpenHandle};
use crate::ipld::DirEntry;

const ROOT_PERMISSIONS: u32 = 0o555;

pub struct KeyFs<C: Clock + 'static> {
    api: Arc<dyn IpfsApi>,
    ipns: Arc<IpnsEngine<C>>,
}

impl<C: Clock + 'static> KeyFs<C> {
    pub fn new(api: Arc<dyn IpfsApi>, ipns: Arc<IpnsEngine<C>>) -> Self {
        Self { api, ipns }
    }

    fn root_info() -> FileInfo {
        FileInfo::new(".", 0, Mode::new(FileType::Directory, ROOT_PERMISSIONS), SystemTime::now())
    }

    pub async fn stat(&self, name: &str) -> Result<FileInfo, Error> {
        if name == "." {
            return Ok(Self::root_info());
        }
        let translated = self.translate(name).await?;
        self.ipns.stat(&translated).await
    }

    pub async fn open(&self, name: &str) -> Result<OpenHandle, Error> {
        if name == "." {
            let entries = self.list_key_entries().await?;
            return Ok(OpenHandle::Directory(DirHandle::from_snapshot(Self::root_info(), entries)));
        }
        let translated = self.translate(name).await?;
        self.ipns.open(&translated).await
    }

    /// Replaces `name`'s leading component with the key's published IPNS
    /// name, if it names a known key; otherwise passes `name` through.
    async fn translate(&self, name: &str) -> Result<String, Error> {
        let (head, rest) = match name.split_once('/') {
            Some((h, r)) => (h, Some(r)),
            None => (name, None),
        };
        let mut keys = self.api.key_list();
        while let Some(entry) = keys.next().await {
            let entry = entry?;
            if entry.name == head {
                let published = entry.ipns_name.strip_prefix("/ipns/").unwrap_or(&entry.ipns_name);
                return Ok(match rest {
                    Some(r) => format!("{published}/{r}"),
                    None => published.to_string(),
                });
            }
        }
        Ok(name.to_string())
    }

    async fn list_key_entries(&self) -> Result<Vec<DirEntry>, Error> {
        let mut keys = self.api.key_list();
        let mut entries = Vec::new();
        while let Some(entry) = keys.next().await {
            let entry = entry?;
            let cid = ipfsd_core::cid::parse(
                entry.ipns_name.strip_prefix("/ipns/").unwrap_or(&entry.ipns_name),
            )?;
            entries.push(DirEntry { name: entry.name, cid, file_type: FileType::Symlink, size: 0 });
        }
        Ok(entries)
    }

    /// Creates `new` as a named key publishing a UnixFS symlink to `old`,
    /// optionally pinning the resulting link node.
    pub async fn symlink(&self, old: &str, new: &str, pin: bool) -> Result<(), Error> {
        self.api.key_publish(new, old).await?;
        if pin {
            let mut keys = self.api.key_list();
            while let Some(entry) = keys.next().await {
                let entry = entry?;
                if entry.name == new {
                    let cid = ipfsd_core::cid::parse(
                        entry.ipns_name.strip_prefix("/ipns/").unwrap_or(&entry.ipns_name),
                    )?;
                    self.api.pin_add(&cid).await?;
                    break;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeIpfsApi;
    use crate::engine::IpfsEngine;
    use crate::ipld::Node;
    use crate::engine::RootExpiry;
    use bytes::Bytes;
    use ipfsd_core::FakeClock;
    use std::time::Duration;

    #[tokio::test]
    async fn lists_named_keys() {
        let api = FakeIpfsApi::new();
        api.add_key("self", "/ipns/bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi");
        let api = Arc::new(api);
        let ipfs = Arc::new(IpfsEngine::new(api.clone(), 64, Duration::from_secs(60)));
        let ipns = Arc::new(crate::engine::IpnsEngine::new(
            ipfs,
            api.clone(),
            FakeClock::new(),
            RootExpiry::Disabled,
            40,
            Duration::from_secs(60),
        ));

        let keyfs = KeyFs::new(api, ipns);
        let handle = keyfs.open(".").await.unwrap();
        let mut dir = match handle {
            OpenHandle::Directory(d) => d,
            _ => panic!("expected directory"),
        };
        let entries = dir.read_dir(-1).await.unwrap().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "self");
    }

    #[tokio::test]
    async fn symlink_creates_a_key_and_optionally_pins() {
        let api = Arc::new(FakeIpfsApi::new());
        let ipfs = Arc::new(IpfsEngine::new(api.clone(), 64, Duration::from_secs(60)));
        let ipns = Arc::new(crate::engine::IpnsEngine::new(
            ipfs,
            api.clone(),
            FakeClock::new(),
            RootExpiry::Disabled,
            40,
            Duration::from_secs(60),
        ));

        let keyfs = KeyFs::new(api.clone(), ipns);
        keyfs.symlink("/ipfs/bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi", "mykey", true)
            .await
            .unwrap();

        let entries = keyfs.list_key_entries().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "mykey");
    }

    #[test]
    fn fake_helper_compiles() {
        let _ = Bytes::from_static(b"x");
        let _ = Node::Directory(vec![]);
    }
}
