// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PinFS: a virtual root directory listing the host's recursively pinned
//! CID set, with an optional delegated `Stat` through an injected IPFS
//! engine.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use futures::StreamExt;
use ipfsd_core::{Cid, Clock, Error, FileInfo, FileType, Mode};
use parking_lot::Mutex;

use crate::api::IpfsApi;
use crate::engine::IpfsEngine;
use crate::handle::{DirHandle, OpenHandle};
use crate::ipld::DirEntry;

const ROOT_PERMISSIONS: u32 = 0o555;
const PIN_ENTRY_PERMISSIONS: u32 = 0o444;

/// TTL for the whole-set pin listing snapshot.
#[derive(Debug, Clone, Copy)]
pub enum PinExpiry {
    /// Once fetched, the snapshot is never refreshed.
    Forever,
    Ttl(Duration),
}

impl PinExpiry {
    /// Spec convention: negative seconds means "caches forever".
    pub fn from_seconds(secs: i64) -> Self {
        if secs < 0 {
            PinExpiry::Forever
        } else {
            PinExpiry::Ttl(Duration::from_secs(secs as u64))
        }
    }
}

struct Snapshot {
    pins: Vec<Cid>,
    fetched_at: u64,
}

pub struct PinFs<C: Clock = ipfsd_core::SystemClock> {
    api: Arc<dyn IpfsApi>,
    ipfs: Option<Arc<IpfsEngine>>,
    clock: C,
    expiry: PinExpiry,
    snapshot: Mutex<Option<Snapshot>>,
}

impl<C: Clock> PinFs<C> {
    pub fn new(api: Arc<dyn IpfsApi>, ipfs: Option<Arc<IpfsEngine>>, clock: C, expiry: PinExpiry) -> Self {
        Self { api, ipfs, clock, expiry, snapshot: Mutex::new(None) }
    }

    fn root_info() -> FileInfo {
        FileInfo::new(".", 0, Mode::new(FileType::Directory, ROOT_PERMISSIONS), SystemTime::now())
    }

    pub async fn stat(&self, name: &str) -> Result<FileInfo, Error> {
        if name == "." {
            return Ok(Self::root_info());
        }
        match &self.ipfs {
            Some(ipfs) => ipfs.stat(name).await,
            None => {
                let cid = ipfsd_core::cid::parse(name)?;
                Ok(FileInfo::new(
                    cid.to_string(),
                    0,
                    Mode::new(FileType::Directory, PIN_ENTRY_PERMISSIONS),
                    SystemTime::now(),
                ))
            }
        }
    }

    pub async fn open(&self, name: &str) -> Result<OpenHandle, Error> {
        if name == "." {
            let pins = self.list_pins().await?;
            let entries = pins
                .into_iter()
                .map(|cid| DirEntry {
                    name: cid.to_string(),
                    cid,
                    file_type: FileType::Directory,
                    size: 0,
                })
                .collect();
            return Ok(OpenHandle::Directory(DirHandle::from_snapshot(Self::root_info(), entries)));
        }
        match &self.ipfs {
            Some(ipfs) => ipfs.open(name).await,
            None => Err(Error::unsupported("no IPFS engine injected to open pinned entries")),
        }
    }

    async fn list_pins(&self) -> Result<Vec<Cid>, Error> {
        if let Some(snapshot) = self.snapshot.lock().as_ref() {
            match self.expiry {
                PinExpiry::Forever => return Ok(snapshot.pins.clone()),
                PinExpiry::Ttl(ttl) => {
                    let now = self.clock.epoch_ms();
                    if now.saturating_sub(snapshot.fetched_at) < ttl.as_millis() as u64 {
                        return Ok(snapshot.pins.clone());
                    }
                }
            }
        }

        let mut stream = self.api.pin_ls();
        let mut pins = Vec::new();
        while let Some(item) = stream.next().await {
            pins.push(item?);
        }
        *self.snapshot.lock() = Some(Snapshot { pins: pins.clone(), fetched_at: self.clock.epoch_ms() });
        Ok(pins)
    }
}
