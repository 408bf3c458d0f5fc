// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The read-through file-system family: IPLD node/directory decoding, the
//! bounded node and directory caches, capability-described open handles,
//! and the IPFS/IPNS/PinFS/KeyFS engines built on top of them.

pub mod api;
pub mod cache;
pub mod engine;
pub mod handle;
pub mod handler;
pub mod ipld;
pub mod keyfs;
pub mod pinfs;

pub use api::http::HttpIpfsApi;
pub use api::{ApiError, IpfsApi, KeyEntry};
pub use cache::{DirectoryCache, NodeCache, NodeRecord};
pub use engine::{IpfsEngine, IpnsEngine, RootExpiry};
pub use handle::{Capabilities, DirHandle, FileHandle, OpenHandle};
pub use handler::{router, HandlerState};
pub use ipld::{DirEntry, Node};
pub use keyfs::KeyFs;
pub use pinfs::{PinExpiry, PinFs};
