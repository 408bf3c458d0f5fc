// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod ipfs;
pub mod ipns;

pub use ipfs::IpfsEngine;
pub use ipns::{IpnsEngine, RootExpiry};
