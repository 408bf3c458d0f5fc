// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors surfaced by the daemon orchestrator and its components.

use ipfsd_core::Multiaddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("failed to bind {0}: {1}")]
    BindFailed(Multiaddr, std::io::Error),

    #[error("{0} names neither a Unix-domain path nor a TCP endpoint")]
    UnsupportedAddress(Multiaddr),

    #[error("no listener could be acquired from any configured address")]
    NoListeners,

    #[error("server error: {0}")]
    Serve(std::io::Error),

    #[error("response wire error: {0}")]
    Wire(#[from] ipfsd_wire::WireError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
