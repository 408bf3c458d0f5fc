// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors surfaced by locate-or-spawn and the dial race.

use ipfsd_core::Multiaddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not connect to any of {tried:?}")]
    CouldNotConnect { tried: Vec<Multiaddr> },

    #[error("failed to spawn the daemon subprocess: {0}")]
    Spawn(std::io::Error),

    #[error("the spawned daemon reported a fatal error on stderr: {0}")]
    SpawnedDaemonFailed(String),

    #[error("the spawned daemon closed its pipes before becoming ready")]
    SpawnedDaemonNeverReady,

    #[error("expected a piped {0} handle on the spawned child, found none")]
    MissingPipe(&'static str),

    #[error("the stop subcommand found no live daemon")]
    StopWithNoLiveDaemon,

    #[error("response wire error: {0}")]
    Wire(#[from] ipfsd_wire::WireError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
