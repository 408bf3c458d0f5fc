// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `getFirstDialable`: races a connection attempt against every candidate
//! address and returns the first that accepts, rather than retrying one.

use std::time::Duration;

use ipfsd_core::Multiaddr;
use tokio::net::{TcpStream, UnixStream};

/// Default per-attempt connect timeout.
pub const DIAL_TIMEOUT: Duration = Duration::from_secs(2);

/// Attempts a bare connect (no protocol handshake) to confirm a listener
/// is actually accepting on `addr`.
async fn try_dial(addr: &Multiaddr, timeout: Duration) -> std::io::Result<()> {
    let connect = async {
        if let Some(path) = addr.unix_path() {
            UnixStream::connect(path).await?;
            return Ok(());
        }
        if let Some(target) = addr.tcp_target() {
            TcpStream::connect(target).await?;
            return Ok(());
        }
        Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{addr} names neither a Unix-domain path nor a TCP endpoint"),
        ))
    };

    tokio::time::timeout(timeout, connect)
        .await
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::TimedOut, "dial timed out"))?
}

/// Dials every address in `addresses` concurrently and returns the first
/// one that accepts a connection, or `None` if every attempt failed.
pub async fn get_first_dialable(addresses: &[Multiaddr], timeout: Duration) -> Option<Multiaddr> {
    if addresses.is_empty() {
        return None;
    }

    let attempts = addresses.iter().cloned().map(|addr| {
        let timeout = timeout;
        async move {
            match try_dial(&addr, timeout).await {
                Ok(()) => Ok(addr),
                Err(e) => Err(e),
            }
        }
    });

    futures::future::select_ok(attempts.map(Box::pin)).await.ok().map(|(addr, _)| addr)
}
