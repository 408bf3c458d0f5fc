// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Locate-or-spawn (component H): dial explicit addresses, then default
//! addresses, then fall back to spawning a daemon of our own.

use std::path::PathBuf;
use std::time::Duration;

use ipfsd_core::{settings::DEFAULT_AUTO_EXIT_INTERVAL, Multiaddr};

use crate::dial::{get_first_dialable, DIAL_TIMEOUT};
use crate::error::ClientError;
use crate::spawn::spawn_and_detach;

/// User- and system-level default addresses tried when a request supplies
/// none of its own. `IPFSD_STATE_DIR > XDG_STATE_HOME/ipfsd > ~/.local/state/ipfsd`
/// for the user default, `/run/ipfsd/fs/server` for the system one.
pub fn default_addresses() -> Vec<Multiaddr> {
    let mut addrs = Vec::new();

    let user_dir = if let Ok(dir) = std::env::var("IPFSD_STATE_DIR") {
        PathBuf::from(dir)
    } else if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        PathBuf::from(xdg).join("ipfsd")
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        PathBuf::from(home).join(".local/state/ipfsd")
    };
    let user_path = user_dir.join("fs").join("server");
    if let Ok(addr) = Multiaddr::parse(&format!("/unix{}", user_path.display())) {
        addrs.push(addr);
    }

    if let Ok(addr) = Multiaddr::parse("/unix/run/ipfsd/fs/server") {
        addrs.push(addr);
    }

    addrs
}

/// Whether the parsed request names the `service daemon stop` subcommand:
/// when set, locate-or-spawn must not spawn a daemon on a failed locate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocateRequest<'a> {
    pub explicit_addresses: &'a [Multiaddr],
    pub is_stop_subcommand: bool,
}

/// Finds a live daemon to talk to, spawning one only when necessary and
/// allowed.
pub async fn locate_or_spawn(
    request: LocateRequest<'_>,
    self_exe: &std::path::Path,
    auto_exit_interval: Duration,
) -> Result<Multiaddr, ClientError> {
    if !request.explicit_addresses.is_empty() {
        return get_first_dialable(request.explicit_addresses, DIAL_TIMEOUT).await.ok_or_else(|| {
            ClientError::CouldNotConnect { tried: request.explicit_addresses.to_vec() }
        });
    }

    let defaults = default_addresses();
    if let Some(addr) = get_first_dialable(&defaults, DIAL_TIMEOUT).await {
        return Ok(addr);
    }

    if request.is_stop_subcommand {
        return Err(ClientError::StopWithNoLiveDaemon);
    }

    spawn_and_detach(self_exe, auto_exit_interval).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_addresses_are_never_empty() {
        assert!(!default_addresses().is_empty());
    }

    #[tokio::test]
    async fn stop_subcommand_does_not_spawn_when_no_default_is_reachable() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("IPFSD_STATE_DIR", dir.path());
        let request = LocateRequest { explicit_addresses: &[], is_stop_subcommand: true };
        let result =
            locate_or_spawn(request, std::path::Path::new("/nonexistent"), DEFAULT_AUTO_EXIT_INTERVAL).await;
        std::env::remove_var("IPFSD_STATE_DIR");
        assert!(matches!(result, Err(ClientError::StopWithNoLiveDaemon)));
    }

    #[tokio::test]
    async fn explicit_addresses_that_fail_to_dial_are_reported_without_spawning() {
        let dead = Multiaddr::parse("/ip4/127.0.0.1/tcp/1").unwrap();
        let request = LocateRequest { explicit_addresses: std::slice::from_ref(&dead), is_stop_subcommand: false };
        let result =
            locate_or_spawn(request, std::path::Path::new("/nonexistent"), DEFAULT_AUTO_EXIT_INTERVAL).await;
        assert!(matches!(result, Err(ClientError::CouldNotConnect { .. })));
    }
}
