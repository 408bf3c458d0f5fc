// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turns multiaddresses into listeners (component C): for Unix-domain
//! addresses, creates the parent directory before binding and remembers it
//! so it can be removed again once the listener is shut down.

use std::collections::HashSet;
use std::path::PathBuf;

use ipfsd_core::Multiaddr;
use tokio::net::{TcpListener, UnixListener};

use crate::error::DaemonError;

/// Mode for a freshly created Unix-domain socket directory.
const UNIX_DIR_MODE: u32 = 0o775;

/// A bound listener, together with the address it was bound from and, for
/// Unix-domain sockets, the parent directory to remove on shutdown.
pub enum Listener {
    Tcp { addr: Multiaddr, listener: TcpListener },
    Unix { addr: Multiaddr, listener: UnixListener, cleanup_dir: PathBuf },
}

impl Listener {
    pub fn addr(&self) -> &Multiaddr {
        match self {
            Listener::Tcp { addr, .. } => addr,
            Listener::Unix { addr, .. } => addr,
        }
    }
}

/// Binds each address in `addresses`. Unix-domain addresses resolving to
/// the same path are deduplicated (the later duplicate is skipped, not
/// reported as an error). A failure on one address does not stop the
/// others from being attempted.
pub async fn acquire(addresses: &[Multiaddr]) -> Vec<(Multiaddr, Result<Listener, DaemonError>)> {
    let mut seen_paths = HashSet::new();
    let mut results = Vec::with_capacity(addresses.len());

    for addr in addresses {
        if let Some(path) = addr.unix_path() {
            if !seen_paths.insert(path) {
                continue;
            }
        }
        let result = bind_one(addr).await;
        results.push((addr.clone(), result));
    }

    results
}

/// Default addresses tried when settings supply none: a single per-user
/// Unix-domain socket under the resolved state directory. (Spec also names
/// a system-wide run-directory default; this build only ever runs as a
/// per-user service, so only the user default is produced.)
pub fn default_addresses() -> Vec<Multiaddr> {
    let path = state_dir().join("fs").join("server");
    let text = format!("/unix{}", path.display());
    Multiaddr::parse(&text).map(|a| vec![a]).unwrap_or_default()
}

/// `IPFSD_STATE_DIR` > `XDG_STATE_HOME/ipfsd` > `~/.local/state/ipfsd`.
fn state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("IPFSD_STATE_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(xdg).join("ipfsd");
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".local/state/ipfsd")
}

async fn bind_one(addr: &Multiaddr) -> Result<Listener, DaemonError> {
    if let Some(path) = addr.unix_path() {
        return bind_unix(addr, path).await;
    }
    if let Some(target) = addr.tcp_target() {
        let listener =
            TcpListener::bind(&target).await.map_err(|e| DaemonError::BindFailed(addr.clone(), e))?;
        return Ok(Listener::Tcp { addr: addr.clone(), listener });
    }
    Err(DaemonError::UnsupportedAddress(addr.clone()))
}

async fn bind_unix(addr: &Multiaddr, path: String) -> Result<Listener, DaemonError> {
    let socket_path = PathBuf::from(&path);
    let parent = socket_path.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("/"));

    tokio::fs::create_dir_all(&parent).await.map_err(|e| DaemonError::BindFailed(addr.clone(), e))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(UNIX_DIR_MODE);
        let _ = tokio::fs::set_permissions(&parent, perms).await;
    }

    if tokio::fs::try_exists(&socket_path).await.unwrap_or(false) {
        let exists = std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("{} already exists", socket_path.display()),
        );
        return Err(DaemonError::BindFailed(addr.clone(), exists));
    }

    let listener =
        UnixListener::bind(&socket_path).map_err(|e| DaemonError::BindFailed(addr.clone(), e))?;
    Ok(Listener::Unix { addr: addr.clone(), listener, cleanup_dir: parent })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn binds_an_ephemeral_tcp_port() {
        let addr = Multiaddr::parse("/ip4/127.0.0.1/tcp/0").unwrap();
        let results = acquire(&[addr]).await;
        assert_eq!(results.len(), 1);
        assert!(results[0].1.is_ok());
    }

    #[tokio::test]
    async fn binds_a_unix_socket_under_a_fresh_directory() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("fs").join("server");
        let addr = Multiaddr::parse(&format!("/unix{}", socket_path.display())).unwrap();
        let results = acquire(&[addr]).await;
        assert_eq!(results.len(), 1);
        assert!(results[0].1.is_ok());
        assert!(socket_path.exists());
    }

    #[tokio::test]
    async fn preexisting_path_is_a_fatal_error_for_that_address() {
        let dir = tempfile::tempdir().unwrap();
        let fs_dir = dir.path().join("fs");
        std::fs::create_dir_all(&fs_dir).unwrap();
        let socket_path = fs_dir.join("server");
        std::fs::write(&socket_path, b"not a socket").unwrap();

        let addr = Multiaddr::parse(&format!("/unix{}", socket_path.display())).unwrap();
        let results = acquire(&[addr]).await;
        assert_eq!(results.len(), 1);
        assert!(results[0].1.is_err());
    }

    #[tokio::test]
    async fn duplicate_unix_paths_are_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("fs").join("server");
        let text = format!("/unix{}", socket_path.display());
        let addrs = vec![Multiaddr::parse(&text).unwrap(), Multiaddr::parse(&text).unwrap()];
        let results = acquire(&addrs).await;
        assert_eq!(results.len(), 1);
    }
}
