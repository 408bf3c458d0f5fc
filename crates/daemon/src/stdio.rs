// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Standard-IO synchronization: the orchestrator writes one JSON line per
//! [`ipfsd_core::Response`] to stdout; a background task watches stdin for
//! the ASCII EOT (0x04) detach byte a locating client sends after it has
//! read the `Ready` line, and from then on silently drops every `emit`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ipfsd_core::Response;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::Mutex as AsyncMutex;

/// The byte a client sends on stdin to request detaching from the
/// daemon's lifetime (it keeps running; the client's `emit` stream ends).
pub const DETACH_BYTE: u8 = 0x04;

pub struct StdioSync {
    stdout: AsyncMutex<Option<tokio::io::Stdout>>,
    detached: Arc<AtomicBool>,
}

impl StdioSync {
    pub fn new() -> Self {
        Self { stdout: AsyncMutex::new(Some(tokio::io::stdout())), detached: Arc::new(AtomicBool::new(false)) }
    }

    /// Serializes `response` and writes it to stdout, unless detach has
    /// already happened, in which case this silently no-ops.
    pub async fn emit(&self, response: &Response) -> Result<(), crate::error::DaemonError> {
        if self.detached.load(Ordering::Acquire) {
            return Ok(());
        }
        let line = response.to_line().map_err(ipfsd_wire::WireError::from)?;
        let mut guard = self.stdout.lock().await;
        if let Some(stdout) = guard.as_mut() {
            stdout.write_all(line.as_bytes()).await?;
            stdout.flush().await?;
        }
        Ok(())
    }

    /// Reads stdin one byte at a time until the detach byte arrives (or
    /// stdin closes), then drops the stdout handle so later `emit` calls
    /// become no-ops. Runs as a background task for the orchestrator's
    /// lifetime.
    pub async fn watch_for_detach(&self) {
        let mut stdin = tokio::io::stdin();
        let mut byte = [0u8; 1];
        loop {
            match stdin.read_exact(&mut byte).await {
                Ok(()) if byte[0] == DETACH_BYTE => break,
                Ok(()) => continue,
                Err(_) => break,
            }
        }
        self.detached.store(true, Ordering::Release);
        self.stdout.lock().await.take();
    }
}

impl Default for StdioSync {
    fn default() -> Self {
        Self::new()
    }
}
