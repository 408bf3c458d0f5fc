// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Launches the daemon as a subprocess, reads its startup sequence from
//! stdout, and detaches from it once a listener address has been
//! captured.

use std::process::Stdio;
use std::time::Duration;

use ipfsd_core::{Multiaddr, Response, Status};
use ipfsd_wire::split;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

use crate::error::ClientError;

/// The ASCII EOT byte the client sends once it has captured a listener
/// address, telling the daemon it may stop serializing stdout writes.
const DETACH_BYTE: u8 = 0x04;

/// Spawns `self service daemon --auto-exit-interval=<d> --encoding=json`,
/// waits for its first `Starting(listener)` record, sends the detach
/// byte, and returns the captured address. The child is released (not
/// killed) on success; it is killed only if sending the detach byte fails
/// while the child is still alive.
pub async fn spawn_and_detach(
    self_exe: &std::path::Path,
    auto_exit_interval: Duration,
) -> Result<Multiaddr, ClientError> {
    let mut child = Command::new(self_exe)
        .arg("__service_daemon")
        .arg(format!("--auto-exit-interval={}", auto_exit_interval.as_secs()))
        .arg("--encoding=json")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(ClientError::Spawn)?;

    let stdout = child.stdout.take().ok_or(ClientError::MissingPipe("stdout"))?;
    let stderr = child.stderr.take().ok_or(ClientError::MissingPipe("stderr"))?;

    let (startup_tx, mut startup_rx) = mpsc::channel(8);
    let (runtime_tx, _runtime_rx) = mpsc::channel(8);
    let split_handle =
        tokio::spawn(async move { split(BufReader::new(stdout), startup_tx, runtime_tx).await });

    // Any stderr line at all is fatal, including while still waiting for
    // `Ready`; raced against the startup records rather than checked only
    // after the fact.
    let (stderr_tx, stderr_rx) = tokio::sync::oneshot::channel();
    let stderr_handle = tokio::spawn(async move {
        use tokio::io::AsyncBufReadExt;
        let mut lines = BufReader::new(stderr).lines();
        if let Ok(Some(line)) = lines.next_line().await {
            let _ = stderr_tx.send(line);
        }
    });
    tokio::pin!(stderr_rx);

    let mut listener_addr = None;
    let mut fatal_stderr = None;
    loop {
        tokio::select! {
            biased;
            line = &mut stderr_rx => {
                if let Ok(line) = line {
                    fatal_stderr = Some(line);
                }
                break;
            }
            resp = startup_rx.recv() => {
                match resp {
                    Some(resp) => {
                        if let Some(addr) = resp.listener.clone() {
                            listener_addr = Some(addr);
                        }
                        if resp.status == Status::Ready {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }

    stderr_handle.abort();
    split_handle.abort();

    if let Some(line) = fatal_stderr {
        let _ = kill_if_alive(&mut child).await;
        return Err(ClientError::SpawnedDaemonFailed(line));
    }

    let addr = match listener_addr {
        Some(addr) => addr,
        None => {
            let _ = kill_if_alive(&mut child).await;
            return Err(ClientError::SpawnedDaemonNeverReady);
        }
    };

    match detach(&mut child).await {
        // `Child`'s drop does not kill by default: releasing it here is
        // enough to let the daemon outlive this process.
        Ok(()) => Ok(addr),
        Err(e) => {
            kill_if_alive(&mut child).await;
            Err(e)
        }
    }
}

async fn detach(child: &mut Child) -> Result<(), ClientError> {
    let mut stdin = child.stdin.take().ok_or(ClientError::MissingPipe("stdin"))?;
    stdin.write_all(&[DETACH_BYTE]).await?;
    stdin.flush().await?;
    drop(stdin);
    Ok(())
}

async fn kill_if_alive(child: &mut Child) {
    if matches!(child.try_wait(), Ok(None)) {
        let _ = child.kill().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawned_daemon_never_ready_has_a_distinct_error_message() {
        let err = ClientError::SpawnedDaemonNeverReady;
        assert!(err.to_string().contains("never"));
    }

    #[test]
    fn response_status_is_used_to_detect_ready() {
        assert_eq!(Response::ready().status, Status::Ready);
    }
}
