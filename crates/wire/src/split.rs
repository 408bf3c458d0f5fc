// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Drives a line source through the two-phase startup/runtime split.

use ipfsd_core::response::Response;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

use crate::error::WireError;
use crate::sequence::{RecordPhase, SequenceValidator};

/// Reads newline-delimited `Response` records from `lines` and feeds them
/// into the startup/runtime split, forwarding each decoded record to
/// `startup_tx` until (and including) the `Ready` record, then to
/// `runtime_tx` for everything after.
///
/// Returns once the source closes cleanly (after `Ready` was seen) or a
/// sequence/decode/IO error occurs; the senders are dropped either way so
/// receivers observe the channel closing.
pub async fn split<R>(
    lines: R,
    startup_tx: mpsc::Sender<Response>,
    runtime_tx: mpsc::Sender<Response>,
) -> Result<(), WireError>
where
    R: AsyncBufRead + Unpin,
{
    let mut validator = SequenceValidator::new();
    let mut lines = lines.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let resp = Response::from_line(&line)?;
        match validator.accept(&resp)? {
            RecordPhase::Startup => {
                if startup_tx.send(resp).await.is_err() {
                    return Ok(());
                }
            }
            RecordPhase::StartupComplete => {
                if startup_tx.send(resp).await.is_err() {
                    return Ok(());
                }
            }
            RecordPhase::Runtime => {
                if runtime_tx.send(resp).await.is_err() {
                    return Ok(());
                }
            }
        }
    }

    validator.at_eof()
}

/// Writes `Response` records as newline-delimited JSON to an async sink.
pub async fn emit<W>(sink: &mut W, resp: &Response) -> Result<(), WireError>
where
    W: tokio::io::AsyncWrite + Unpin,
{
    use tokio::io::AsyncWriteExt;
    let line = resp.to_line()?;
    sink.write_all(line.as_bytes()).await?;
    sink.flush().await?;
    Ok(())
}
