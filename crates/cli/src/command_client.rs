// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A minimal raw HTTP/1.1 client for the daemon's command-dispatch
//! endpoint: the wire format is genuine HTTP (axum speaks it natively
//! over both TCP and Unix-domain listeners), so no HTTP client crate is
//! needed for a single POST-and-read-status round trip.

use ipfsd_core::Multiaddr;
use ipfsd_wire::{CommandPath, CommandRequest};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UnixStream};

/// Posts `path` to `/api/v0/command` on `addr` and reports whether the
/// daemon answered with a 2xx status.
pub async fn post_command(addr: &Multiaddr, path: CommandPath) -> std::io::Result<bool> {
    let body = serde_json::to_vec(&CommandRequest::new(path))
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    let request = format!(
        "POST /api/v0/command HTTP/1.1\r\n\
         Host: ipfsd\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n",
        body.len()
    );

    let mut response = Vec::new();
    if let Some(unix_path) = addr.unix_path() {
        let mut stream = UnixStream::connect(unix_path).await?;
        stream.write_all(request.as_bytes()).await?;
        stream.write_all(&body).await?;
        stream.read_to_end(&mut response).await?;
    } else if let Some(target) = addr.tcp_target() {
        let mut stream = TcpStream::connect(target).await?;
        stream.write_all(request.as_bytes()).await?;
        stream.write_all(&body).await?;
        stream.read_to_end(&mut response).await?;
    } else {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{addr} names neither a Unix-domain path nor a TCP endpoint"),
        ));
    }

    let status_line = response
        .split(|&b| b == b'\n')
        .next()
        .map(|line| String::from_utf8_lossy(line).trim().to_string())
        .unwrap_or_default();
    Ok(status_line.split_whitespace().nth(1).and_then(|code| code.parse::<u16>().ok()).is_some_and(
        |code| (200..300).contains(&code),
    ))
}
