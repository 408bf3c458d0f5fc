// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The daemon's three-phase response record.

use serde::{Deserialize, Serialize};

use crate::multiaddr::Multiaddr;

/// The cause that produced a `Stopping` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    Canceled = 1,
    Idle = 2,
    Requested = 3,
    Error = 4,
}

impl Reason {
    pub fn wire_value(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Reason::Canceled => "canceled",
            Reason::Idle => "idle",
            Reason::Requested => "requested",
            Reason::Error => "error",
        };
        f.write_str(s)
    }
}

/// The phase a [`Response`] belongs to.
///
/// `Info` is the non-terminal announcement category (trigger "established"
/// lines, per-listener teardown notices): it carries `info` and never a
/// `stop_reason`. `Stopping` is strictly terminal and always carries one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Starting,
    Ready,
    Info,
    Stopping,
}

/// A single record in the daemon's response stream.
///
/// At most one of `listener` or `info` is set; `Stopping` records always
/// carry a `stop_reason`; `Info` records carry a nonempty `info` and no
/// `stop_reason`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listener: Option<Multiaddr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<Reason>,
}

impl Response {
    pub fn starting() -> Self {
        Self { status: Status::Starting, listener: None, info: None, stop_reason: None }
    }

    pub fn starting_listener(addr: Multiaddr) -> Self {
        Self { status: Status::Starting, listener: Some(addr), info: None, stop_reason: None }
    }

    pub fn info(info: impl Into<String>) -> Self {
        Self { status: Status::Info, listener: None, info: Some(info.into()), stop_reason: None }
    }

    pub fn ready() -> Self {
        Self { status: Status::Ready, listener: None, info: None, stop_reason: None }
    }

    pub fn stopping(reason: Reason) -> Self {
        Self { status: Status::Stopping, listener: None, info: None, stop_reason: Some(reason) }
    }

    /// Serializes as a single line of JSON, newline-terminated: the wire is
    /// text and lines, not length-prefixed framing.
    pub fn to_line(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }

    pub fn from_line(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_has_no_listener_or_info() {
        let r = Response::starting();
        assert_eq!(r.status, Status::Starting);
        assert!(r.listener.is_none());
        assert!(r.info.is_none());
    }

    #[test]
    fn stopping_carries_reason() {
        let r = Response::stopping(Reason::Idle);
        assert_eq!(r.stop_reason, Some(Reason::Idle));
    }

    #[test]
    fn line_round_trips() {
        let addr = Multiaddr::parse("/unix/var/run/fs/server").unwrap();
        let r = Response::starting_listener(addr);
        let line = r.to_line().unwrap();
        assert!(line.ends_with('\n'));
        let decoded = Response::from_line(&line).unwrap();
        assert_eq!(r, decoded);
    }

    #[test]
    fn wire_values_are_stable() {
        assert_eq!(Reason::Canceled.wire_value(), 1);
        assert_eq!(Reason::Idle.wire_value(), 2);
        assert_eq!(Reason::Requested.wire_value(), 3);
        assert_eq!(Reason::Error.wire_value(), 4);
    }
}
