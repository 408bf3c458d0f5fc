// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The command-request envelope used to dispatch RPC calls over HTTP.

use serde::{Deserialize, Serialize};

/// A dotted command path, e.g. `["service", "daemon", "stop"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandPath(pub Vec<String>);

impl CommandPath {
    pub fn new(segments: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Whether `other` is this path or one of its subcommands.
    pub fn is_prefix_of(&self, other: &CommandPath) -> bool {
        other.0.len() >= self.0.len() && other.0[..self.0.len()] == self.0[..]
    }
}

impl std::fmt::Display for CommandPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.0.join("/"))
    }
}

/// A command dispatched to the daemon's HTTP handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRequest {
    pub path: CommandPath,
}

impl CommandRequest {
    pub fn new(path: CommandPath) -> Self {
        Self { path }
    }
}

/// The daemon's reply to a [`CommandRequest`] that isn't itself a
/// `Response` stream (e.g. rejecting a locally-only command).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandReply {
    Accepted,
    /// A locally-only command was invoked remotely; only its subcommands
    /// are exposed.
    LocalOnly { path: CommandPath },
}

impl CommandReply {
    pub fn local_only(path: CommandPath) -> Self {
        Self::LocalOnly { path }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_check() {
        let daemon = CommandPath::new(["service", "daemon"]);
        let stop = CommandPath::new(["service", "daemon", "stop"]);
        assert!(daemon.is_prefix_of(&stop));
        assert!(!stop.is_prefix_of(&daemon));
    }

    #[test]
    fn display_is_slash_joined() {
        let path = CommandPath::new(["service", "daemon", "stop"]);
        assert_eq!(path.to_string(), "/service/daemon/stop");
    }

    #[test]
    fn request_round_trips_through_json() {
        let req = CommandRequest::new(CommandPath::new(["service", "daemon", "stop"]));
        let json = serde_json::to_string(&req).unwrap();
        let decoded: CommandRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(req.path, decoded.path);
    }
}
