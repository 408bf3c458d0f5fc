// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The response-stream sequence validator: enforces the ordering rules a
//! compliant daemon must follow and a compliant client must accept.

use ipfsd_core::response::{Response, Status};

use crate::error::WireError;

/// Which side of the startup/runtime boundary a validated record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordPhase {
    /// Still part of the startup sequence.
    Startup,
    /// The `Ready` record that closes out startup.
    StartupComplete,
    /// Part of the runtime sequence (after `Ready`).
    Runtime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    AwaitingFirstStarting,
    InStartup,
    InRuntime,
}

/// A single-pass state machine validating one response stream.
///
/// Feed it records in order via [`accept`](Self::accept); call [`at_eof`]
/// when the source closes, to catch a stream that ended before `Ready`.
pub struct SequenceValidator {
    phase: Phase,
}

impl SequenceValidator {
    pub fn new() -> Self {
        Self { phase: Phase::AwaitingFirstStarting }
    }

    pub fn accept(&mut self, resp: &Response) -> Result<RecordPhase, WireError> {
        match self.phase {
            Phase::AwaitingFirstStarting => {
                if resp.status != Status::Starting || resp.listener.is_some() {
                    return Err(WireError::Sequence(
                        "first record must be Starting with no listener".into(),
                    ));
                }
                self.phase = Phase::InStartup;
                Ok(RecordPhase::Startup)
            }
            Phase::InStartup => match resp.status {
                Status::Starting => {
                    if resp.listener.is_none() {
                        Err(WireError::Sequence("duplicate Starting(no-listener)".into()))
                    } else {
                        Ok(RecordPhase::Startup)
                    }
                }
                Status::Ready => {
                    self.phase = Phase::InRuntime;
                    Ok(RecordPhase::StartupComplete)
                }
                Status::Info => {
                    if resp.info.as_deref().unwrap_or("").is_empty() {
                        Err(WireError::Sequence("empty info record during startup".into()))
                    } else {
                        Ok(RecordPhase::Startup)
                    }
                }
                Status::Stopping => {
                    Err(WireError::Sequence("Stopping record seen before Ready".into()))
                }
            },
            Phase::InRuntime => match resp.status {
                Status::Starting | Status::Ready => Err(WireError::Sequence(
                    "Starting/Ready record seen during runtime".into(),
                )),
                Status::Info | Status::Stopping => Ok(RecordPhase::Runtime),
            },
        }
    }

    /// Call when the source reports EOF; startup must already be complete.
    pub fn at_eof(&self) -> Result<(), WireError> {
        match self.phase {
            Phase::InRuntime => Ok(()),
            _ => Err(WireError::Sequence("source closed before Ready".into())),
        }
    }
}

impl Default for SequenceValidator {
    fn default() -> Self {
        Self::new()
    }
}
