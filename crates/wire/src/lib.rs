// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Wire encoding: the response-stream sequence validator, the async
//! split/emit drivers, and the command-request envelope.

pub mod error;
pub mod request;
pub mod sequence;
pub mod split;

pub use error::WireError;
pub use request::{CommandReply, CommandPath, CommandRequest};
pub use sequence::{RecordPhase, SequenceValidator};
pub use split::{emit, split};
