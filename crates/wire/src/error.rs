// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors surfaced by decoding and sequence validation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("malformed response record: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("response sequence violation: {0}")]
    Sequence(String),
}
