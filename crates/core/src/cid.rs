// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Content identifiers: the opaque byte-identity keying every node cache.

use crate::error::{Error, Kind};

/// Re-exported so callers never need to depend on the `cid` crate directly.
pub use cid::Cid;

/// Parses a CID string component. An unrecognized multibase prefix maps to
/// *not-exist* (the path component just isn't a CID), anything else maps to
/// *I/O* (a malformed-but-recognizable encoding).
pub fn parse(text: &str) -> Result<Cid, Error> {
    Cid::try_from(text).map_err(|e| {
        // Multibase-prefix failures mean "this isn't shaped like a CID at
        // all"; anything else is a recognizable-but-malformed encoding.
        if e.to_string().to_lowercase().contains("multibase") {
            Error::not_exist(format!("not a CID: {text:?}"))
        } else {
            Error::with_source(Kind::Io, format!("malformed CID {text:?}"), e)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_cid_parses() {
        let text = "bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi";
        assert!(parse(text).is_ok());
    }

    #[test]
    fn garbage_is_not_exist() {
        let err = parse("not-a-cid-at-all").unwrap_err();
        assert!(err.is_not_exist());
    }
}
