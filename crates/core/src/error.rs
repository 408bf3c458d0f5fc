// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error kinds surfaced across the workspace.

use std::fmt;

/// The taxonomy of errors the core surfaces to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Path syntactically bad, or of the wrong type for the requested operation.
    InvalidItem,
    NotExist,
    IsDir,
    NotDir,
    Permission,
    /// Network, decode, or upstream-API failure.
    Io,
    /// Use of a handle after it was closed.
    Closed,
    /// A symlink chain exceeded the configured link limit.
    Recursion,
    /// Write on a read-only handle, or seek on a non-seekable one.
    Unsupported,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Kind::InvalidItem => "invalid item",
            Kind::NotExist => "does not exist",
            Kind::IsDir => "is a directory",
            Kind::NotDir => "not a directory",
            Kind::Permission => "permission denied",
            Kind::Io => "I/O error",
            Kind::Closed => "already closed",
            Kind::Recursion => "recursion limit reached",
            Kind::Unsupported => "unsupported operation",
        };
        f.write_str(s)
    }
}

/// A core error: a [`Kind`] plus a human-readable message and optional cause.
#[derive(Debug)]
pub struct Error {
    pub kind: Kind,
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl Error {
    pub fn new(kind: Kind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), source: None }
    }

    pub fn with_source(
        kind: Kind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self { kind, message: message.into(), source: Some(Box::new(source)) }
    }

    pub fn not_exist(message: impl Into<String>) -> Self {
        Self::new(Kind::NotExist, message)
    }

    pub fn invalid_item(message: impl Into<String>) -> Self {
        Self::new(Kind::InvalidItem, message)
    }

    pub fn is_dir(message: impl Into<String>) -> Self {
        Self::new(Kind::IsDir, message)
    }

    pub fn not_dir(message: impl Into<String>) -> Self {
        Self::new(Kind::NotDir, message)
    }

    pub fn closed(message: impl Into<String>) -> Self {
        Self::new(Kind::Closed, message)
    }

    pub fn recursion(message: impl Into<String>) -> Self {
        Self::new(Kind::Recursion, message)
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(Kind::Unsupported, message)
    }

    pub fn io(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::with_source(Kind::Io, "I/O error", source)
    }

    pub fn is_not_exist(&self) -> bool {
        self.kind == Kind::NotExist
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|b| b.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind as K;
        let kind = match err.kind() {
            K::NotFound => Kind::NotExist,
            K::PermissionDenied => Kind::Permission,
            K::AlreadyExists => Kind::InvalidItem,
            _ => Kind::Io,
        };
        Self::with_source(kind, "I/O error", err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_exist_is_not_exist() {
        let err = Error::not_exist("missing");
        assert!(err.is_not_exist());
        assert_eq!(err.kind, Kind::NotExist);
    }

    #[test]
    fn io_error_not_found_maps_to_not_exist() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "nope");
        let err: Error = io_err.into();
        assert_eq!(err.kind, Kind::NotExist);
    }

    #[test]
    fn display_includes_message() {
        let err = Error::recursion("too many symlinks");
        assert_eq!(err.to_string(), "recursion limit reached: too many symlinks");
    }
}
