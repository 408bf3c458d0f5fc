// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A minimal IPLD/UnixFS node shape: just enough to drive path resolution,
//! directory listing, and file reads.

use std::time::SystemTime;

use bytes::Bytes;
use ipfsd_core::{Cid, FileInfo, FileType, Mode};

/// A directory entry as produced by listing, independent of any cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub cid: Cid,
    pub file_type: FileType,
    pub size: u64,
}

/// A decoded node. `Raw` covers anything that isn't UnixFS-shaped (e.g. a
/// bare DAG-CBOR blob): treated as a regular file of its encoded bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Directory(Vec<DirEntry>),
    File(Bytes),
    Symlink(String),
    Raw(Bytes),
}

impl Node {
    pub fn file_type(&self) -> FileType {
        match self {
            Node::Directory(_) => FileType::Directory,
            Node::File(_) => FileType::Regular,
            Node::Symlink(_) => FileType::Symlink,
            Node::Raw(_) => FileType::Irregular,
        }
    }

    pub fn size(&self) -> u64 {
        match self {
            Node::Directory(entries) => entries.len() as u64,
            Node::File(bytes) | Node::Raw(bytes) => bytes.len() as u64,
            Node::Symlink(target) => target.len() as u64,
        }
    }

    /// Derives a [`FileInfo`] for this node, the way the node cache fills
    /// in `info` lazily for a node-only record.
    pub fn to_file_info(&self, name: impl Into<String>, permissions: u32) -> FileInfo {
        FileInfo::new(
            name,
            self.size(),
            Mode::new(self.file_type(), permissions),
            SystemTime::now(),
        )
    }

    pub fn as_directory(&self) -> Option<&[DirEntry]> {
        match self {
            Node::Directory(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_symlink_target(&self) -> Option<&str> {
        match self {
            Node::Symlink(target) => Some(target.as_str()),
            _ => None,
        }
    }

    pub fn as_file_bytes(&self) -> Option<&Bytes> {
        match self {
            Node::File(bytes) | Node::Raw(bytes) => Some(bytes),
            _ => None,
        }
    }
}
