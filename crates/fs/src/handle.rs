// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Open file/directory handles, described by capability set rather than
//! by type assertion (per the interface-free redesign of the original's
//! `Seeker`/`ReadDirFile`/`StreamDirFile` dynamic casts).

use std::collections::VecDeque;
use std::io::SeekFrom;

use futures::stream::{self, Stream};
use ipfsd_core::{Error, FileInfo, Kind};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::ipld::DirEntry;

/// What an [`OpenHandle`] supports, queryable instead of asserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub read: bool,
    pub seek: bool,
    pub streamdir: bool,
    pub stat: bool,
}

/// A file opened for reading.
pub struct FileHandle {
    info: FileInfo,
    bytes: bytes::Bytes,
    pos: usize,
    closed: bool,
    cancel: CancellationToken,
}

impl FileHandle {
    pub fn new(info: FileInfo, bytes: bytes::Bytes) -> Self {
        Self { info, bytes, pos: 0, closed: false, cancel: CancellationToken::new() }
    }

    pub fn stat(&self) -> FileInfo {
        self.info.clone()
    }

    /// The current read/seek cursor, as a byte offset from the start.
    pub fn position(&self) -> u64 {
        self.pos as u64
    }

    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        if self.closed {
            return Err(Error::closed("file handle closed"));
        }
        let remaining = &self.bytes[self.pos..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.pos += n;
        Ok(n)
    }

    pub fn seek(&mut self, from: SeekFrom) -> Result<u64, Error> {
        if self.closed {
            return Err(Error::closed("file handle closed"));
        }
        let len = self.bytes.len() as i64;
        let new_pos = match from {
            SeekFrom::Start(p) => p as i64,
            SeekFrom::End(delta) => len + delta,
            SeekFrom::Current(delta) => self.pos as i64 + delta,
        };
        if new_pos < 0 {
            return Err(Error::invalid_item("seek before start of file"));
        }
        self.pos = (new_pos as usize).min(self.bytes.len());
        Ok(self.pos as u64)
    }

    pub fn close(&mut self) {
        self.closed = true;
        self.cancel.cancel();
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities { read: true, seek: true, streamdir: false, stat: true }
    }
}

enum DirSource {
    /// The engine root: always empty, per spec (no children via `Open`).
    Empty,
    /// A cached listing, already complete.
    Snapshot(VecDeque<DirEntry>),
    /// A live listing being generated, possibly tee'd into the directory
    /// cache by the producer task.
    Streaming {
        receiver: mpsc::Receiver<Result<DirEntry, Error>>,
        buffer: VecDeque<DirEntry>,
        exhausted: bool,
        sticky: Option<(Kind, String)>,
    },
}

/// An open directory: `Stat`, `StreamDir`, and blocking `ReadDir(n)`.
pub struct DirHandle {
    info: FileInfo,
    source: DirSource,
    closed: bool,
    cancel: CancellationToken,
}

impl DirHandle {
    pub fn root(info: FileInfo) -> Self {
        Self { info, source: DirSource::Empty, closed: false, cancel: CancellationToken::new() }
    }

    pub fn from_snapshot(info: FileInfo, entries: Vec<DirEntry>) -> Self {
        Self {
            info,
            source: DirSource::Snapshot(entries.into()),
            closed: false,
            cancel: CancellationToken::new(),
        }
    }

    pub fn from_stream(
        info: FileInfo,
        receiver: mpsc::Receiver<Result<DirEntry, Error>>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            info,
            source: DirSource::Streaming {
                receiver,
                buffer: VecDeque::new(),
                exhausted: false,
                sticky: None,
            },
            closed: false,
            cancel,
        }
    }

    pub fn stat(&self) -> FileInfo {
        self.info.clone()
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities { read: false, seek: false, streamdir: true, stat: true }
    }

    pub fn close(&mut self) {
        self.closed = true;
        self.cancel.cancel();
    }

    /// `n <= 0` drains everything remaining (EOF once empty); `n > 0`
    /// returns up to `n` entries, EOF exactly when nothing is left, and a
    /// sticky error on failure that is replayed on every later call.
    pub async fn read_dir(&mut self, n: i64) -> Result<Option<Vec<DirEntry>>, Error> {
        if self.closed {
            return Err(Error::closed("directory handle closed"));
        }
        match &mut self.source {
            DirSource::Empty => Ok(None),
            DirSource::Snapshot(buf) => {
                if buf.is_empty() {
                    return Ok(None);
                }
                let take = if n <= 0 { buf.len() } else { (n as usize).min(buf.len()) };
                Ok(Some(buf.drain(..take).collect()))
            }
            DirSource::Streaming { receiver, buffer, exhausted, sticky } => {
                if let Some((kind, message)) = sticky {
                    return Err(Error::new(*kind, message.clone()));
                }
                let want = if n <= 0 { usize::MAX } else { n as usize };
                while buffer.len() < want && !*exhausted {
                    match receiver.recv().await {
                        Some(Ok(entry)) => buffer.push_back(entry),
                        Some(Err(err)) => {
                            *sticky = Some((err.kind, err.to_string()));
                            return Err(err);
                        }
                        None => *exhausted = true,
                    }
                }
                if buffer.is_empty() {
                    return Ok(None);
                }
                let take = if n <= 0 { buffer.len() } else { want.min(buffer.len()) };
                Ok(Some(buffer.drain(..take).collect()))
            }
        }
    }

    /// Consumes the handle into a stream of entries, including a terminal
    /// error entry if the listing fails.
    pub fn stream_dir(self) -> impl Stream<Item = Result<DirEntry, Error>> {
        struct State {
            handle: DirHandle,
            done: bool,
        }
        stream::unfold(State { handle: self, done: false }, |mut st| async move {
            if st.done {
                return None;
            }
            match st.handle.read_dir(1).await {
                Ok(Some(mut entries)) => entries.pop().map(|e| (Ok(e), st)),
                Ok(None) => None,
                Err(e) => {
                    st.done = true;
                    Some((Err(e), st))
                }
            }
        })
    }
}

/// Either kind of open handle, as returned by the engine's `Open`.
///
/// `IpnsFile` is distinct from `File`: it wraps a `FileHandle` opened
/// under a mutable IPNS root, re-checking that root on every operation
/// (see `engine::ipns::IpnsFileHandle`). Plain `/ipfs/<cid>`-addressed
/// files never need this, since their CID can't change underneath them.
pub enum OpenHandle {
    File(FileHandle),
    IpnsFile(crate::engine::ipns::IpnsFileHandle),
    Directory(DirHandle),
}

impl OpenHandle {
    pub fn stat(&self) -> FileInfo {
        match self {
            OpenHandle::File(f) => f.stat(),
            OpenHandle::IpnsFile(f) => f.stat(),
            OpenHandle::Directory(d) => d.stat(),
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        match self {
            OpenHandle::File(f) => f.capabilities(),
            OpenHandle::IpnsFile(f) => f.capabilities(),
            OpenHandle::Directory(d) => d.capabilities(),
        }
    }

    pub fn close(&mut self) {
        match self {
            OpenHandle::File(f) => f.close(),
            OpenHandle::IpnsFile(f) => f.close(),
            OpenHandle::Directory(d) => d.close(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipfsd_core::{FileType, Mode};
    use std::time::SystemTime;

    fn info() -> FileInfo {
        FileInfo::new("f", 5, Mode::new(FileType::Regular, 0o644), SystemTime::now())
    }

    #[test]
    fn read_then_seek_then_read_again() {
        let mut f = FileHandle::new(info(), bytes::Bytes::from_static(b"hello"));
        let mut buf = [0u8; 3];
        assert_eq!(f.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf, b"hel");
        f.seek(SeekFrom::Start(0)).unwrap();
        let mut buf2 = [0u8; 5];
        assert_eq!(f.read(&mut buf2).unwrap(), 5);
        assert_eq!(&buf2, b"hello");
    }

    #[test]
    fn read_after_close_is_an_error() {
        let mut f = FileHandle::new(info(), bytes::Bytes::from_static(b"hello"));
        f.close();
        let mut buf = [0u8; 1];
        assert!(f.read(&mut buf).is_err());
    }

    #[tokio::test]
    async fn root_dir_is_always_empty() {
        let mut d = DirHandle::root(info());
        assert!(d.read_dir(-1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn snapshot_read_dir_respects_n() {
        let entries = vec![
            DirEntry { name: "a".into(), cid: sample_cid(), file_type: FileType::Regular, size: 0 },
            DirEntry { name: "b".into(), cid: sample_cid(), file_type: FileType::Regular, size: 0 },
        ];
        let mut d = DirHandle::from_snapshot(info(), entries);
        let first = d.read_dir(1).await.unwrap().unwrap();
        assert_eq!(first.len(), 1);
        let second = d.read_dir(-1).await.unwrap().unwrap();
        assert_eq!(second.len(), 1);
        assert!(d.read_dir(-1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn closed_directory_reports_closed_error() {
        let mut d = DirHandle::root(info());
        d.close();
        assert!(d.read_dir(-1).await.is_err());
    }

    fn sample_cid() -> ipfsd_core::Cid {
        ipfsd_core::cid::parse("bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi")
            .unwrap()
    }
}
