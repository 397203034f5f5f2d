/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::cmp;
use std::io::{self, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::progress::ProgressListener;

/// Read-only window over a region of a local file.
///
/// Given a file shown below:
///
/// ```text
/// |____________________________________________|
/// 0        |               |            file size
///          |-----len-------|
///        start
/// ```
///
/// reads are clamped to the window: the reader never yields bytes past
/// `start + len` even when the underlying file is longer, and reading at the
/// end of the window returns zero bytes rather than blocking or failing.
/// Every successful non-empty read reports its size to the listener, which is
/// how upload progress is produced on both the multipart and direct paths.
pub struct FileChunkReader {
    file: File,
    start: u64,
    len: u64,
    pos: u64,
    listener: Option<Arc<dyn ProgressListener>>,
}

impl FileChunkReader {
    /// Open `path` and position a window of `len` bytes starting at `start`.
    /// The window is clamped to the end of the file.
    pub async fn open(
        path: &Path,
        start: u64,
        len: u64,
        listener: Option<Arc<dyn ProgressListener>>,
    ) -> io::Result<Self> {
        let mut file = File::open(path).await?;
        let file_size = file.metadata().await?.len();
        let len = cmp::min(len, file_size.saturating_sub(start));
        file.seek(SeekFrom::Start(start)).await?;
        Ok(Self {
            file,
            start,
            len,
            pos: 0,
            listener,
        })
    }

    /// Fixed size of the window. Transports that compute a content length
    /// must see the clamped size, not the size of the whole file.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the window is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read up to `buf.len()` bytes, never crossing the window boundary.
    /// Returns `Ok(0)` once the window is exhausted.
    pub async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = (self.len - self.pos) as usize;
        let max = cmp::min(remaining, buf.len());
        if max == 0 {
            return Ok(0);
        }
        let n = self.file.read(&mut buf[..max]).await?;
        self.pos += n as u64;
        if n > 0 {
            if let Some(listener) = &self.listener {
                listener.on_progress(n as u64);
            }
        }
        Ok(n)
    }

    /// Reposition within the window. Offsets past the window end clamp to
    /// the end.
    pub async fn seek(&mut self, offset: u64) -> io::Result<()> {
        let offset = cmp::min(offset, self.len);
        self.file.seek(SeekFrom::Start(self.start + offset)).await?;
        self.pos = offset;
        Ok(())
    }

    /// Drain the rest of the window into memory, reading `buf_size` bytes at
    /// a time so progress is reported as the data comes off disk.
    pub async fn read_to_bytes(&mut self, buf_size: usize) -> io::Result<Bytes> {
        let mut out = BytesMut::with_capacity((self.len - self.pos) as usize);
        let mut buf = vec![0u8; buf_size];
        loop {
            let n = self.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        Ok(out.freeze())
    }
}
