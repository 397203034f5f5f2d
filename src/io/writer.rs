/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::io::{self, SeekFrom};
use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

/// Serializes positioned writes to a single output file shared by the
/// workers of one download.
///
/// The file handle has a single cursor, so seek-then-write must be atomic
/// with respect to the other workers; without the lock a seek from one
/// worker followed by a write from another would land bytes at the wrong
/// offset. Each transfer owns exactly one writer; nothing is serialized
/// across files.
pub struct PositionedWriter {
    file: Mutex<File>,
}

impl PositionedWriter {
    /// Create (or truncate) the output file at `path`.
    pub async fn create(path: &Path) -> io::Result<Self> {
        Ok(Self {
            file: Mutex::new(File::create(path).await?),
        })
    }

    /// Write all of `data` at the absolute byte `offset`.
    pub async fn write_at(&self, data: &[u8], offset: u64) -> io::Result<()> {
        let mut file = self.file.lock().await;
        file.seek(SeekFrom::Start(offset)).await?;
        file.write_all(data).await?;
        Ok(())
    }

    /// Flush buffered writes to the file.
    pub async fn flush(&self) -> io::Result<()> {
        let mut file = self.file.lock().await;
        file.flush().await
    }
}
