/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::io;
use std::path::Path;
use std::sync::Arc;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::client::{ObjectClient, UploadOptions};
use crate::config::TransferConfig;
use crate::error::{ClientError, DownloadError, TransferError, UploadError};
use crate::io::{FileChunkReader, ProgressStream};
use crate::progress::{ProgressAggregator, ProgressListener};
use crate::{download, upload, STREAM_BUFFER_SIZE};

/// High level transfer facade.
///
/// `upload` and `download` inspect the transfer size and route to either a
/// single request or the concurrent multipart path, per the configured
/// [`TransferConfig`]. The manager is cheap to clone and can run many
/// transfers over its lifetime; all transfer state is local to each call.
#[derive(Clone)]
pub struct TransferManager {
    client: Arc<dyn ObjectClient>,
    config: TransferConfig,
}

impl TransferManager {
    /// Create a manager from a store client and a transfer policy.
    pub fn new(client: Arc<dyn ObjectClient>, config: TransferConfig) -> Self {
        Self { client, config }
    }

    /// Upload a local file to `bucket`/`key`.
    ///
    /// Files at or above the configured multipart threshold are uploaded as
    /// a multipart session with concurrent part uploads; smaller files go
    /// out as a single `put_object`. `options` are forwarded to the store
    /// untouched. The listener, if any, receives byte deltas that sum to the
    /// file size exactly once, possibly from several workers at a time.
    pub async fn upload(
        &self,
        path: impl AsRef<Path>,
        bucket: &str,
        key: &str,
        options: UploadOptions,
        listener: Option<Arc<dyn ProgressListener>>,
    ) -> Result<(), TransferError> {
        let path = path.as_ref();
        let file_size = tokio::fs::metadata(path)
            .await
            .map_err(UploadError::Io)?
            .len();
        let progress = Arc::new(ProgressAggregator::new(listener));

        if file_size >= self.config.multipart_threshold() {
            upload::upload_multipart(
                self.client.clone(),
                &self.config,
                path,
                bucket,
                key,
                &options,
                file_size,
                progress.clone(),
            )
            .await?;
        } else {
            self.put_object(path, bucket, key, &options, file_size, &progress)
                .await?;
        }

        tracing::debug!(
            bucket,
            key,
            bytes = progress.bytes_transferred(),
            "upload complete"
        );
        Ok(())
    }

    /// Download `bucket`/`key` to a local file.
    ///
    /// The object size is discovered with a metadata request first; objects
    /// at or above the multipart threshold are fetched as concurrent byte
    /// ranges written directly at their offsets, smaller objects with a
    /// single streamed `get_object`. A failed download removes the partially
    /// written local file (best effort) before the error is returned.
    pub async fn download(
        &self,
        bucket: &str,
        key: &str,
        path: impl AsRef<Path>,
        listener: Option<Arc<dyn ProgressListener>>,
    ) -> Result<(), TransferError> {
        let path = path.as_ref();
        let progress = Arc::new(ProgressAggregator::new(listener));

        let meta = self
            .client
            .head_object(bucket, key)
            .await
            .map_err(DownloadError::DiscoverFailed)
            .map_err(TransferError::from)?;

        let result = if meta.content_length >= self.config.multipart_threshold() {
            download::download_multipart(
                self.client.clone(),
                &self.config,
                bucket,
                key,
                path,
                meta.content_length,
                progress.clone(),
            )
            .await
        } else {
            self.get_object(bucket, key, path, &progress)
                .await
                .map_err(TransferError::from)
        };

        if let Err(err) = result {
            remove_partial(path).await;
            return Err(err);
        }

        tracing::debug!(
            bucket,
            key,
            bytes = progress.bytes_transferred(),
            "download complete"
        );
        Ok(())
    }

    // Direct upload path. The body is read through a chunk view covering the
    // whole file so progress reporting is uniform across both paths.
    async fn put_object(
        &self,
        path: &Path,
        bucket: &str,
        key: &str,
        options: &UploadOptions,
        file_size: u64,
        progress: &Arc<ProgressAggregator>,
    ) -> Result<(), UploadError> {
        let mut chunk =
            FileChunkReader::open(path, 0, file_size, Some(progress.clone())).await?;
        let body = chunk.read_to_bytes(STREAM_BUFFER_SIZE).await?;
        self.client
            .put_object(bucket, key, body, options)
            .await
            .map_err(UploadError::PutObjectFailed)
    }

    // Direct download path: stream the response body to disk in fixed size
    // buffers rather than holding the whole object in memory.
    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        progress: &Arc<ProgressAggregator>,
    ) -> Result<(), DownloadError> {
        let body = self
            .client
            .get_object(bucket, key, None)
            .await
            .map_err(DownloadError::GetObjectFailed)?;
        let mut stream = ProgressStream::new(body, Some(progress.clone()));

        let mut file = File::create(path).await?;
        let mut buf = vec![0u8; STREAM_BUFFER_SIZE];
        loop {
            let n = stream
                .read(&mut buf)
                .await
                .map_err(|err| DownloadError::GetObjectFailed(ClientError::new(err)))?;
            if n == 0 {
                break;
            }
            file.write_all(&buf[..n]).await?;
        }
        file.flush().await?;
        Ok(())
    }
}

// A failed download must not leave a partial artifact behind. Cleanup is
// best effort and never masks the transfer error.
async fn remove_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "removed partial download"),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to remove partial download")
        }
    }
}
