/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;

use crate::client::ObjectClient;
use crate::config::TransferConfig;
use crate::error::{ClientError, DownloadError, TransferError};
use crate::io::{PositionedWriter, ProgressStream};
use crate::progress::ProgressAggregator;
use crate::types::{partition_ranges, ByteRange, RangeDescriptor};
use crate::{retry_backoff, STREAM_BUFFER_SIZE};

// Shared state for the workers of one ranged download.
struct DownloadContext {
    client: Arc<dyn ObjectClient>,
    bucket: String,
    key: String,
    writer: Arc<PositionedWriter>,
    max_attempts: u32,
    progress: Arc<ProgressAggregator>,
}

pub(crate) async fn download_multipart(
    client: Arc<dyn ObjectClient>,
    config: &TransferConfig,
    bucket: &str,
    key: &str,
    path: &Path,
    object_size: u64,
    progress: Arc<ProgressAggregator>,
) -> Result<(), TransferError> {
    let ranges = partition_ranges(object_size, config.part_size());
    if ranges.is_empty() {
        return Err(TransferError::InvalidRequest(
            "cannot range download a zero byte object".to_string(),
        ));
    }
    let num_ranges = ranges.len();
    tracing::debug!(num_ranges, object_size, "ranged download started");

    let writer = Arc::new(
        PositionedWriter::create(path)
            .await
            .map_err(DownloadError::Io)?,
    );
    let ctx = Arc::new(DownloadContext {
        client,
        bucket: bucket.to_string(),
        key: key.to_string(),
        writer: writer.clone(),
        max_attempts: config.max_attempts(),
        progress,
    });

    let (work_tx, work_rx) = async_channel::bounded(config.concurrency());
    let (comp_tx, mut comp_rx) = mpsc::channel(config.concurrency());
    let cancel = Arc::new(AtomicBool::new(false));

    tokio::spawn(distribute_ranges(ranges, work_tx, cancel.clone()));

    for _ in 0..config.concurrency() {
        let worker = range_downloader(
            ctx.clone(),
            work_rx.clone(),
            comp_tx.clone(),
            cancel.clone(),
        );
        tokio::spawn(worker);
    }
    drop(comp_tx);

    // blocks until every range finished or the first one failed; no
    // reassembly step is needed because each worker writes at its own
    // absolute offset and the ranges never overlap
    collect_ranges(num_ranges, &mut comp_rx, &work_rx, &cancel).await?;
    writer.flush().await.map_err(DownloadError::Io)?;
    Ok(())
}

async fn distribute_ranges(
    ranges: Vec<RangeDescriptor>,
    tx: async_channel::Sender<RangeDescriptor>,
    cancel: Arc<AtomicBool>,
) {
    for range in ranges {
        if cancel.load(Ordering::SeqCst) {
            break;
        }
        tracing::trace!(seq = range.seq, start = range.start, "distributing range");
        if tx.send(range).await.is_err() {
            break;
        }
    }
    tx.close();
}

// Worker function that fetches ranges off the `work` channel and sends the
// byte count of each back on the `completed` channel.
async fn range_downloader(
    ctx: Arc<DownloadContext>,
    work: async_channel::Receiver<RangeDescriptor>,
    completed: mpsc::Sender<Result<u64, DownloadError>>,
    cancel: Arc<AtomicBool>,
) {
    while let Ok(range) = work.recv().await {
        if cancel.load(Ordering::SeqCst) {
            break;
        }
        let seq = range.seq;
        let result = download_range(&ctx, range).await;
        if completed.send(result).await.is_err() {
            tracing::debug!(seq, "completion channel closed, worker exiting");
            return;
        }
        tracing::trace!(seq, "worker completed range");
    }
}

async fn download_range(ctx: &DownloadContext, range: RangeDescriptor) -> Result<u64, DownloadError> {
    let mut offset = range.start;
    let mut attempt = 1;
    loop {
        match fetch_range(ctx, &range, &mut offset).await {
            Ok(()) => return Ok(offset - range.start),
            Err(DownloadError::ChunkFailed { seq, source }) if attempt < ctx.max_attempts => {
                tracing::debug!(seq, attempt, error = %source, "retrying ranged get");
                tokio::time::sleep(retry_backoff(attempt)).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

// Issue the ranged get from the current offset and stream it into the shared
// writer. `offset` tracks what reached disk, so a retry resumes where the
// failed attempt stopped instead of re-fetching (and re-counting) bytes that
// were already written.
async fn fetch_range(
    ctx: &DownloadContext,
    range: &RangeDescriptor,
    offset: &mut u64,
) -> Result<(), DownloadError> {
    let remaining = match range.end {
        Some(end) => ByteRange::Inclusive(*offset, end),
        None => ByteRange::AllFrom(*offset),
    };
    let body = ctx
        .client
        .get_object(&ctx.bucket, &ctx.key, Some(remaining))
        .await
        .map_err(|source| DownloadError::ChunkFailed {
            seq: range.seq,
            source,
        })?;

    let mut stream = ProgressStream::new(body, Some(ctx.progress.clone()));
    let mut buf = vec![0u8; STREAM_BUFFER_SIZE];
    loop {
        // stream errors are transport failures and retryable; write errors
        // are local I/O and fatal
        let n = stream
            .read(&mut buf)
            .await
            .map_err(|err| DownloadError::ChunkFailed {
                seq: range.seq,
                source: ClientError::new(err),
            })?;
        if n == 0 {
            return Ok(());
        }
        ctx.writer.write_at(&buf[..n], *offset).await?;
        *offset += n as u64;
    }
}

// Drain the completion channel until every range reported or one failed. On
// failure the work queue is closed and the cancellation flag raised so
// in-flight workers unwind instead of fetching the remaining ranges.
async fn collect_ranges(
    num_ranges: usize,
    completions: &mut mpsc::Receiver<Result<u64, DownloadError>>,
    work: &async_channel::Receiver<RangeDescriptor>,
    cancel: &AtomicBool,
) -> Result<(), DownloadError> {
    let mut finished = 0usize;
    while let Some(result) = completions.recv().await {
        match result {
            Ok(bytes) => {
                finished += 1;
                tracing::trace!(bytes, finished, "range finished");
            }
            Err(err) => {
                cancel.store(true, Ordering::SeqCst);
                work.close();
                return Err(err);
            }
        }
    }
    debug_assert_eq!(finished, num_ranges, "workers exited without reporting every range");
    Ok(())
}
