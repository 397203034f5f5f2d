/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::client::{ObjectClient, UploadOptions};
use crate::config::TransferConfig;
use crate::error::{TransferError, UploadError};
use crate::io::FileChunkReader;
use crate::progress::ProgressAggregator;
use crate::types::{partition_parts, CompletedPart, PartDescriptor};
use crate::{retry_backoff, STREAM_BUFFER_SIZE};

// Shared state for the workers of one multipart upload.
struct UploadContext {
    client: Arc<dyn ObjectClient>,
    bucket: String,
    key: String,
    upload_id: String,
    path: PathBuf,
    max_attempts: u32,
    progress: Arc<ProgressAggregator>,
}

pub(crate) async fn upload_multipart(
    client: Arc<dyn ObjectClient>,
    config: &TransferConfig,
    path: &Path,
    bucket: &str,
    key: &str,
    options: &UploadOptions,
    file_size: u64,
    progress: Arc<ProgressAggregator>,
) -> Result<(), TransferError> {
    let parts = partition_parts(file_size, config.part_size());
    if parts.is_empty() {
        return Err(TransferError::InvalidRequest(
            "cannot multipart upload a zero byte file".to_string(),
        ));
    }
    let num_parts = parts.len();

    let upload_id = client
        .create_multipart_upload(bucket, key, options)
        .await
        .map_err(UploadError::CreateSessionFailed)?;
    tracing::debug!(upload_id = %upload_id, num_parts, "multipart upload started");

    let ctx = Arc::new(UploadContext {
        client: client.clone(),
        bucket: bucket.to_string(),
        key: key.to_string(),
        upload_id: upload_id.clone(),
        path: path.to_path_buf(),
        max_attempts: config.max_attempts(),
        progress,
    });

    let (work_tx, work_rx) = async_channel::bounded(config.concurrency());
    let (comp_tx, mut comp_rx) = mpsc::channel(config.concurrency());
    let cancel = Arc::new(AtomicBool::new(false));

    tokio::spawn(distribute_parts(parts, work_tx, cancel.clone()));

    for _ in 0..config.concurrency() {
        let worker = part_uploader(
            ctx.clone(),
            work_rx.clone(),
            comp_tx.clone(),
            cancel.clone(),
        );
        tokio::spawn(worker);
    }
    drop(comp_tx);

    // blocks until every part finished or the first one failed
    match collect_parts(num_parts, &mut comp_rx, &work_rx, &cancel).await {
        Ok(mut completed) => {
            // the completion manifest requires strictly increasing part
            // numbers regardless of the order acknowledgements arrived in
            completed.sort_by_key(|part| part.part_number);
            match client
                .complete_multipart_upload(bucket, key, &upload_id, &completed)
                .await
            {
                Ok(()) => {
                    tracing::debug!(upload_id = %upload_id, "multipart upload completed");
                    Ok(())
                }
                Err(source) => {
                    abort_upload(client.as_ref(), bucket, key, &upload_id).await;
                    Err(UploadError::CompleteFailed(source).into())
                }
            }
        }
        Err(err) => {
            abort_upload(client.as_ref(), bucket, key, &upload_id).await;
            Err(err.into())
        }
    }
}

// Best effort: an abandoned session holds server side storage for the parts
// uploaded so far, but an abort failure must not mask the transfer error.
async fn abort_upload(client: &dyn ObjectClient, bucket: &str, key: &str, upload_id: &str) {
    match client.abort_multipart_upload(bucket, key, upload_id).await {
        Ok(()) => tracing::debug!(upload_id = %upload_id, "multipart upload aborted"),
        Err(err) => {
            tracing::warn!(upload_id = %upload_id, error = %err, "failed to abort multipart upload")
        }
    }
}

async fn distribute_parts(
    parts: Vec<PartDescriptor>,
    tx: async_channel::Sender<PartDescriptor>,
    cancel: Arc<AtomicBool>,
) {
    for part in parts {
        if cancel.load(Ordering::SeqCst) {
            break;
        }
        tracing::trace!(part_number = part.part_number, "distributing part");
        if tx.send(part).await.is_err() {
            break;
        }
    }
    tx.close();
}

// Worker function that uploads parts off the `work` channel and sends each
// result back on the `completed` channel.
async fn part_uploader(
    ctx: Arc<UploadContext>,
    work: async_channel::Receiver<PartDescriptor>,
    completed: mpsc::Sender<Result<CompletedPart, UploadError>>,
    cancel: Arc<AtomicBool>,
) {
    while let Ok(part) = work.recv().await {
        if cancel.load(Ordering::SeqCst) {
            break;
        }
        let part_number = part.part_number;
        let result = upload_part(&ctx, part).await;
        if completed.send(result).await.is_err() {
            tracing::debug!(part_number, "completion channel closed, worker exiting");
            return;
        }
        tracing::trace!(part_number, "worker completed part");
    }
}

async fn upload_part(
    ctx: &UploadContext,
    part: PartDescriptor,
) -> Result<CompletedPart, UploadError> {
    // The body is read once; retries resend the same bytes, so every byte is
    // reported to the progress listener exactly once.
    let mut chunk = FileChunkReader::open(
        &ctx.path,
        part.offset,
        part.len,
        Some(ctx.progress.clone()),
    )
    .await?;
    let body = chunk.read_to_bytes(STREAM_BUFFER_SIZE).await?;

    let mut attempt = 1;
    loop {
        match ctx
            .client
            .upload_part(
                &ctx.bucket,
                &ctx.key,
                &ctx.upload_id,
                part.part_number,
                body.clone(),
            )
            .await
        {
            Ok(e_tag) => {
                return Ok(CompletedPart {
                    part_number: part.part_number,
                    e_tag,
                })
            }
            Err(source) if attempt < ctx.max_attempts => {
                tracing::debug!(
                    part_number = part.part_number,
                    attempt,
                    error = %source,
                    "retrying part upload"
                );
                tokio::time::sleep(retry_backoff(attempt)).await;
                attempt += 1;
            }
            Err(source) => {
                return Err(UploadError::PartFailed {
                    part_number: part.part_number,
                    source,
                })
            }
        }
    }
}

// Drain the completion channel until every part reported or one failed. On
// failure the work queue is closed and the cancellation flag raised so
// in-flight workers unwind instead of running the remaining parts.
async fn collect_parts(
    num_parts: usize,
    completions: &mut mpsc::Receiver<Result<CompletedPart, UploadError>>,
    work: &async_channel::Receiver<PartDescriptor>,
    cancel: &AtomicBool,
) -> Result<Vec<CompletedPart>, UploadError> {
    let mut parts = Vec::with_capacity(num_parts);
    while let Some(result) = completions.recv().await {
        match result {
            Ok(part) => parts.push(part),
            Err(err) => {
                cancel.store(true, Ordering::SeqCst);
                work.close();
                return Err(err);
            }
        }
    }
    debug_assert_eq!(parts.len(), num_parts, "workers exited without reporting every part");
    Ok(parts)
}
