/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::io;

/// Failure surfaced by the remote store client.
///
/// The transfer manager treats the store as an opaque collaborator; whatever
/// error the backend produced is carried here unmodified.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ClientError(Box<dyn std::error::Error + Send + Sync>);

impl ClientError {
    /// Wrap a backend error.
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(source.into())
    }
}

/// Error type emitted by transfer operations.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// The configured policy is unusable (e.g. a zero part size).
    #[error("invalid transfer configuration: {0}")]
    InvalidConfig(String),

    /// The request cannot be partitioned into work (e.g. a zero byte
    /// multipart transfer). Rejected before any network call.
    #[error("invalid transfer request: {0}")]
    InvalidRequest(String),

    /// Upload failed.
    #[error("upload failed")]
    UploadFailed(#[from] UploadError),

    /// Download failed.
    #[error("download failed")]
    DownloadFailed(#[from] DownloadError),
}

/// Failures specific to the upload paths.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The store rejected the request to open a multipart session.
    #[error("failed to create multipart upload")]
    CreateSessionFailed(#[source] ClientError),

    /// A single part exhausted its attempts. The session is aborted before
    /// this error surfaces.
    #[error("upload of part {part_number} failed")]
    PartFailed {
        /// Part number of the failed part.
        part_number: i32,
        /// Store error from the final attempt.
        #[source]
        source: ClientError,
    },

    /// The completion call for an otherwise successful session failed.
    #[error("failed to complete multipart upload")]
    CompleteFailed(#[source] ClientError),

    /// The single-request upload path failed.
    #[error("put object failed")]
    PutObjectFailed(#[source] ClientError),

    /// Local filesystem failure, surfaced immediately and never retried.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Failures specific to the download paths.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The object size could not be discovered.
    #[error("failed to discover object size")]
    DiscoverFailed(#[source] ClientError),

    /// A ranged get exhausted its attempts.
    #[error("download of chunk {seq} failed")]
    ChunkFailed {
        /// Zero-based index of the failed range.
        seq: u64,
        /// Store error from the final attempt.
        #[source]
        source: ClientError,
    },

    /// The single-request download path failed.
    #[error("get object failed")]
    GetObjectFailed(#[source] ClientError),

    /// Local filesystem failure, surfaced immediately and never retried.
    #[error(transparent)]
    Io(#[from] io::Error),
}
