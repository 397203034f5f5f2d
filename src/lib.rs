/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/* Automatically managed default lints */
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
/* End of automatically managed default lints */

//! High level S3 transfer utilities.
//!
//! Transfers at or above a configurable size threshold are split into parts
//! (upload) or byte ranges (download) and executed concurrently across a
//! bounded pool of workers; smaller transfers go out as a single request.
//! Progress is reported per transfer through a caller supplied listener.
//!
//! # Examples
//!
//! ```no_run
//! # async fn example() -> Result<(), s3_transfer::TransferError> {
//! use std::sync::Arc;
//! use s3_transfer::{s3::S3Client, TransferConfig, TransferManager};
//!
//! let sdk = aws_sdk_s3::Client::from_conf(aws_sdk_s3::Config::builder().build());
//! let manager = TransferManager::new(
//!     Arc::new(S3Client::new(sdk)),
//!     TransferConfig::builder().build()?,
//! );
//!
//! manager
//!     .upload("/tmp/largefile", "my-bucket", "largefile", Default::default(), None)
//!     .await?;
//! manager
//!     .download("my-bucket", "largefile", "/tmp/downloaded", None)
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![warn(
    rustdoc::missing_crate_level_docs,
    unreachable_pub,
    rust_2018_idioms
)]

use std::time::Duration;

pub(crate) const MEBI_BYTE: u64 = 1024 * 1024;

/// Buffer size used when streaming bodies to and from disk.
pub(crate) const STREAM_BUFFER_SIZE: usize = 16 * 1024;

/// Base delay for per-part/per-range retries; doubles with each attempt.
pub(crate) const RETRY_BACKOFF_BASE: Duration = Duration::from_millis(100);

pub(crate) fn retry_backoff(attempt: u32) -> Duration {
    RETRY_BACKOFF_BASE * 2u32.saturating_pow(attempt.saturating_sub(1))
}

/// The remote store capability consumed by the transfer manager
pub mod client;

/// Transfer manager configuration
pub mod config;

/// Error types emitted by `s3-transfer`
pub mod error;

/// Types and helpers for I/O
pub mod io;

/// Progress reporting
pub mod progress;

/// `ObjectClient` implementation backed by the AWS SDK for S3
pub mod s3;

/// Common types used by `s3-transfer`
pub mod types;

mod download;
mod manager;
mod upload;

pub use self::client::ObjectClient;
pub use self::config::TransferConfig;
pub use self::error::TransferError;
pub use self::manager::TransferManager;
pub use self::progress::ProgressListener;
