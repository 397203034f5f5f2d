/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::error::TransferError;
use crate::MEBI_BYTE;

/// Policy for a [`TransferManager`](crate::TransferManager).
///
/// Immutable once built and shared read-only across every worker of a
/// transfer.
#[derive(Debug, Clone)]
pub struct TransferConfig {
    multipart_threshold: u64,
    part_size: u64,
    concurrency: usize,
    max_attempts: u32,
}

impl TransferConfig {
    /// Fluent builder for `TransferConfig`.
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Size at or above which a transfer switches to the multipart path.
    pub fn multipart_threshold(&self) -> u64 {
        self.multipart_threshold
    }

    /// Size of the parts/ranges a multipart transfer is split into.
    pub fn part_size(&self) -> u64 {
        self.part_size
    }

    /// Maximum number of parts/ranges in flight at once.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Attempts granted to each individual part or range.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Builder::new().build().expect("default configuration is valid")
    }
}

/// Builder for [`TransferConfig`].
#[derive(Debug, Clone)]
pub struct Builder {
    multipart_threshold: u64,
    part_size: u64,
    concurrency: usize,
    max_attempts: u32,
}

impl Builder {
    fn new() -> Self {
        Self {
            multipart_threshold: 8 * MEBI_BYTE,
            part_size: 8 * MEBI_BYTE,
            concurrency: 8,
            max_attempts: 3,
        }
    }

    /// Size threshold, in bytes, at or above which an object is transferred
    /// in multiple parts. Defaults to 8 MiB.
    pub fn multipart_threshold(mut self, size_bytes: u64) -> Self {
        self.multipart_threshold = size_bytes;
        self
    }

    /// Size of the parts the object will be transferred in, in bytes.
    /// Defaults to 8 MiB. Only the final part of a transfer may be smaller.
    pub fn part_size(mut self, size_bytes: u64) -> Self {
        self.part_size = size_bytes;
        self
    }

    /// Maximum number of parts/ranges transferred concurrently.
    /// Defaults to 8.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Attempts granted to each part or range of a multipart transfer before
    /// the whole transfer fails. Defaults to 3. Single-request transfers are
    /// not retried; transport retry there belongs to the store client.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Validate and build the config.
    pub fn build(self) -> Result<TransferConfig, TransferError> {
        if self.part_size == 0 {
            return Err(TransferError::InvalidConfig(
                "part_size must be greater than zero".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(TransferError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(TransferError::InvalidConfig(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(TransferConfig {
            multipart_threshold: self.multipart_threshold,
            part_size: self.part_size,
            concurrency: self.concurrency,
            max_attempts: self.max_attempts,
        })
    }
}
