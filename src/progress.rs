/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Receives byte-count deltas as a transfer makes progress.
///
/// Workers invoke the listener concurrently, so implementations must be
/// internally thread safe. The deltas reported over one successful transfer
/// sum to the total object size exactly once.
///
/// Implemented for plain closures:
///
/// ```
/// use std::sync::Arc;
/// use s3_transfer::ProgressListener;
///
/// let listener: Arc<dyn ProgressListener> =
///     Arc::new(|bytes: u64| println!("transferred {bytes} more bytes"));
/// listener.on_progress(512);
/// ```
pub trait ProgressListener: Send + Sync {
    /// Called with the number of bytes transferred since the last call.
    fn on_progress(&self, bytes: u64);
}

impl<F> ProgressListener for F
where
    F: Fn(u64) + Send + Sync,
{
    fn on_progress(&self, bytes: u64) {
        (self)(bytes)
    }
}

// Aggregates progress across the workers of a single transfer: a running
// total plus fan-in to the caller's listener. Owned by the facade, shared by
// reference with every worker.
pub(crate) struct ProgressAggregator {
    transferred: AtomicU64,
    listener: Option<Arc<dyn ProgressListener>>,
}

impl ProgressAggregator {
    pub(crate) fn new(listener: Option<Arc<dyn ProgressListener>>) -> Self {
        Self {
            transferred: AtomicU64::new(0),
            listener,
        }
    }

    pub(crate) fn record(&self, bytes: u64) {
        if bytes == 0 {
            return;
        }
        self.transferred.fetch_add(bytes, Ordering::Relaxed);
        if let Some(listener) = &self.listener {
            listener.on_progress(bytes);
        }
    }

    pub(crate) fn bytes_transferred(&self) -> u64 {
        self.transferred.load(Ordering::Relaxed)
    }
}

impl ProgressListener for ProgressAggregator {
    fn on_progress(&self, bytes: u64) {
        self.record(bytes);
    }
}
