/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};

use crate::progress::ProgressListener;

/// Read-only wrapper over a byte stream that reports the size of every
/// successful read to a progress listener before handing the bytes on.
/// A zero-length read signals end of stream and is not reported.
pub struct ProgressStream<R> {
    inner: R,
    listener: Option<Arc<dyn ProgressListener>>,
}

impl<R> ProgressStream<R> {
    /// Wrap `inner`, reporting each read to `listener`.
    pub fn new(inner: R, listener: Option<Arc<dyn ProgressListener>>) -> Self {
        Self { inner, listener }
    }
}

impl<R> AsyncRead for ProgressStream<R>
where
    R: AsyncRead + Unpin,
{
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        match Pin::new(&mut this.inner).poll_read(cx, buf) {
            Poll::Ready(Ok(())) => {
                let n = buf.filled().len() - before;
                if n > 0 {
                    if let Some(listener) = &this.listener {
                        listener.on_progress(n as u64);
                    }
                }
                Poll::Ready(Ok(()))
            }
            other => other,
        }
    }
}
