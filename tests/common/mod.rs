/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

#![allow(dead_code)]

use std::cmp;
use std::collections::HashMap;
use std::io::{self, Cursor};
use std::pin::Pin;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncRead, ReadBuf};

use s3_transfer::client::{BodyStream, ObjectClient, ObjectMetadata, UploadOptions};
use s3_transfer::error::ClientError;
use s3_transfer::types::{ByteRange, CompletedPart};

pub const UPLOAD_ID: &str = "test-upload-id";

/// In-memory store client that records every call and supports failure
/// injection.
#[derive(Default)]
pub struct MockClient {
    object: Option<Bytes>,
    stagger: bool,
    fail_create: bool,
    fail_part: Mutex<Option<(i32, u32)>>,
    fail_gets: AtomicU32,
    truncate_first_get: Mutex<Option<usize>>,

    pub created_sessions: AtomicU32,
    pub create_options: Mutex<Option<UploadOptions>>,
    pub part_calls: Mutex<Vec<i32>>,
    pub part_completions: Mutex<Vec<i32>>,
    pub part_bodies: Mutex<HashMap<i32, Bytes>>,
    pub complete_calls: AtomicU32,
    pub completed_parts: Mutex<Option<Vec<CompletedPart>>>,
    pub aborts: AtomicU32,
    pub put_calls: AtomicU32,
    pub put_body: Mutex<Option<Bytes>>,
    pub put_options: Mutex<Option<UploadOptions>>,
    pub head_calls: AtomicU32,
    pub get_ranges: Mutex<Vec<Option<ByteRange>>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the object returned by `head_object`/`get_object`.
    pub fn with_object(mut self, data: impl Into<Bytes>) -> Self {
        self.object = Some(data.into());
        self
    }

    /// Delay early part numbers so completion order is scrambled.
    pub fn stagger_parts(mut self) -> Self {
        self.stagger = true;
        self
    }

    /// Fail every `create_multipart_upload` call.
    pub fn fail_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    /// Fail the next `times` uploads of `part_number`.
    pub fn fail_part(self, part_number: i32, times: u32) -> Self {
        *self.fail_part.lock().unwrap() = Some((part_number, times));
        self
    }

    /// Fail the next `times` `get_object` calls outright.
    pub fn fail_gets(self, times: u32) -> Self {
        self.fail_gets.store(times, Ordering::SeqCst);
        self
    }

    /// Make the first `get_object` body yield `len` bytes and then fail
    /// mid-stream.
    pub fn truncate_first_get(self, len: usize) -> Self {
        *self.truncate_first_get.lock().unwrap() = Some(len);
        self
    }

    fn slice_range(&self, range: &Option<ByteRange>) -> Bytes {
        let data = self.object.clone().expect("mock object not seeded");
        match range {
            None => data,
            Some(ByteRange::Inclusive(start, end)) => {
                let end = cmp::min(*end as usize + 1, data.len());
                data.slice(*start as usize..end)
            }
            Some(ByteRange::AllFrom(start)) => data.slice(*start as usize..),
        }
    }
}

fn take_failure(counter: &AtomicU32) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

#[async_trait]
impl ObjectClient for MockClient {
    async fn create_multipart_upload(
        &self,
        _bucket: &str,
        _key: &str,
        options: &UploadOptions,
    ) -> Result<String, ClientError> {
        if self.fail_create {
            return Err(ClientError::new("injected create failure"));
        }
        self.created_sessions.fetch_add(1, Ordering::SeqCst);
        *self.create_options.lock().unwrap() = Some(options.clone());
        Ok(UPLOAD_ID.to_string())
    }

    async fn upload_part(
        &self,
        _bucket: &str,
        _key: &str,
        upload_id: &str,
        part_number: i32,
        body: Bytes,
    ) -> Result<String, ClientError> {
        assert_eq!(upload_id, UPLOAD_ID);
        self.part_calls.lock().unwrap().push(part_number);

        if self.stagger {
            let delay = 25 * (4 - part_number).max(1) as u64;
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        {
            let mut fail = self.fail_part.lock().unwrap();
            if let Some((failing, remaining)) = fail.as_mut() {
                if *failing == part_number && *remaining > 0 {
                    *remaining -= 1;
                    return Err(ClientError::new("injected part failure"));
                }
            }
        }

        self.part_bodies.lock().unwrap().insert(part_number, body);
        self.part_completions.lock().unwrap().push(part_number);
        Ok(format!("etag-{part_number}"))
    }

    async fn complete_multipart_upload(
        &self,
        _bucket: &str,
        _key: &str,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> Result<(), ClientError> {
        assert_eq!(upload_id, UPLOAD_ID);
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        *self.completed_parts.lock().unwrap() = Some(parts.to_vec());
        Ok(())
    }

    async fn abort_multipart_upload(
        &self,
        _bucket: &str,
        _key: &str,
        upload_id: &str,
    ) -> Result<(), ClientError> {
        assert_eq!(upload_id, UPLOAD_ID);
        self.aborts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn put_object(
        &self,
        _bucket: &str,
        _key: &str,
        body: Bytes,
        options: &UploadOptions,
    ) -> Result<(), ClientError> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        *self.put_body.lock().unwrap() = Some(body);
        *self.put_options.lock().unwrap() = Some(options.clone());
        Ok(())
    }

    async fn get_object(
        &self,
        _bucket: &str,
        _key: &str,
        range: Option<ByteRange>,
    ) -> Result<BodyStream, ClientError> {
        self.get_ranges.lock().unwrap().push(range);
        if take_failure(&self.fail_gets) {
            return Err(ClientError::new("injected get failure"));
        }

        let data = self.slice_range(&range);
        if let Some(len) = self.truncate_first_get.lock().unwrap().take() {
            let truncated = data.slice(..cmp::min(len, data.len()));
            return Ok(Box::new(BrokenBody::new(truncated)));
        }
        Ok(Box::new(Cursor::new(data.to_vec())))
    }

    async fn head_object(&self, _bucket: &str, _key: &str) -> Result<ObjectMetadata, ClientError> {
        self.head_calls.fetch_add(1, Ordering::SeqCst);
        match &self.object {
            Some(data) => Ok(ObjectMetadata {
                content_length: data.len() as u64,
            }),
            None => Err(ClientError::new("no such key")),
        }
    }
}

/// Body that yields its data and then fails instead of reporting end of
/// stream, simulating a connection dropped mid-range.
pub struct BrokenBody {
    data: Bytes,
    pos: usize,
}

impl BrokenBody {
    pub fn new(data: Bytes) -> Self {
        Self { data, pos: 0 }
    }
}

impl AsyncRead for BrokenBody {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.pos < this.data.len() {
            let n = cmp::min(buf.remaining(), this.data.len() - this.pos);
            buf.put_slice(&this.data[this.pos..this.pos + n]);
            this.pos += n;
            Poll::Ready(Ok(()))
        } else {
            Poll::Ready(Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "injected mid stream failure",
            )))
        }
    }
}

/// Deterministic non-repeating test payload.
pub fn pattern_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
