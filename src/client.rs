/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncRead;

use crate::error::ClientError;
use crate::types::{ByteRange, CompletedPart};

/// Streaming body of a `get_object` response.
pub type BodyStream = Box<dyn AsyncRead + Send + Unpin>;

/// The subset of object metadata the transfer manager needs.
#[derive(Debug, Clone)]
pub struct ObjectMetadata {
    /// Total size of the object in bytes.
    pub content_length: u64,
}

/// Optional parameters forwarded untouched to the store on upload.
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Canned ACL to apply to the object.
    pub acl: Option<String>,

    /// MIME type of the object body.
    pub content_type: Option<String>,

    /// User-defined object metadata.
    pub metadata: Option<HashMap<String, String>>,
}

/// The remote store capability the transfer manager drives.
///
/// Implementations own the wire protocol, authentication, and transport
/// level retries; the transfer manager only sequences these calls and never
/// inspects what travels over them.
#[async_trait]
pub trait ObjectClient: Send + Sync {
    /// Open a multipart upload session, returning its upload id.
    async fn create_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        options: &UploadOptions,
    ) -> Result<String, ClientError>;

    /// Upload one part of an open session, returning the ETag the store
    /// assigned to it.
    async fn upload_part(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number: i32,
        body: Bytes,
    ) -> Result<String, ClientError>;

    /// Finalize a session. `parts` must be sorted ascending by part number;
    /// the store rejects manifests that are not strictly increasing.
    async fn complete_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> Result<(), ClientError>;

    /// Abandon a session, freeing the server side storage held by any parts
    /// uploaded so far.
    async fn abort_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
    ) -> Result<(), ClientError>;

    /// Upload an entire object in a single request.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        options: &UploadOptions,
    ) -> Result<(), ClientError>;

    /// Fetch object bytes, optionally constrained to a byte range.
    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        range: Option<ByteRange>,
    ) -> Result<BodyStream, ClientError>;

    /// Fetch object metadata without the body.
    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata, ClientError>;
}
