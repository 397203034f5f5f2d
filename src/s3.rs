/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart as SdkCompletedPart, ObjectCannedAcl};
use bytes::Bytes;

use crate::client::{BodyStream, ObjectClient, ObjectMetadata, UploadOptions};
use crate::error::ClientError;
use crate::types::{ByteRange, CompletedPart};

/// [`ObjectClient`] backed by an [`aws_sdk_s3::Client`].
///
/// This is a thin adapter: signing, transport, and transport-level retries
/// all stay inside the SDK. S3's own multipart constraints (5 MiB minimum
/// for all but the last part, at most 10,000 parts) are enforced by the
/// service, not here.
#[derive(Debug, Clone)]
pub struct S3Client {
    inner: aws_sdk_s3::Client,
}

impl S3Client {
    /// Wrap an existing SDK client.
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { inner: client }
    }
}

#[async_trait]
impl ObjectClient for S3Client {
    async fn create_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        options: &UploadOptions,
    ) -> Result<String, ClientError> {
        let resp = self
            .inner
            .create_multipart_upload()
            .bucket(bucket)
            .key(key)
            .set_acl(options.acl.as_deref().map(ObjectCannedAcl::from))
            .set_content_type(options.content_type.clone())
            .set_metadata(options.metadata.clone())
            .send()
            .await
            .map_err(ClientError::new)?;
        resp.upload_id()
            .map(ToString::to_string)
            .ok_or_else(|| ClientError::new("create_multipart_upload response missing upload id"))
    }

    async fn upload_part(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number: i32,
        body: Bytes,
    ) -> Result<String, ClientError> {
        let resp = self
            .inner
            .upload_part()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .part_number(part_number)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(ClientError::new)?;
        resp.e_tag()
            .map(ToString::to_string)
            .ok_or_else(|| ClientError::new("upload_part response missing etag"))
    }

    async fn complete_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> Result<(), ClientError> {
        let manifest = CompletedMultipartUpload::builder()
            .set_parts(Some(
                parts
                    .iter()
                    .map(|part| {
                        SdkCompletedPart::builder()
                            .part_number(part.part_number)
                            .e_tag(part.e_tag.clone())
                            .build()
                    })
                    .collect(),
            ))
            .build();
        self.inner
            .complete_multipart_upload()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .multipart_upload(manifest)
            .send()
            .await
            .map_err(ClientError::new)?;
        Ok(())
    }

    async fn abort_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
    ) -> Result<(), ClientError> {
        self.inner
            .abort_multipart_upload()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .send()
            .await
            .map_err(ClientError::new)?;
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        options: &UploadOptions,
    ) -> Result<(), ClientError> {
        self.inner
            .put_object()
            .bucket(bucket)
            .key(key)
            .set_acl(options.acl.as_deref().map(ObjectCannedAcl::from))
            .set_content_type(options.content_type.clone())
            .set_metadata(options.metadata.clone())
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(ClientError::new)?;
        Ok(())
    }

    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        range: Option<ByteRange>,
    ) -> Result<BodyStream, ClientError> {
        let mut request = self.inner.get_object().bucket(bucket).key(key);
        if let Some(range) = range {
            request = request.range(range.to_header_value());
        }
        let resp = request.send().await.map_err(ClientError::new)?;
        Ok(Box::new(resp.body.into_async_read()))
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata, ClientError> {
        let resp = self
            .inner
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(ClientError::new)?;
        let content_length = resp
            .content_length()
            .and_then(|len| u64::try_from(len).ok())
            .ok_or_else(|| ClientError::new("head_object response missing content length"))?;
        Ok(ObjectMetadata { content_length })
    }
}
