// ABOUTME: Object store seam and its S3 implementation.
// ABOUTME: Large bodies go through multipart upload; small ones use a single put.

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use bytes::Bytes;
use std::collections::HashMap;

use crate::types::{BucketName, RemoteKey};

use super::error::StoreError;

/// Bodies at or above this size are uploaded in parts.
pub const MULTIPART_THRESHOLD: usize = 8 * 1024 * 1024;

/// One object write.
#[derive(Debug, Clone)]
pub struct PutRequest {
    pub key: RemoteKey,
    pub body: Bytes,
    pub content_type: String,
    pub cache_control: String,
    pub metadata: HashMap<String, String>,
}

/// Writes objects. Writing an existing key overwrites it.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, request: PutRequest) -> Result<(), StoreError>;
}

fn request_error<E: std::error::Error>(err: E) -> StoreError {
    StoreError::Request(DisplayErrorContext(err).to_string())
}

/// S3 bucket addressed with ambient AWS credentials.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: BucketName,
    part_size: usize,
}

impl S3Store {
    pub fn new(client: aws_sdk_s3::Client, bucket: BucketName) -> Self {
        Self {
            client,
            bucket,
            part_size: MULTIPART_THRESHOLD,
        }
    }

    pub fn bucket(&self) -> &BucketName {
        &self.bucket
    }

    async fn put_single(&self, request: PutRequest) -> Result<(), StoreError> {
        self.client
            .put_object()
            .bucket(self.bucket.as_str())
            .key(request.key.as_str())
            .body(ByteStream::from(request.body))
            .content_type(request.content_type)
            .cache_control(request.cache_control)
            .set_metadata(Some(request.metadata))
            .send()
            .await
            .map_err(request_error)?;
        Ok(())
    }

    async fn put_multipart(&self, request: PutRequest) -> Result<(), StoreError> {
        let created = self
            .client
            .create_multipart_upload()
            .bucket(self.bucket.as_str())
            .key(request.key.as_str())
            .content_type(request.content_type.as_str())
            .cache_control(request.cache_control.as_str())
            .set_metadata(Some(request.metadata.clone()))
            .send()
            .await
            .map_err(request_error)?;

        let upload_id = created
            .upload_id()
            .ok_or_else(|| StoreError::Request("multipart upload returned no upload id".into()))?
            .to_string();

        let result = self.upload_parts(&request, &upload_id).await;

        if result.is_err() {
            tracing::debug!(key = %request.key, "aborting multipart upload");
            if let Err(e) = self
                .client
                .abort_multipart_upload()
                .bucket(self.bucket.as_str())
                .key(request.key.as_str())
                .upload_id(&upload_id)
                .send()
                .await
            {
                tracing::warn!(
                    key = %request.key,
                    "failed to abort multipart upload: {}",
                    DisplayErrorContext(e)
                );
            }
        }

        result
    }

    async fn upload_parts(&self, request: &PutRequest, upload_id: &str) -> Result<(), StoreError> {
        let mut parts = Vec::new();

        for (index, chunk) in chunks(&request.body, self.part_size).into_iter().enumerate() {
            let part_number = i32::try_from(index + 1)
                .map_err(|_| StoreError::Request("too many upload parts".into()))?;
            let uploaded = self
                .client
                .upload_part()
                .bucket(self.bucket.as_str())
                .key(request.key.as_str())
                .upload_id(upload_id)
                .part_number(part_number)
                .body(ByteStream::from(chunk))
                .send()
                .await
                .map_err(request_error)?;

            parts.push(
                CompletedPart::builder()
                    .set_e_tag(uploaded.e_tag().map(str::to_string))
                    .part_number(part_number)
                    .build(),
            );
        }

        self.client
            .complete_multipart_upload()
            .bucket(self.bucket.as_str())
            .key(request.key.as_str())
            .upload_id(upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(parts))
                    .build(),
            )
            .send()
            .await
            .map_err(request_error)?;
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(&self, request: PutRequest) -> Result<(), StoreError> {
        if request.body.len() >= MULTIPART_THRESHOLD {
            self.put_multipart(request).await
        } else {
            self.put_single(request).await
        }
    }
}

/// Split a body into parts of at most `size` bytes without copying.
fn chunks(body: &Bytes, size: usize) -> Vec<Bytes> {
    let size = size.max(1);
    (0..body.len())
        .step_by(size)
        .map(|start| body.slice(start..(start + size).min(body.len())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_cover_the_body_in_order() {
        let body = Bytes::from(vec![7u8; 25]);
        let parts = chunks(&body, 10);
        let sizes: Vec<usize> = parts.iter().map(Bytes::len).collect();
        assert_eq!(sizes, vec![10, 10, 5]);
    }

    #[test]
    fn exact_multiple_has_no_empty_tail() {
        let body = Bytes::from(vec![0u8; 20]);
        assert_eq!(chunks(&body, 10).len(), 2);
    }
}
