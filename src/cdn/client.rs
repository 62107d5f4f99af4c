// ABOUTME: CDN client seam and its CloudFront implementation.
// ABOUTME: Creates one invalidation per call and returns the provider's identifier.

use async_trait::async_trait;
use aws_sdk_cloudfront::error::DisplayErrorContext;
use aws_sdk_cloudfront::types::{InvalidationBatch, Paths};
use nonempty::NonEmpty;

use crate::types::{DistributionId, InvalidationId};

use super::invalidation::CdnError;

#[async_trait]
pub trait CdnClient: Send + Sync {
    async fn create_invalidation(
        &self,
        distribution: &DistributionId,
        caller_reference: &str,
        paths: &NonEmpty<String>,
    ) -> Result<InvalidationId, CdnError>;
}

#[derive(Debug, Clone)]
pub struct CloudFrontCdn {
    client: aws_sdk_cloudfront::Client,
}

impl CloudFrontCdn {
    pub fn new(client: aws_sdk_cloudfront::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CdnClient for CloudFrontCdn {
    async fn create_invalidation(
        &self,
        distribution: &DistributionId,
        caller_reference: &str,
        paths: &NonEmpty<String>,
    ) -> Result<InvalidationId, CdnError> {
        let items: Vec<String> = paths.iter().cloned().collect();
        let quantity = i32::try_from(items.len())
            .map_err(|_| CdnError::Request("too many invalidation paths".into()))?;

        let paths = Paths::builder()
            .quantity(quantity)
            .set_items(Some(items))
            .build()
            .map_err(|e| CdnError::Request(e.to_string()))?;
        let batch = InvalidationBatch::builder()
            .paths(paths)
            .caller_reference(caller_reference)
            .build()
            .map_err(|e| CdnError::Request(e.to_string()))?;

        let response = self
            .client
            .create_invalidation()
            .distribution_id(distribution.as_str())
            .invalidation_batch(batch)
            .send()
            .await
            .map_err(|e| CdnError::Request(DisplayErrorContext(e).to_string()))?;

        response
            .invalidation()
            .map(|invalidation| InvalidationId::new(invalidation.id()))
            .ok_or(CdnError::MissingId)
    }
}
