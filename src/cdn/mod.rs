// ABOUTME: CDN cache invalidation after a sync.
// ABOUTME: The client seam plus the invalidate operation and its record types.

mod client;
mod invalidation;

pub use client::{CdnClient, CloudFrontCdn};
pub use invalidation::{
    CdnError, InvalidationRecord, InvalidationRequest, caller_reference, invalidate,
};
