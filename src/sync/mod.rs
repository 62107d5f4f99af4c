// ABOUTME: Asset sync from the local build directory to the object store.
// ABOUTME: Scanning, per-file metadata, the store seam, and the upload pipeline.

mod descriptor;
mod error;
mod pipeline;
mod scan;
mod store;

pub use descriptor::{
    CachePolicy, DEFAULT_CONTENT_TYPE, FileDescriptor, RunSummary, UploadOutcome,
    content_type_for,
};
pub use error::{StoreError, SyncError};
pub use pipeline::{SyncPipeline, UPLOADED_AT_METADATA};
pub use scan::scan;
pub use store::{MULTIPART_THRESHOLD, ObjectStore, PutRequest, S3Store};
