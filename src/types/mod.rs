// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Uses phantom types to prevent ID confusion at compile time.

mod bucket_name;
mod id;
mod remote_key;

pub use bucket_name::{BucketName, BucketNameError};
pub use id::{DistributionId, EmptyIdError, Id, IdKind, InvalidationId};
pub use remote_key::{RemoteKey, RemoteKeyError};
