// ABOUTME: Concurrent upload of a scanned build directory to an object store.
// ABOUTME: Bounded concurrency, fail-fast on the first transfer error, dry-run aware.

use chrono::{SecondsFormat, Utc};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::DeployConfig;

use super::descriptor::{FileDescriptor, RunSummary, UploadOutcome};
use super::error::{StoreError, SyncError};
use super::scan::scan;
use super::store::{ObjectStore, PutRequest};

/// Metadata key recording when an object was uploaded.
pub const UPLOADED_AT_METADATA: &str = "uploaded-at";

pub struct SyncPipeline<'a, S: ObjectStore + ?Sized> {
    store: &'a S,
    build_dir: PathBuf,
    concurrency: usize,
    dry_run: bool,
}

impl<'a, S: ObjectStore + ?Sized> SyncPipeline<'a, S> {
    pub fn new(config: &DeployConfig, store: &'a S) -> Self {
        Self::with_options(
            store,
            config.build_dir().to_path_buf(),
            config.upload_concurrency(),
            config.dry_run(),
        )
    }

    pub fn with_options(
        store: &'a S,
        build_dir: PathBuf,
        concurrency: usize,
        dry_run: bool,
    ) -> Self {
        Self {
            store,
            build_dir,
            concurrency: concurrency.max(1),
            dry_run,
        }
    }

    pub fn scan(&self) -> Result<Vec<FileDescriptor>, SyncError> {
        scan(&self.build_dir)
    }

    /// Upload one file. Never fails outright; failure is in the outcome.
    pub async fn upload(&self, descriptor: FileDescriptor) -> UploadOutcome {
        if self.dry_run {
            tracing::debug!(
                key = %descriptor.remote_key,
                content_type = %descriptor.content_type,
                "dry run, skipping upload"
            );
            return UploadOutcome::simulated(descriptor);
        }

        match self.put(&descriptor).await {
            Ok(()) => {
                tracing::debug!(key = %descriptor.remote_key, "uploaded");
                UploadOutcome::uploaded(descriptor)
            }
            Err(e) => UploadOutcome::failed(descriptor, e.to_string()),
        }
    }

    async fn put(&self, descriptor: &FileDescriptor) -> Result<(), StoreError> {
        let body = tokio::fs::read(&descriptor.local_path)
            .await
            .map_err(|source| StoreError::Read {
                path: descriptor.local_path.clone(),
                source,
            })?;

        let metadata = HashMap::from([(
            UPLOADED_AT_METADATA.to_string(),
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        )]);

        self.store
            .put(PutRequest {
                key: descriptor.remote_key.clone(),
                body: body.into(),
                content_type: descriptor.content_type.clone(),
                cache_control: descriptor.cache_policy.header().to_string(),
                metadata,
            })
            .await
    }

    /// Scan and upload everything, at most `concurrency` at a time.
    ///
    /// The first failed upload stops the run: no further uploads start and
    /// the error names the object. Uploads already in flight are dropped.
    /// Re-running after a failure is safe since every write is an overwrite.
    pub async fn sync_all(&self) -> Result<RunSummary, SyncError> {
        let started = Instant::now();
        let files = self.scan()?;
        let total = files.len();
        tracing::info!(total, dry_run = self.dry_run, "syncing build directory");

        let mut uploads = stream::iter(files)
            .map(|descriptor| self.upload(descriptor))
            .buffer_unordered(self.concurrency);

        let mut outcomes = Vec::with_capacity(total);
        while let Some(outcome) = uploads.next().await {
            if !outcome.success {
                return Err(SyncError::Transfer {
                    key: outcome.descriptor.remote_key,
                    message: outcome.error.unwrap_or_default(),
                });
            }
            outcomes.push(outcome);
        }

        outcomes.sort_by(|a, b| a.descriptor.remote_key.cmp(&b.descriptor.remote_key));

        Ok(RunSummary {
            outcomes,
            dry_run: self.dry_run,
            elapsed: started.elapsed(),
        })
    }
}
