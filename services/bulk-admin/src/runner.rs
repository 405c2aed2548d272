//! Checkpointed batch execution.
//!
//! Each collection is read in keyset order one page at a time and written in
//! fixed-size batches. A checkpoint is stored after every batch so an
//! interrupted run resumes after the last committed id.

use anyhow::{Context, Result};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

use homebase_database::{BlobDeleter, CheckpointStore, CollectionStore};
use homebase_models::{BatchJob, Checkpoint, DocumentRef, JobAction, RunReport};

#[derive(Debug, Clone, Copy)]
pub struct RunSettings {
    pub page_size: i64,
    pub batch_size: usize,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            page_size: 500,
            batch_size: 400,
        }
    }
}

pub struct JobRunner {
    collections: Arc<dyn CollectionStore>,
    checkpoints: Arc<dyn CheckpointStore>,
    blobs: Option<Arc<dyn BlobDeleter>>,
    settings: RunSettings,
}

impl JobRunner {
    pub fn new(
        collections: Arc<dyn CollectionStore>,
        checkpoints: Arc<dyn CheckpointStore>,
        blobs: Option<Arc<dyn BlobDeleter>>,
        settings: RunSettings,
    ) -> Self {
        Self {
            collections,
            checkpoints,
            blobs,
            settings: RunSettings {
                page_size: settings.page_size.max(1),
                batch_size: settings.batch_size.max(1),
            },
        }
    }

    /// Forget all progress recorded under `key`.
    pub async fn reset(&self, key: &str) -> Result<u64> {
        self.checkpoints.clear(key).await
    }

    /// Run `job`, checkpointing under `key`. With `restart` any saved
    /// progress is discarded first.
    pub async fn run(&self, job: &BatchJob, key: &str, restart: bool) -> Result<RunReport> {
        if restart {
            let cleared = self.reset(key).await?;
            info!(job = %job.name, cleared, "discarded saved progress");
        }

        let mut report = RunReport {
            job: job.name.clone(),
            ..RunReport::default()
        };

        for collection in &job.collections {
            let mut checkpoint = self
                .checkpoints
                .load(key, collection)
                .await?
                .unwrap_or_else(|| Checkpoint::start(key, collection.as_str()));

            if checkpoint.completed {
                info!(job = %job.name, collection = %collection, "already completed, skipping");
                report.collections_skipped.push(collection.clone());
                continue;
            }
            if checkpoint.cursor.is_some() {
                info!(
                    job = %job.name,
                    collection = %collection,
                    processed = checkpoint.processed,
                    "resuming from checkpoint"
                );
            }

            self.run_collection(job, collection, &mut checkpoint, &mut report)
                .await
                .with_context(|| format!("Job {} failed on {}", job.name, collection))?;

            checkpoint.complete();
            self.checkpoints.save(&checkpoint).await?;
            info!(
                job = %job.name,
                collection = %collection,
                processed = checkpoint.processed,
                "collection finished"
            );
        }

        Ok(report)
    }

    async fn run_collection(
        &self,
        job: &BatchJob,
        collection: &str,
        checkpoint: &mut Checkpoint,
        report: &mut RunReport,
    ) -> Result<()> {
        let storage_field = job.storage_field.as_deref();

        loop {
            let page = self
                .collections
                .list_page(
                    collection,
                    checkpoint.cursor.as_deref(),
                    self.settings.page_size,
                    storage_field,
                )
                .await?;
            if page.is_empty() {
                return Ok(());
            }

            for batch in page.chunks(self.settings.batch_size) {
                self.process_batch(job, collection, batch, report).await?;

                if let Some(last) = batch.last() {
                    checkpoint.advance(last.id.clone(), batch.len());
                    self.checkpoints.save(checkpoint).await?;
                }
                report.batches_committed += 1;
                info!(
                    job = %job.name,
                    collection,
                    batch = batch.len(),
                    processed = checkpoint.processed,
                    "batch committed"
                );
            }

            if (page.len() as i64) < self.settings.page_size {
                return Ok(());
            }
        }
    }

    async fn process_batch(
        &self,
        job: &BatchJob,
        collection: &str,
        batch: &[DocumentRef],
        report: &mut RunReport,
    ) -> Result<()> {
        let ids: Vec<String> = batch.iter().map(|d| d.id.clone()).collect();
        let mut files: Vec<String> = batch.iter().flat_map(|d| d.file_urls.clone()).collect();

        match &job.action {
            JobAction::Delete => {
                if let Some(subcollection) = job.subcollection.as_deref() {
                    for parent in &ids {
                        let child_files = self
                            .delete_children(subcollection, parent, job.storage_field.as_deref(), report)
                            .await?;
                        files.extend(child_files);
                    }
                }

                self.delete_files(&files, report).await;
                self.collections.delete_batch(collection, &ids).await?;
            }
            JobAction::Update { patch } => {
                self.collections.update_batch(collection, &ids, patch).await?;
            }
        }

        report.documents_processed += ids.len() as u64;
        Ok(())
    }

    /// Deletes every child of `parent` page by page. Returns the storage
    /// URLs the children referenced.
    async fn delete_children(
        &self,
        subcollection: &str,
        parent: &str,
        storage_field: Option<&str>,
        report: &mut RunReport,
    ) -> Result<Vec<String>> {
        let mut files = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let page = self
                .collections
                .list_children(
                    subcollection,
                    parent,
                    after.as_deref(),
                    self.settings.page_size,
                    storage_field,
                )
                .await?;
            let Some(last) = page.last() else {
                break;
            };
            after = Some(last.id.clone());

            for chunk in page.chunks(self.settings.batch_size) {
                let ids: Vec<String> = chunk.iter().map(|d| d.id.clone()).collect();
                let deleted = self.collections.delete_batch(subcollection, &ids).await?;
                report.children_deleted += deleted;
                files.extend(chunk.iter().flat_map(|d| d.file_urls.clone()));
            }

            if (page.len() as i64) < self.settings.page_size {
                break;
            }
        }

        Ok(files)
    }

    /// Deletes stored files concurrently. Failures are recorded, not raised.
    async fn delete_files(&self, urls: &[String], report: &mut RunReport) {
        if urls.is_empty() {
            return;
        }
        let Some(blobs) = self.blobs.as_ref() else {
            warn!(count = urls.len(), "object storage not configured, leaving files in place");
            report
                .errors
                .extend(urls.iter().map(|u| format!("{}: storage not configured", u)));
            return;
        };

        let results = join_all(urls.iter().map(|url| async move { (url, blobs.delete(url).await) })).await;

        for (url, result) in results {
            match result {
                Ok(()) => report.files_deleted += 1,
                Err(e) => {
                    warn!(url = %url, error = %e, "file delete failed");
                    report.errors.push(format!("{}: {:#}", url, e));
                }
            }
        }
    }
}
