//! Administrative bulk job models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// What a bulk job does to each document it visits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobAction {
    Delete,
    /// Shallow JSON merge of `patch` into each document's data.
    Update { patch: serde_json::Value },
}

/// A named, one-shot administrative job over a fixed list of collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchJob {
    pub name: String,
    pub description: String,
    pub collections: Vec<String>,
    pub action: JobAction,
    /// Child collection deleted for each parent document before the parent.
    pub subcollection: Option<String>,
    /// Document field holding object-storage URLs (string or array).
    pub storage_field: Option<String>,
    pub confirmation_phrase: String,
}

/// A document reference read from a collection page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    pub id: String,
    pub file_urls: Vec<String>,
}

/// Persisted resume point for one collection of one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Checkpoint {
    pub job: String,
    pub collection: String,
    pub cursor: Option<String>,
    pub processed: i64,
    pub completed: bool,
    pub updated_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn start(job: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            job: job.into(),
            collection: collection.into(),
            cursor: None,
            processed: 0,
            completed: false,
            updated_at: Utc::now(),
        }
    }

    pub fn advance(&mut self, cursor: impl Into<String>, count: usize) {
        self.cursor = Some(cursor.into());
        self.processed += count as i64;
        self.updated_at = Utc::now();
    }

    pub fn complete(&mut self) {
        self.completed = true;
        self.updated_at = Utc::now();
    }
}

/// Summary printed at the end of a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub job: String,
    pub documents_processed: u64,
    pub children_deleted: u64,
    pub files_deleted: u64,
    pub batches_committed: u64,
    pub collections_skipped: Vec<String>,
    pub errors: Vec<String>,
}
