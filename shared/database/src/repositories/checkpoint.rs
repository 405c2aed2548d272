//! Checkpoint Repository
//!
//! Persists bulk-job cursors so an interrupted run resumes where it stopped.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;

use homebase_models::Checkpoint;

#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn load(&self, job: &str, collection: &str) -> Result<Option<Checkpoint>>;
    async fn save(&self, checkpoint: &Checkpoint) -> Result<()>;
    /// Removes every checkpoint of a job. Returns how many were removed.
    async fn clear(&self, job: &str) -> Result<u64>;
}

pub struct PgCheckpointRepository {
    pool: PgPool,
}

impl PgCheckpointRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CheckpointStore for PgCheckpointRepository {
    async fn load(&self, job: &str, collection: &str) -> Result<Option<Checkpoint>> {
        let checkpoint: Option<Checkpoint> = sqlx::query_as(
            r#"
            SELECT job, collection, cursor, processed, completed, updated_at
            FROM admin_checkpoints
            WHERE job = $1 AND collection = $2
            "#,
        )
        .bind(job)
        .bind(collection)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to load checkpoint")?;

        Ok(checkpoint)
    }

    async fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO admin_checkpoints (job, collection, cursor, processed, completed, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (job, collection) DO UPDATE SET
                cursor = EXCLUDED.cursor,
                processed = EXCLUDED.processed,
                completed = EXCLUDED.completed,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&checkpoint.job)
        .bind(&checkpoint.collection)
        .bind(&checkpoint.cursor)
        .bind(checkpoint.processed)
        .bind(checkpoint.completed)
        .bind(checkpoint.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to save checkpoint")?;

        Ok(())
    }

    async fn clear(&self, job: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM admin_checkpoints WHERE job = $1")
            .bind(job)
            .execute(&self.pool)
            .await
            .context("Failed to clear checkpoints")?;

        Ok(result.rows_affected())
    }
}
