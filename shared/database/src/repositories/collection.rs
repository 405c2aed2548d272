//! Collection Repository
//!
//! Keyset-paginated access to document collections for bulk jobs. Every
//! collection is a table with `id TEXT PRIMARY KEY` and `data JSONB`; child
//! collections also carry `parent_id`.
//! Uses runtime SQL queries (unchecked) since table names come from job definitions.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use homebase_models::DocumentRef;
use homebase_utils::validate_identifier;

#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Up to `limit` documents with id greater than `after`, in id order.
    async fn list_page(
        &self,
        collection: &str,
        after: Option<&str>,
        limit: i64,
        storage_field: Option<&str>,
    ) -> Result<Vec<DocumentRef>>;

    /// Same as `list_page`, restricted to children of `parent_id`.
    async fn list_children(
        &self,
        subcollection: &str,
        parent_id: &str,
        after: Option<&str>,
        limit: i64,
        storage_field: Option<&str>,
    ) -> Result<Vec<DocumentRef>>;

    /// Deletes the given ids in one transaction. Returns rows affected.
    async fn delete_batch(&self, collection: &str, ids: &[String]) -> Result<u64>;

    /// Merges `patch` into the data of the given ids in one transaction.
    async fn update_batch(
        &self,
        collection: &str,
        ids: &[String],
        patch: &serde_json::Value,
    ) -> Result<u64>;
}

pub struct PgCollectionStore {
    pool: PgPool,
}

impl PgCollectionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CollectionStore for PgCollectionStore {
    async fn list_page(
        &self,
        collection: &str,
        after: Option<&str>,
        limit: i64,
        storage_field: Option<&str>,
    ) -> Result<Vec<DocumentRef>> {
        validate_identifier(collection)?;

        let rows: Vec<DocumentRow> = sqlx::query_as(&format!(
            r#"
            SELECT id, data -> $1 AS files
            FROM "{}"
            WHERE ($2::text IS NULL OR id > $2)
            ORDER BY id
            LIMIT $3
            "#,
            collection
        ))
        .bind(storage_field)
        .bind(after)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to list documents in {}", collection))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_children(
        &self,
        subcollection: &str,
        parent_id: &str,
        after: Option<&str>,
        limit: i64,
        storage_field: Option<&str>,
    ) -> Result<Vec<DocumentRef>> {
        validate_identifier(subcollection)?;

        let rows: Vec<DocumentRow> = sqlx::query_as(&format!(
            r#"
            SELECT id, data -> $1 AS files
            FROM "{}"
            WHERE parent_id = $2 AND ($3::text IS NULL OR id > $3)
            ORDER BY id
            LIMIT $4
            "#,
            subcollection
        ))
        .bind(storage_field)
        .bind(parent_id)
        .bind(after)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to list {} of {}", subcollection, parent_id))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete_batch(&self, collection: &str, ids: &[String]) -> Result<u64> {
        validate_identifier(collection)?;

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(&format!(r#"DELETE FROM "{}" WHERE id = ANY($1)"#, collection))
            .bind(ids)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to delete batch from {}", collection))?;
        tx.commit().await.context("Failed to commit delete batch")?;

        Ok(result.rows_affected())
    }

    async fn update_batch(
        &self,
        collection: &str,
        ids: &[String],
        patch: &serde_json::Value,
    ) -> Result<u64> {
        validate_identifier(collection)?;

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(&format!(
            r#"UPDATE "{}" SET data = data || $1::jsonb WHERE id = ANY($2)"#,
            collection
        ))
        .bind(patch)
        .bind(ids)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to update batch in {}", collection))?;
        tx.commit().await.context("Failed to commit update batch")?;

        Ok(result.rows_affected())
    }
}

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: String,
    files: Option<serde_json::Value>,
}

impl From<DocumentRow> for DocumentRef {
    fn from(row: DocumentRow) -> Self {
        DocumentRef {
            id: row.id,
            file_urls: file_urls(row.files.as_ref()),
        }
    }
}

/// Storage URLs held by a document field: a single string or an array of strings.
pub fn file_urls(value: Option<&serde_json::Value>) -> Vec<String> {
    match value {
        Some(serde_json::Value::String(url)) if !url.is_empty() => vec![url.clone()],
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_file_urls_from_string_and_array() {
        assert_eq!(file_urls(Some(&json!("https://s/a.jpg"))), vec!["https://s/a.jpg"]);
        assert_eq!(
            file_urls(Some(&json!(["https://s/a.jpg", 3, "", "https://s/b.jpg"]))),
            vec!["https://s/a.jpg", "https://s/b.jpg"]
        );
        assert!(file_urls(Some(&json!(null))).is_empty());
        assert!(file_urls(None).is_empty());
    }
}
