use anyhow::Result;
use sqlx::PgPool;

pub async fn run_postgres_migrations(pool: &PgPool) -> Result<()> {
    tracing::info!("Running PostgreSQL migrations");

    // Resume points for administrative bulk jobs
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS admin_checkpoints (
            job VARCHAR NOT NULL,
            collection VARCHAR NOT NULL,
            cursor TEXT,
            processed BIGINT NOT NULL DEFAULT 0,
            completed BOOLEAN NOT NULL DEFAULT FALSE,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (job, collection)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_admin_checkpoints_job ON admin_checkpoints(job)")
        .execute(pool)
        .await?;

    tracing::info!("PostgreSQL migrations completed");
    Ok(())
}
