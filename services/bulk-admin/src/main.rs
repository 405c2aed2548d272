use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use homebase_bulk_admin::{
    builtin_jobs, find_job, run_with_confirmation, JobRunner, Preconditions, RunSettings,
};
use homebase_database::{
    initialize_database, postgres_health_check, BlobDeleter, BlobStore, DatabaseConfig,
    PgCheckpointRepository, PgCollectionStore,
};
use homebase_utils::{init_logging, AppConfig};

/// Administrative bulk jobs for the Homebase marketplace.
#[derive(Parser, Debug)]
#[command(name = "homebase-admin", version, about = "Checkpointed bulk delete and reset jobs")]
struct Cli {
    /// Service-account credential file (defaults to admin.credentials_path).
    #[arg(long, env = "HOMEBASE_ADMIN_CREDENTIALS")]
    credentials: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the built-in jobs.
    List,
    /// Run a job after typing its confirmation phrase.
    Run {
        /// Job name, see `list`.
        job: String,
        /// Discard saved progress and start from the beginning.
        #[arg(long)]
        restart: bool,
        /// Confirmation phrase, skips the interactive prompt.
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Discard saved progress for a job without running it.
    Reset {
        /// Job name, see `list`.
        job: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_logging(&config.logging)?;

    match cli.command {
        Commands::List => {
            let mut out = io::stdout().lock();
            for job in builtin_jobs() {
                writeln!(out, "{:<22} {}", job.name, job.description)?;
                writeln!(out, "{:<22} collections: {}", "", job.collections.join(", "))?;
            }
        }
        Commands::Run {
            job,
            restart,
            confirm,
        } => {
            let job = find_job(&job).ok_or_else(|| anyhow!("Unknown job: {}", job))?;
            let preconditions = Preconditions::check(&config.admin, cli.credentials.as_deref())?;
            let key = preconditions.checkpoint_key(&job);
            info!(
                job = %job.name,
                project = %preconditions.account.project_id,
                "preconditions satisfied"
            );

            println!("{}", job.description);
            println!("Collections: {}", job.collections.join(", "));

            let stdin = io::stdin();
            let outcome = run_with_confirmation(
                &job,
                &key,
                restart,
                confirm.as_deref(),
                &mut stdin.lock(),
                &mut io::stdout(),
                || connect(&config, &preconditions),
            )
            .await?;

            if let Some(report) = outcome {
                println!("{}", serde_json::to_string_pretty(&report)?);
                if !report.errors.is_empty() {
                    warn!(errors = report.errors.len(), "job finished with errors");
                }
            }
        }
        Commands::Reset { job } => {
            let job = find_job(&job).ok_or_else(|| anyhow!("Unknown job: {}", job))?;
            let preconditions = Preconditions::check(&config.admin, cli.credentials.as_deref())?;
            let key = preconditions.checkpoint_key(&job);

            let runner = connect(&config, &preconditions).await?;
            let cleared = runner.reset(&key).await?;
            println!("Cleared {} checkpoint(s) for {}", cleared, key);
        }
    }

    Ok(())
}

async fn connect(config: &AppConfig, preconditions: &Preconditions) -> Result<JobRunner> {
    let pool = initialize_database(&DatabaseConfig {
        postgres_url: preconditions.database_url.clone(),
        max_connections: config.admin.max_connections,
    })
    .await?;
    postgres_health_check(&pool).await?;

    let blobs = BlobStore::new(
        config.upstream.storage_base_url.clone(),
        config.upstream.storage_token.clone(),
        Duration::from_secs(config.upstream.timeout_seconds),
    )?;
    let blobs: Option<Arc<dyn BlobDeleter>> = if blobs.is_configured() {
        Some(Arc::new(blobs))
    } else {
        warn!("object storage token not configured; stored files will be left in place");
        None
    };

    Ok(JobRunner::new(
        Arc::new(PgCollectionStore::new(pool.clone())),
        Arc::new(PgCheckpointRepository::new(pool)),
        blobs,
        RunSettings {
            page_size: config.admin.page_size,
            batch_size: config.admin.batch_size,
        },
    ))
}
