//! Homebase Bulk Admin
//!
//! One-shot administrative jobs that wipe or reset marketplace data in
//! checkpointed batches. Nothing is written until the operator types the
//! job's confirmation phrase.

use anyhow::{bail, Result};
use std::future::Future;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use homebase_models::{BatchJob, RunReport};
use homebase_utils::{configured, AdminConfig};

pub mod confirm;
pub mod credentials;
pub mod jobs;
pub mod runner;

pub use confirm::confirm;
pub use credentials::ServiceAccount;
pub use jobs::{builtin_jobs, find_job};
pub use runner::{JobRunner, RunSettings};

/// Everything that must be in place before the operator is prompted.
#[derive(Debug, Clone)]
pub struct Preconditions {
    pub database_url: String,
    pub account: ServiceAccount,
}

impl Preconditions {
    pub fn check(config: &AdminConfig, credentials: Option<&Path>) -> Result<Self> {
        let Some(database_url) = configured(&config.database_url) else {
            bail!("DATABASE_URL is not set; add it to .env");
        };

        let path = credentials
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(&config.credentials_path));
        let account = ServiceAccount::load(&path)?;

        Ok(Self {
            database_url: database_url.to_string(),
            account,
        })
    }

    /// Checkpoint key for `job`, scoped to the credential's project.
    pub fn checkpoint_key(&self, job: &BatchJob) -> String {
        format!("{}/{}", self.account.project_id, job.name)
    }
}

/// Prompts for the job's phrase and runs it only on an exact match.
///
/// `connect` is not called when confirmation fails, so an aborted run never
/// touches the database. Returns `None` when aborted.
pub async fn run_with_confirmation<R, W, F, Fut>(
    job: &BatchJob,
    key: &str,
    restart: bool,
    provided: Option<&str>,
    input: &mut R,
    output: &mut W,
    connect: F,
) -> Result<Option<RunReport>>
where
    R: BufRead,
    W: Write,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<JobRunner>>,
{
    if !confirm(&job.confirmation_phrase, provided, input, output)? {
        writeln!(output, "Confirmation did not match; nothing was changed.")?;
        tracing::info!(job = %job.name, "run aborted at confirmation");
        return Ok(None);
    }

    let runner = connect().await?;
    let report = runner.run(job, key, restart).await?;
    Ok(Some(report))
}
