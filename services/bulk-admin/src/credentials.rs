//! Service-account credential file.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

/// The fields of a service-account key the admin tool relies on. The project
/// id scopes checkpoint keys so two environments never share progress.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccount {
    pub project_id: String,
    pub client_email: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
}

impl ServiceAccount {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read credential file {}", path.display()))?;
        let account: ServiceAccount = serde_json::from_str(&raw)
            .with_context(|| format!("Credential file {} is not valid JSON", path.display()))?;

        if account.project_id.trim().is_empty() {
            bail!("Credential file {} has no project_id", path.display());
        }
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_service_account() {
        let file = write(
            r#"{"type":"service_account","project_id":"homebase-prod","client_email":"admin@homebase-prod.iam"}"#,
        );
        let account = ServiceAccount::load(file.path()).unwrap();
        assert_eq!(account.project_id, "homebase-prod");
        assert_eq!(account.client_email, "admin@homebase-prod.iam");
    }

    #[test]
    fn test_missing_or_invalid_file_is_error() {
        assert!(ServiceAccount::load(Path::new("/nonexistent/service-account.json")).is_err());

        let file = write("not json");
        assert!(ServiceAccount::load(file.path()).is_err());

        let file = write(r#"{"project_id":" ","client_email":"a@b"}"#);
        assert!(ServiceAccount::load(file.path()).is_err());
    }
}
