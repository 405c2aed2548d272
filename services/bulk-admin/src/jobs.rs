//! Built-in job catalog.

use serde_json::json;

use homebase_models::{BatchJob, JobAction};

pub fn builtin_jobs() -> Vec<BatchJob> {
    vec![
        BatchJob {
            name: "reset-marketplace".to_string(),
            description: "Delete all listings, offers, showings and disclosures along with their stored files"
                .to_string(),
            collections: ["listings", "offers", "showings", "disclosures"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            action: JobAction::Delete,
            subcollection: None,
            storage_field: Some("files".to_string()),
            confirmation_phrase: "RESET MARKETPLACE".to_string(),
        },
        BatchJob {
            name: "purge-conversations".to_string(),
            description: "Delete all conversations and their messages".to_string(),
            collections: vec!["conversations".to_string()],
            action: JobAction::Delete,
            subcollection: Some("messages".to_string()),
            storage_field: Some("attachments".to_string()),
            confirmation_phrase: "PURGE CONVERSATIONS".to_string(),
        },
        BatchJob {
            name: "reset-verification".to_string(),
            description: "Clear identity-verification state on every user".to_string(),
            collections: vec!["users".to_string()],
            action: JobAction::Update {
                patch: json!({
                    "verificationStatus": null,
                    "verificationInquiryId": null,
                    "verifiedName": null,
                    "verifiedAt": null,
                }),
            },
            subcollection: None,
            storage_field: None,
            confirmation_phrase: "RESET VERIFICATION".to_string(),
        },
    ]
}

pub fn find_job(name: &str) -> Option<BatchJob> {
    builtin_jobs().into_iter().find(|job| job.name == name)
}
