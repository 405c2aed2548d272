//! Document extraction request and result models.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Kind of document being scanned. Only government identification triggers
/// name and date-of-birth extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    #[serde(alias = "id", alias = "governmentId", alias = "gov_id")]
    GovernmentId,
    #[serde(alias = "driversLicense")]
    DriversLicense,
    Passport,
    #[serde(alias = "preApproval", alias = "pre_approval_letter")]
    PreApproval,
    #[serde(alias = "proofOfFunds")]
    ProofOfFunds,
    #[serde(other)]
    Other,
}

impl DocType {
    pub fn is_government_id(&self) -> bool {
        matches!(self, Self::GovernmentId | Self::DriversLicense | Self::Passport)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRequest {
    #[validate(length(min = 1, max = 2048, message = "Invalid url"))]
    pub url: Option<String>,
    #[validate(length(min = 1, max = 1024, message = "Invalid path"))]
    pub path: Option<String>,
    pub doc_type: Option<DocType>,
}

impl ExtractionRequest {
    pub fn wants_identity_fields(&self) -> bool {
        self.doc_type.map(|d| d.is_government_id()).unwrap_or(false)
    }
}

/// Fields pulled out of a document. Each one is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub amount: Option<u64>,
    pub extracted_name: Option<String>,
    pub extracted_dob: Option<String>,
}
