use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to open an identity-verification inquiry for a user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InquiryRequest {
    #[validate(length(min = 1, max = 128, message = "Invalid templateId"))]
    pub template_id: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Invalid referenceId"))]
    pub reference_id: Option<String>,
}

/// JSON:API envelope expected by the identity provider.
#[derive(Debug, Clone, Serialize)]
pub struct InquiryEnvelope {
    pub data: InquiryData,
}

#[derive(Debug, Clone, Serialize)]
pub struct InquiryData {
    pub attributes: InquiryAttributes,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct InquiryAttributes {
    pub inquiry_template_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
}

impl InquiryEnvelope {
    pub fn new(template_id: impl Into<String>, reference_id: Option<String>) -> Self {
        Self {
            data: InquiryData {
                attributes: InquiryAttributes {
                    inquiry_template_id: template_id.into(),
                    reference_id,
                },
            },
        }
    }
}
