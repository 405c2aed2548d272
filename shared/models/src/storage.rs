use serde::{Deserialize, Serialize};

/// Query string of the upload proxy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadQuery {
    pub filename: Option<String>,
}

/// Object-storage blob descriptor as returned by the storage API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobObject {
    pub url: String,
    pub pathname: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlobListing {
    #[serde(default)]
    pub blobs: Vec<BlobObject>,
}

/// Query string of the property-data proxy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyQuery {
    pub address: Option<String>,
}
