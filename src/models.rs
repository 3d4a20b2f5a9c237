//! Request/response models for the gateway JSON contract
//!
//! Field names follow the frontend's camelCase wire contract, so everything
//! carries `rename_all`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Login request body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginRequest {
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

/// Successful login response. The secret key is deliberately never echoed
/// back.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub access_key: String,
}

/// One bucket in a listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketSummary {
    pub name: String,
    pub created: String,
    /// Hardcoded label; the gateway makes no policy decision of its own
    pub access: String,
}

impl BucketSummary {
    pub fn new(name: String, created: String) -> Self {
        Self {
            name,
            created,
            access: "Read/Write".to_string(),
        }
    }
}

/// One object key in a bucket listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSummary {
    pub name: String,
    pub size: u64,
    pub last_modified: String,
    pub etag: String,
}

/// Create-bucket request body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateBucketRequest {
    pub bucket_name: Option<String>,
}

/// Create-bucket success response
#[derive(Debug, Serialize)]
pub struct BucketCreatedResponse {
    pub message: String,
    pub bucket: BucketSummary,
}

/// Stat metadata for a single object
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    pub name: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

/// Metadata + tags response
#[derive(Debug, Serialize)]
pub struct MetadataResponse {
    pub metadata: ObjectMetadata,
    pub tags: BTreeMap<String, String>,
}

/// One caller-supplied tag pair inside the upload `tags` JSON array.
/// Both halves are optional at parse time; incomplete entries are dropped
/// during folding.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TagEntry {
    pub key: Option<String>,
    pub value: Option<String>,
}
