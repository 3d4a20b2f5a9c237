//! Bucket routes: list buckets, list objects, create bucket

use axum::{
    extract::{Path, State},
    Json,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use bucket_bridge::config::GatewayConfig;
use bucket_bridge::error::ApiError;
use bucket_bridge::models::{
    BucketCreatedResponse, BucketSummary, CreateBucketRequest, ObjectSummary,
};
use bucket_bridge::storage::StorageClient;

use crate::auth::StorageCredentials;

static BUCKET_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9-]+$").unwrap());

fn client_for(
    config: &GatewayConfig,
    creds: &StorageCredentials,
) -> Result<StorageClient, ApiError> {
    StorageClient::new(&config.storage, &creds.access_key, &creds.secret_key)
        .map_err(|e| ApiError::backend("Failed to initialize storage client", e))
}

/// GET /buckets - list all buckets visible to the caller's credentials
pub async fn list_buckets(
    State(config): State<Arc<GatewayConfig>>,
    creds: StorageCredentials,
) -> Result<Json<Vec<BucketSummary>>, ApiError> {
    let client = client_for(&config, &creds)?;
    let buckets = client
        .list_buckets()
        .await
        .map_err(|e| ApiError::backend("Error fetching buckets", e))?;

    tracing::debug!("listed {} buckets", buckets.len());
    Ok(Json(buckets))
}

/// GET /buckets/:bucket/files - recursive object listing from the root
/// prefix; no pagination is exposed
pub async fn list_objects(
    State(config): State<Arc<GatewayConfig>>,
    Path(bucket): Path<String>,
    creds: StorageCredentials,
) -> Result<Json<Vec<ObjectSummary>>, ApiError> {
    let client = client_for(&config, &creds)?;
    let objects = client.list_objects(&bucket).await.map_err(|e| {
        ApiError::backend(format!("Error fetching files from bucket: {}", bucket), e)
    })?;

    tracing::debug!("listed {} objects in bucket {}", objects.len(), bucket);
    Ok(Json(objects))
}

/// POST /buckets/create - create a bucket after validating the name
pub async fn create_bucket(
    State(config): State<Arc<GatewayConfig>>,
    creds: StorageCredentials,
    Json(req): Json<CreateBucketRequest>,
) -> Result<Json<BucketCreatedResponse>, ApiError> {
    let name = req
        .bucket_name
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();

    validate_bucket_name(name)?;

    let client = client_for(&config, &creds)?;
    client
        .create_bucket(name)
        .await
        .map_err(|e| ApiError::backend("Error creating bucket", e))?;

    tracing::info!("created bucket {}", name);

    // The create call returns no timestamp; echo the gateway's clock.
    Ok(Json(BucketCreatedResponse {
        message: "Bucket created successfully".to_string(),
        bucket: BucketSummary::new(name.to_string(), chrono::Utc::now().to_rfc3339()),
    }))
}

fn validate_bucket_name(name: &str) -> Result<(), ApiError> {
    if name.is_empty() {
        return Err(ApiError::validation("Bucket name is required"));
    }
    if !BUCKET_NAME_RE.is_match(name) {
        return Err(ApiError::validation(
            "Bucket name must be lowercase and contain only letters, numbers, and dashes",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lowercase_names_pass() {
        assert!(validate_bucket_name("my-bucket-01").is_ok());
        assert!(validate_bucket_name("a").is_ok());
        assert!(validate_bucket_name("0-9").is_ok());
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(validate_bucket_name("").is_err());
    }

    #[test]
    fn uppercase_and_punctuation_are_rejected() {
        for name in ["MyBucket", "my_bucket", "my.bucket", "bucket!", "bü", "my bucket"] {
            assert!(
                validate_bucket_name(name).is_err(),
                "{:?} should be rejected",
                name
            );
        }
    }
}
