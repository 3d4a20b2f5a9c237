//! API error types and storage-error classification
//!
//! Two kinds of failure exist: the caller sent something malformed
//! (`Validation`, always 400) or the storage service refused/failed
//! (`Backend`). Backend failures are classified against the small set of
//! storage error codes the gateway recognizes; everything else becomes a 500
//! carrying the raw storage message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use s3::error::S3Error;
use serde_json::json;
use thiserror::Error;

/// Gateway API error
#[derive(Debug, Error)]
pub enum ApiError {
    /// Caller input malformed; no storage call was attempted
    #[error("{0}")]
    Validation(String),

    /// The storage service returned an error
    #[error("{context}: {source}")]
    Backend {
        context: String,
        #[source]
        source: S3Error,
    },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn backend(context: impl Into<String>, source: S3Error) -> Self {
        Self::Backend {
            context: context.into(),
            source,
        }
    }
}

/// Recognized storage failure categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageFailure {
    /// Credentials rejected by the storage service
    AccessDenied,
    /// Bucket already exists and belongs to the caller
    BucketAlreadyOwned,
    /// Object or bucket does not exist
    NotFound,
    /// Anything else
    Other,
}

/// Map a storage-client error onto the failure categories the gateway acts
/// on. rust-s3 surfaces non-2xx responses as `HttpFailWithBody` with the
/// status code and the raw XML error body, so both are inspected.
pub fn classify_storage_error(err: &S3Error) -> StorageFailure {
    match err {
        S3Error::HttpFailWithBody(code, body) => {
            // Only the owned-by-you code maps to 409; a collision with a
            // bucket belonging to someone else is an ordinary failure.
            if body.contains("BucketAlreadyOwnedByYou") {
                StorageFailure::BucketAlreadyOwned
            } else if *code == 403 || body.contains("AccessDenied") || body.contains("InvalidAccessKeyId") || body.contains("SignatureDoesNotMatch") {
                StorageFailure::AccessDenied
            } else if *code == 404 || body.contains("NoSuchKey") || body.contains("NoSuchBucket") {
                StorageFailure::NotFound
            } else {
                StorageFailure::Other
            }
        }
        _ => StorageFailure::Other,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(message) => {
                tracing::warn!("request validation failed: {}", message);
                (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
            }
            ApiError::Backend { context, source } => {
                tracing::error!("{}: {}", context, source);
                match classify_storage_error(&source) {
                    StorageFailure::BucketAlreadyOwned => (
                        StatusCode::CONFLICT,
                        Json(json!({ "message": "Bucket already exists and is owned by you" })),
                    )
                        .into_response(),
                    // 404/403 from storage still surface as 500 here; only
                    // the download and login paths treat them specially.
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "message": context, "error": source.to_string() })),
                    )
                        .into_response(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http_fail(code: u16, body: &str) -> S3Error {
        S3Error::HttpFailWithBody(code, body.to_string())
    }

    #[test]
    fn forbidden_status_is_access_denied() {
        let err = http_fail(403, "<Error><Code>AccessDenied</Code></Error>");
        assert_eq!(classify_storage_error(&err), StorageFailure::AccessDenied);
    }

    #[test]
    fn invalid_key_code_is_access_denied() {
        let err = http_fail(400, "<Error><Code>InvalidAccessKeyId</Code></Error>");
        assert_eq!(classify_storage_error(&err), StorageFailure::AccessDenied);
    }

    #[test]
    fn owned_bucket_conflict_is_recognized() {
        let err = http_fail(409, "<Error><Code>BucketAlreadyOwnedByYou</Code></Error>");
        assert_eq!(
            classify_storage_error(&err),
            StorageFailure::BucketAlreadyOwned
        );
    }

    #[test]
    fn missing_key_is_not_found() {
        let err = http_fail(404, "<Error><Code>NoSuchKey</Code></Error>");
        assert_eq!(classify_storage_error(&err), StorageFailure::NotFound);
    }

    #[test]
    fn foreign_bucket_collision_is_not_a_conflict() {
        let err = http_fail(409, "<Error><Code>BucketAlreadyExists</Code></Error>");
        assert_eq!(classify_storage_error(&err), StorageFailure::Other);
    }

    #[test]
    fn unrelated_failures_are_other() {
        let err = http_fail(503, "<Error><Code>SlowDown</Code></Error>");
        assert_eq!(classify_storage_error(&err), StorageFailure::Other);
        assert_eq!(
            classify_storage_error(&S3Error::HttpFail),
            StorageFailure::Other
        );
    }
}
