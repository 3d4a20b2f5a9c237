//! Per-request storage credentials
//!
//! Bucket and file routes carry the caller's storage key pair in the
//! `X-Access-Key` / `X-Secret-Key` headers. The extractor rejects with 400
//! before any storage call when either header is missing or empty; nothing
//! is stored server-side and the pair lives only for the request.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use bucket_bridge::error::ApiError;

pub const ACCESS_KEY_HEADER: &str = "x-access-key";
pub const SECRET_KEY_HEADER: &str = "x-secret-key";

/// Caller-supplied storage key pair
#[derive(Debug, Clone)]
pub struct StorageCredentials {
    pub access_key: String,
    pub secret_key: String,
}

fn header_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl<S> FromRequestParts<S> for StorageCredentials
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let access_key = header_value(parts, ACCESS_KEY_HEADER);
        let secret_key = header_value(parts, SECRET_KEY_HEADER);

        match (access_key, secret_key) {
            (Some(access_key), Some(secret_key)) => Ok(Self {
                access_key,
                secret_key,
            }),
            _ => Err(ApiError::validation(
                "Access Key and Secret Key are required",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_headers(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/buckets");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn both_headers_present_yields_credentials() {
        let mut parts = parts_with_headers(&[
            (ACCESS_KEY_HEADER, "minioadmin"),
            (SECRET_KEY_HEADER, "secret123"),
        ]);
        let creds = StorageCredentials::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(creds.access_key, "minioadmin");
        assert_eq!(creds.secret_key, "secret123");
    }

    #[tokio::test]
    async fn missing_secret_is_rejected() {
        let mut parts = parts_with_headers(&[(ACCESS_KEY_HEADER, "minioadmin")]);
        let result = StorageCredentials::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn empty_header_counts_as_missing() {
        let mut parts = parts_with_headers(&[
            (ACCESS_KEY_HEADER, ""),
            (SECRET_KEY_HEADER, "secret123"),
        ]);
        let result = StorageCredentials::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }
}
