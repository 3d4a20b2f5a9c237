//! Object routes: upload, metadata, delete, download

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

use bucket_bridge::config::GatewayConfig;
use bucket_bridge::error::ApiError;
use bucket_bridge::models::{MetadataResponse, TagEntry};
use bucket_bridge::storage::StorageClient;

use crate::auth::StorageCredentials;

fn client_for(
    config: &GatewayConfig,
    creds: &StorageCredentials,
) -> Result<StorageClient, ApiError> {
    StorageClient::new(&config.storage, &creds.access_key, &creds.secret_key)
        .map_err(|e| ApiError::backend("Failed to initialize storage client", e))
}

/// POST /files/:bucket/upload - multipart upload with optional tags
///
/// Expects a `file` part and an optional `tags` text part holding a JSON
/// array of `{key, value}` objects. Tag validation happens before the write
/// so a malformed request never touches storage.
pub async fn upload(
    State(config): State<Arc<GatewayConfig>>,
    Path(bucket): Path<String>,
    creds: StorageCredentials,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut file_name = String::new();
    let mut content_type = String::new();
    let mut file_data: Option<Vec<u8>> = None;
    let mut raw_tags: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::validation("Invalid multipart payload"))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                file_name = field.file_name().unwrap_or("unknown").to_string();
                content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::validation("Invalid multipart payload"))?;
                file_data = Some(data.to_vec());
            }
            "tags" => {
                raw_tags = Some(
                    field
                        .text()
                        .await
                        .map_err(|_| ApiError::validation("Invalid multipart payload"))?,
                );
            }
            _ => {}
        }
    }

    let file_data = file_data.ok_or_else(|| ApiError::validation("No file uploaded."))?;

    let tags = match raw_tags {
        Some(raw) => fold_tags(parse_tags_field(&raw)?),
        None => BTreeMap::new(),
    };

    tracing::info!(
        "uploading {} ({} bytes) to bucket {}",
        file_name,
        file_data.len(),
        bucket
    );

    let client = client_for(&config, &creds)?;
    client
        .put_object(&bucket, &file_name, &file_data, &content_type)
        .await
        .map_err(|e| ApiError::backend("Error uploading file.", e))?;

    // Tagging is a second storage call; if it fails the object is already
    // stored, so say so instead of reporting a failed upload.
    if !tags.is_empty() {
        let pairs: Vec<(String, String)> = tags.into_iter().collect();
        client
            .set_object_tags(&bucket, &file_name, &pairs)
            .await
            .map_err(|e| {
                ApiError::backend(
                    "File was stored but applying tags failed; the object exists untagged.",
                    e,
                )
            })?;
    }

    Ok(Json(
        json!({ "message": "File uploaded and tagged successfully." }),
    ))
}

/// GET /files/:bucket/:file/metadata - stat metadata plus tag mapping
pub async fn metadata(
    State(config): State<Arc<GatewayConfig>>,
    Path((bucket, file_name)): Path<(String, String)>,
    creds: StorageCredentials,
) -> Result<Json<MetadataResponse>, ApiError> {
    let client = client_for(&config, &creds)?;

    let metadata = client
        .stat_object(&bucket, &file_name)
        .await
        .map_err(|e| ApiError::backend("Error fetching file metadata or tags.", e))?;
    let tags = client
        .get_object_tags(&bucket, &file_name)
        .await
        .map_err(|e| ApiError::backend("Error fetching file metadata or tags.", e))?;

    Ok(Json(MetadataResponse { metadata, tags }))
}

/// DELETE /files/:bucket/:file - remove an object
pub async fn delete(
    State(config): State<Arc<GatewayConfig>>,
    Path((bucket, file_name)): Path<(String, String)>,
    creds: StorageCredentials,
) -> Result<Json<Value>, ApiError> {
    let client = client_for(&config, &creds)?;
    client
        .delete_object(&bucket, &file_name)
        .await
        .map_err(|e| ApiError::backend("Error deleting file.", e))?;

    tracing::info!("deleted {} from bucket {}", file_name, bucket);
    Ok(Json(json!({ "message": "File deleted successfully." })))
}

/// GET /files/:bucket/:file - stream an object back to the caller
///
/// Bytes pass straight from the storage response into the HTTP body; the
/// object is never buffered in full. Any failure to open the stream is
/// reported as 404, whatever the underlying cause.
pub async fn download(
    State(config): State<Arc<GatewayConfig>>,
    Path((bucket, file_name)): Path<(String, String)>,
    creds: StorageCredentials,
) -> Result<Response, (StatusCode, Json<Value>)> {
    let not_found = |detail: String| {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "File not found.", "details": detail })),
        )
    };

    let client = StorageClient::new(&config.storage, &creds.access_key, &creds.secret_key)
        .map_err(|e| not_found(e.to_string()))?;

    let stream = client
        .open_object_stream(&bucket, &file_name)
        .await
        .map_err(|e| {
            tracing::warn!("failed to open {} in bucket {}: {}", file_name, bucket, e);
            not_found(e.to_string())
        })?;

    let content_type = mime_guess::from_path(&file_name).first_or_octet_stream();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(header::CONTENT_DISPOSITION, inline_disposition(&file_name))
        .body(Body::from_stream(stream))
        .map_err(|e| {
            tracing::error!("failed to build download response: {}", e);
            not_found(e.to_string())
        })
}

fn inline_disposition(file_name: &str) -> String {
    // Quotes inside the name would break the header value
    format!("inline; filename=\"{}\"", file_name.replace('"', ""))
}

fn parse_tags_field(raw: &str) -> Result<Vec<TagEntry>, ApiError> {
    serde_json::from_str(raw).map_err(|_| {
        ApiError::validation("Invalid tags format. Tags must be a valid JSON array.")
    })
}

// Fold {key, value} entries into a mapping. Entries missing either half or
// carrying an empty string are dropped; later duplicates overwrite earlier
// ones.
fn fold_tags(entries: Vec<TagEntry>) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    for entry in entries {
        if let (Some(key), Some(value)) = (entry.key, entry.value) {
            if !key.is_empty() && !value.is_empty() {
                tags.insert(key, value);
            }
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_duplicate_tag_wins() {
        let entries =
            parse_tags_field(r#"[{"key":"a","value":"1"},{"key":"a","value":"2"}]"#).unwrap();
        let tags = fold_tags(entries);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags.get("a"), Some(&"2".to_string()));
    }

    #[test]
    fn incomplete_entries_are_dropped() {
        let entries = parse_tags_field(
            r#"[{"key":"b"},{"value":"only"},{"key":"","value":"x"},{"key":"ok","value":"yes"}]"#,
        )
        .unwrap();
        let tags = fold_tags(entries);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags.get("ok"), Some(&"yes".to_string()));
    }

    #[test]
    fn empty_array_folds_to_no_tags() {
        let tags = fold_tags(parse_tags_field("[]").unwrap());
        assert!(tags.is_empty());
    }

    #[test]
    fn malformed_tags_json_is_a_validation_error() {
        for raw in ["{not json", "\"string\"", "{\"key\":\"a\"}", "42"] {
            assert!(
                matches!(parse_tags_field(raw), Err(ApiError::Validation(_))),
                "{:?} should fail validation",
                raw
            );
        }
    }

    #[test]
    fn content_type_is_inferred_from_extension() {
        assert_eq!(
            mime_guess::from_path("photo.png").first_or_octet_stream(),
            mime_guess::mime::IMAGE_PNG
        );
        assert_eq!(
            mime_guess::from_path("blob.unknownext")
                .first_or_octet_stream()
                .as_ref(),
            "application/octet-stream"
        );
    }

    #[test]
    fn disposition_is_inline_and_quote_safe() {
        assert_eq!(
            inline_disposition("report.pdf"),
            "inline; filename=\"report.pdf\""
        );
        assert_eq!(
            inline_disposition("we\"ird.txt"),
            "inline; filename=\"weird.txt\""
        );
    }
}
