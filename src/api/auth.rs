//! Credential validation route
//!
//! There is no session to create: "login" just proves the supplied key pair
//! works against the storage service by running a harmless bucket listing.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use bucket_bridge::config::GatewayConfig;
use bucket_bridge::error::{classify_storage_error, StorageFailure};
use bucket_bridge::models::{LoginRequest, LoginResponse};
use bucket_bridge::storage::StorageClient;

/// POST /auth/login - validate a storage key pair
pub async fn login(
    State(config): State<Arc<GatewayConfig>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, Json<Value>)> {
    let access_key = req.access_key.as_deref().map(str::trim).unwrap_or("");
    let secret_key = req.secret_key.as_deref().map(str::trim).unwrap_or("");

    if access_key.is_empty() || secret_key.is_empty() {
        tracing::warn!("login request missing access key or secret key");
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "message": "Access Key and Secret Key are required"
            })),
        ));
    }

    let client = StorageClient::new(&config.storage, access_key, secret_key).map_err(|e| {
        tracing::error!("failed to build storage client: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "message": "An error occurred during authentication",
                "error": e.to_string()
            })),
        )
    })?;

    // A bucket listing is the cheapest call that exercises authentication
    match client.list_buckets().await {
        Ok(_) => {
            tracing::info!("storage authentication successful for {}", access_key);
            Ok(Json(LoginResponse {
                success: true,
                message: "Login successful".to_string(),
                access_key: access_key.to_string(),
            }))
        }
        Err(e) => {
            tracing::warn!("storage authentication failed: {}", e);
            match classify_storage_error(&e) {
                StorageFailure::AccessDenied => Err((
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "success": false,
                        "message": "Invalid Access Key or Secret Key"
                    })),
                )),
                _ => Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "message": "An error occurred during authentication",
                        "error": e.to_string()
                    })),
                )),
            }
        }
    }
}
