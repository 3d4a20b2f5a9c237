//! Gateway configuration module
//!
//! Everything is sourced from the environment once at startup; after that the
//! config is shared read-only behind an `Arc`.

use serde::{Deserialize, Serialize};

/// Process-wide gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Object-storage endpoint settings
    pub storage: StorageConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Listen port
    pub port: u16,
}

/// Object-storage endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage service host
    pub endpoint: String,
    /// Storage service port
    pub port: u16,
    /// Whether to speak TLS to the storage service
    pub use_ssl: bool,
    /// Region string passed to the S3 client
    pub region: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: "localhost".to_string(),
            port: 9000,
            use_ssl: false,
            region: "us-east-1".to_string(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything absent or unparseable.
    ///
    /// Recognized variables: `MINIO_ENDPOINT`, `MINIO_PORT`, `MINIO_USE_SSL`,
    /// `MINIO_REGION`, `HOST`, `PORT`.
    pub fn load() -> Self {
        let defaults = Self::default();

        Self {
            server: ServerConfig {
                host: std::env::var("HOST").unwrap_or(defaults.server.host),
                port: parse_port(std::env::var("PORT").ok(), defaults.server.port),
            },
            storage: StorageConfig {
                endpoint: std::env::var("MINIO_ENDPOINT").unwrap_or(defaults.storage.endpoint),
                port: parse_port(std::env::var("MINIO_PORT").ok(), defaults.storage.port),
                use_ssl: parse_ssl_flag(std::env::var("MINIO_USE_SSL").ok()),
                region: std::env::var("MINIO_REGION").unwrap_or(defaults.storage.region),
            },
        }
    }

    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl StorageConfig {
    /// Full endpoint URL for the storage service
    pub fn endpoint_url(&self) -> String {
        let scheme = if self.use_ssl { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.endpoint, self.port)
    }
}

fn parse_port(value: Option<String>, default: u16) -> u16 {
    value
        .and_then(|v| v.trim().parse::<u16>().ok())
        .unwrap_or(default)
}

// Only an explicit true/1 enables TLS; anything else leaves it off.
fn parse_ssl_flag(value: Option<String>) -> bool {
    matches!(
        value.as_deref().map(str::trim),
        Some("true") | Some("1") | Some("TRUE") | Some("True")
    )
}
