//! Credential-scoped storage client
//!
//! The only place the gateway talks to the object-storage service. A client
//! is built fresh for every request from the caller-supplied key pair plus
//! the process-wide endpoint configuration; nothing is cached or pooled.
//! Each method performs exactly one storage call and returns the raw
//! `S3Error` on failure so handlers can attach their own context.

use bytes::Bytes;
use futures::stream::BoxStream;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{BucketConfiguration, Region};
use std::collections::BTreeMap;

use crate::config::StorageConfig;
use crate::models::{BucketSummary, ObjectMetadata, ObjectSummary};

/// A storage client bound to one request's credentials
pub struct StorageClient {
    storage: StorageConfig,
    credentials: Credentials,
}

impl StorageClient {
    /// Build a client from the supplied key pair. No validation of key
    /// format happens here; bad credentials surface when the client is used.
    pub fn new(
        storage: &StorageConfig,
        access_key: &str,
        secret_key: &str,
    ) -> Result<Self, S3Error> {
        let credentials =
            Credentials::new(Some(access_key), Some(secret_key), None, None, None)?;
        Ok(Self {
            storage: storage.clone(),
            credentials,
        })
    }

    fn region(&self) -> Region {
        Region::Custom {
            region: self.storage.region.clone(),
            endpoint: self.storage.endpoint_url(),
        }
    }

    // MinIO requires path-style addressing
    fn bucket_handle(&self, bucket: &str) -> Result<Box<Bucket>, S3Error> {
        Ok(Bucket::new(bucket, self.region(), self.credentials.clone())?.with_path_style())
    }

    /// List all buckets visible to the credentials
    pub async fn list_buckets(&self) -> Result<Vec<BucketSummary>, S3Error> {
        let response = Bucket::list_buckets(self.region(), self.credentials.clone()).await?;
        Ok(response
            .buckets
            .bucket
            .into_iter()
            .map(|b| BucketSummary::new(b.name, b.creation_date))
            .collect())
    }

    /// Create a bucket with the given name
    pub async fn create_bucket(&self, name: &str) -> Result<(), S3Error> {
        Bucket::create_with_path_style(
            name,
            self.region(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await?;
        Ok(())
    }

    /// Recursively list every key under a bucket, root prefix, no
    /// delimiter. Unbounded: rust-s3 drains continuation tokens internally.
    pub async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectSummary>, S3Error> {
        let handle = self.bucket_handle(bucket)?;
        let results = handle.list(String::new(), None).await?;

        let mut objects = Vec::new();
        for result in results {
            for obj in result.contents {
                objects.push(ObjectSummary {
                    name: obj.key,
                    size: obj.size as u64,
                    last_modified: obj.last_modified,
                    etag: obj.e_tag.map(strip_etag_quotes).unwrap_or_default(),
                });
            }
        }
        Ok(objects)
    }

    /// Write an object with an explicit content type
    pub async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content: &[u8],
        content_type: &str,
    ) -> Result<(), S3Error> {
        let handle = self.bucket_handle(bucket)?;
        handle
            .put_object_with_content_type(key, content, content_type)
            .await?;
        Ok(())
    }

    /// Replace the tag set of an object
    pub async fn set_object_tags(
        &self,
        bucket: &str,
        key: &str,
        tags: &[(String, String)],
    ) -> Result<(), S3Error> {
        let handle = self.bucket_handle(bucket)?;
        handle.put_object_tagging(key, tags).await?;
        Ok(())
    }

    /// Fetch the current tag mapping of an object
    pub async fn get_object_tags(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<BTreeMap<String, String>, S3Error> {
        let handle = self.bucket_handle(bucket)?;
        let (tags, _code) = handle.get_object_tagging(key).await?;
        Ok(tags
            .into_iter()
            .map(|tag| (tag.key(), tag.value()))
            .collect())
    }

    /// Stat an object's metadata
    pub async fn stat_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata, S3Error> {
        let handle = self.bucket_handle(bucket)?;
        let (head, _code) = handle.head_object(key).await?;
        Ok(ObjectMetadata {
            name: key.to_string(),
            size: head.content_length.unwrap_or(0) as u64,
            etag: head.e_tag.map(strip_etag_quotes),
            content_type: head.content_type,
            last_modified: head.last_modified,
        })
    }

    /// Remove an object
    pub async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), S3Error> {
        let handle = self.bucket_handle(bucket)?;
        handle.delete_object(key).await?;
        Ok(())
    }

    /// Open a byte stream for an object. The stream is handed straight to
    /// the response body; the gateway never buffers the whole object.
    pub async fn open_object_stream(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<BoxStream<'static, Result<Bytes, S3Error>>, S3Error> {
        let handle = self.bucket_handle(bucket)?;
        let stream = handle.get_object_stream(key).await?;
        if !(200..300).contains(&stream.status_code) {
            return Err(S3Error::HttpFailWithBody(
                stream.status_code,
                String::new(),
            ));
        }
        Ok(stream.bytes)
    }
}

// S3 returns ETags wrapped in literal double quotes; the JSON contract
// exposes the bare hash.
fn strip_etag_quotes(etag: String) -> String {
    etag.trim_matches('"').to_string()
}
