//! Object storage for uploaded design images.

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::instrument;

use crate::config::ObjectStorageConfig;

/// Prefix under which every upload is stored.
const UPLOAD_PREFIX: &str = "uploads";

/// Errors from the object store.
#[derive(Debug, Error)]
pub enum ObjectStoreError {
    /// The put request failed.
    #[error("upload of {key} failed: {message}")]
    Upload { key: String, message: String },

    /// No object storage configured.
    #[error("object storage is not configured")]
    NotConfigured,
}

/// Write-only blob storage returning public URLs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under a fresh key derived from `file_name` and return its public URL.
    async fn put(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ObjectStoreError>;
}

/// Object key for an upload made at `at`: `uploads/<unix-millis>-<file name>`.
#[must_use]
pub fn object_key(file_name: &str, at: DateTime<Utc>) -> String {
    format!("{UPLOAD_PREFIX}/{}-{file_name}", at.timestamp_millis())
}

/// Amazon S3 object store.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    region: String,
}

impl std::fmt::Debug for S3ObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3ObjectStore")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl S3ObjectStore {
    /// Build a client with static credentials from configuration.
    #[must_use]
    pub fn new(config: &ObjectStorageConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.expose_secret().to_owned(),
            None,
            None,
            "rolla-env",
        );
        let s3_config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
            region: config.region.clone(),
        }
    }

    /// Public virtual-hosted-style URL of `key`.
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        format!(
            "https://{}.s3.{}.amazonaws.com/{key}",
            self.bucket, self.region
        )
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    #[instrument(skip(self, bytes), fields(bucket = %self.bucket, size = bytes.len()))]
    async fn put(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ObjectStoreError> {
        let key = object_key(file_name, Utc::now());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| ObjectStoreError::Upload {
                key: key.clone(),
                message: DisplayErrorContext(e).to_string(),
            })?;

        tracing::info!(key = %key, "Object stored");
        Ok(self.public_url(&key))
    }
}

/// An object held by [`InMemoryObjectStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// In-memory object store for tests and local development.
#[derive(Clone, Default)]
pub struct InMemoryObjectStore {
    objects: Arc<RwLock<Vec<StoredObject>>>,
}

impl InMemoryObjectStore {
    /// Base of the URLs this store hands out.
    pub const URL_BASE: &'static str = "memory://objects";

    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored objects in upload order.
    pub async fn objects(&self) -> Vec<StoredObject> {
        self.objects.read().await.clone()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ObjectStoreError> {
        let key = object_key(file_name, Utc::now());
        let url = format!("{}/{key}", Self::URL_BASE);

        self.objects.write().await.push(StoredObject {
            key,
            content_type: content_type.to_string(),
            bytes,
        });

        Ok(url)
    }
}
