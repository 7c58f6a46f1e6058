//! Object storage abstraction for presentation transfer

pub mod memory;
#[cfg(feature = "s3")]
pub mod s3;

pub use memory::MemoryObjectStore;
#[cfg(feature = "s3")]
pub use s3::S3ObjectStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Error reported by a storage backend, with its code and message kept verbatim
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct BackendError {
    /// Backend error code (e.g. `NoSuchKey`, `InvalidAccessKeyId`)
    pub code: String,
    pub message: String,
    /// HTTP status of the failed response, when there was one
    pub status: Option<u16>,
}

impl BackendError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// Write request for a single object
#[derive(Debug, Clone)]
pub struct PutObjectRequest {
    pub bucket: String,
    pub key: String,
    pub content_type: String,
    pub body: Vec<u8>,
    /// `None` means no metadata field is sent at all
    pub metadata: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone)]
pub struct ListObjectsRequest {
    pub bucket: String,
    pub prefix: Option<String>,
    pub max_keys: i32,
}

/// One entry of a bucket listing
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
    pub etag: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectPage {
    pub objects: Vec<ObjectSummary>,
    pub is_truncated: bool,
}

/// Result of a metadata-only request
#[derive(Debug, Clone, Default)]
pub struct ObjectHead {
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
    pub content_type: Option<String>,
    pub etag: Option<String>,
    pub metadata: HashMap<String, String>,
}

/// Trait for object storage backends
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write an object
    async fn put_object(&self, request: PutObjectRequest) -> Result<(), BackendError>;

    /// Read an object's full body
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, BackendError>;

    /// List objects (one page, at most `max_keys` entries)
    async fn list_objects(&self, request: ListObjectsRequest) -> Result<ObjectPage, BackendError>;

    /// Fetch object metadata without the body
    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectHead, BackendError>;

    /// Delete an object
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), BackendError>;

    /// Short description used in logs (never includes credentials)
    fn describe(&self) -> String;
}
