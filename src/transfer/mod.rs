//! Object transfer adapter
//!
//! Moves documents between memory and an [`ObjectStore`], and translates
//! backend failures into [`TransferError`]. Every operation is a single
//! round trip; nothing here retries.

pub mod error;

pub use error::{ErrorKind, TransferError};

use crate::document::Document;
use crate::storage::{ListObjectsRequest, ObjectStore, PutObjectRequest};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

/// Outcome of a successful upload
#[derive(Debug, Clone, Serialize)]
pub struct UploadResult {
    pub success: bool,
    pub bucket: String,
    pub key: String,
    /// Exact length of the serialized document that was written
    pub size_bytes: u64,
    pub message: String,
}

/// A downloaded document with the facts reported about it
#[derive(Debug, Clone)]
pub struct DownloadResult<D> {
    pub document: D,
    pub bucket: String,
    pub key: String,
    pub slide_count: usize,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectEntry {
    pub key: String,
    pub size_bytes: i64,
    pub last_modified: Option<String>,
    pub etag: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectListing {
    pub bucket: String,
    pub prefix: String,
    pub count: usize,
    pub entries: Vec<ObjectEntry>,
    /// More objects exist beyond `entries`
    pub truncated: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteResult {
    pub success: bool,
    pub bucket: String,
    pub key: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectInfo {
    pub bucket: String,
    pub key: String,
    pub size_bytes: i64,
    pub last_modified: Option<String>,
    pub content_type: String,
    pub etag: Option<String>,
    pub metadata: HashMap<String, String>,
}

fn rfc3339(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn strip_etag(etag: &str) -> String {
    etag.trim_matches('"').to_string()
}

/// Serialize `document` and write it to `bucket`/`key`.
///
/// Empty metadata is treated the same as no metadata: the request carries no
/// metadata field at all.
pub async fn upload_document<D: Document>(
    store: &dyn ObjectStore,
    document: &D,
    bucket: &str,
    key: &str,
    metadata: Option<HashMap<String, String>>,
) -> Result<UploadResult, TransferError> {
    let body = document.to_bytes()?;
    let size_bytes = body.len() as u64;

    let request = PutObjectRequest {
        bucket: bucket.to_string(),
        key: key.to_string(),
        content_type: D::CONTENT_TYPE.to_string(),
        body,
        metadata: metadata.filter(|m| !m.is_empty()),
    };

    store
        .put_object(request)
        .await
        .map_err(|e| error::classify("upload", e, bucket, Some(key), false))?;

    info!(
        "Uploaded {} bytes to s3://{}/{} via {}",
        size_bytes,
        bucket,
        key,
        store.describe()
    );

    Ok(UploadResult {
        success: true,
        bucket: bucket.to_string(),
        key: key.to_string(),
        size_bytes,
        message: format!(
            "Successfully uploaded presentation to s3://{}/{}",
            bucket, key
        ),
    })
}

/// Fetch `bucket`/`key` and deserialize it
pub async fn download_document<D: Document>(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
) -> Result<DownloadResult<D>, TransferError> {
    let bytes = store
        .get_object(bucket, key)
        .await
        .map_err(|e| error::classify("download", e, bucket, Some(key), true))?;
    let size_bytes = bytes.len() as u64;

    let document = D::from_bytes(&bytes)?;
    let slide_count = document.slide_count();

    info!(
        "Downloaded {} bytes from s3://{}/{} ({} slides)",
        size_bytes, bucket, key, slide_count
    );

    Ok(DownloadResult {
        document,
        bucket: bucket.to_string(),
        key: key.to_string(),
        slide_count,
        size_bytes,
    })
}

/// List at most `max_keys` objects under an optional prefix
pub async fn list_objects(
    store: &dyn ObjectStore,
    bucket: &str,
    prefix: Option<&str>,
    max_keys: usize,
) -> Result<ObjectListing, TransferError> {
    let prefix = prefix.filter(|p| !p.is_empty());
    let request = ListObjectsRequest {
        bucket: bucket.to_string(),
        prefix: prefix.map(str::to_string),
        max_keys: i32::try_from(max_keys).unwrap_or(i32::MAX),
    };

    let page = store
        .list_objects(request)
        .await
        .map_err(|e| error::classify("list", e, bucket, None, true))?;

    let mut truncated = page.is_truncated;
    let mut objects = page.objects;
    if objects.len() > max_keys {
        debug!(
            "Backend returned {} entries for max_keys={}, dropping the rest",
            objects.len(),
            max_keys
        );
        objects.truncate(max_keys);
        truncated = true;
    }

    let entries: Vec<ObjectEntry> = objects
        .into_iter()
        .map(|object| ObjectEntry {
            key: object.key,
            size_bytes: object.size,
            last_modified: object.last_modified.as_ref().map(rfc3339),
            etag: object.etag.as_deref().map(strip_etag),
        })
        .collect();

    Ok(ObjectListing {
        bucket: bucket.to_string(),
        prefix: prefix.unwrap_or_default().to_string(),
        count: entries.len(),
        entries,
        truncated,
    })
}

/// Delete `bucket`/`key`; an absent key is reported exactly like a deleted one
pub async fn delete_object(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
) -> Result<DeleteResult, TransferError> {
    match store.delete_object(bucket, key).await {
        Ok(()) => {}
        Err(e) if e.code == "NoSuchKey" => {
            debug!("s3://{}/{} already absent", bucket, key);
        }
        Err(e) => return Err(error::classify("delete", e, bucket, Some(key), false)),
    }

    info!("Deleted s3://{}/{}", bucket, key);

    Ok(DeleteResult {
        success: true,
        bucket: bucket.to_string(),
        key: key.to_string(),
        message: format!("Successfully deleted s3://{}/{}", bucket, key),
    })
}

/// Fetch object metadata without the body
pub async fn head_object(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
) -> Result<ObjectInfo, TransferError> {
    let head = store
        .head_object(bucket, key)
        .await
        .map_err(|e| error::classify("head object", e, bucket, Some(key), true))?;

    Ok(ObjectInfo {
        bucket: bucket.to_string(),
        key: key.to_string(),
        size_bytes: head.size,
        last_modified: head.last_modified.as_ref().map(rfc3339),
        content_type: head.content_type.unwrap_or_else(|| "unknown".to_string()),
        etag: head.etag.as_deref().map(strip_etag),
        metadata: head.metadata,
    })
}
