//! In-process object store with S3-like semantics

use super::{
    BackendError, ListObjectsRequest, ObjectHead, ObjectPage, ObjectStore, ObjectSummary,
    PutObjectRequest,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredObject {
    body: Vec<u8>,
    content_type: String,
    metadata: HashMap<String, String>,
    etag: String,
    last_modified: DateTime<Utc>,
}

/// Object store kept entirely in memory.
///
/// Buckets must be created before use; reads of absent buckets or keys fail
/// with the same codes S3 returns (`NoSuchBucket`, `NoSuchKey`, `NotFound` for
/// HEAD), and deleting an absent key succeeds.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    buckets: RwLock<HashMap<String, BTreeMap<String, StoredObject>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with the given buckets already present
    pub fn with_buckets<I, S>(buckets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let map = buckets
            .into_iter()
            .map(|name| (name.into(), BTreeMap::new()))
            .collect();
        Self {
            buckets: RwLock::new(map),
        }
    }

    /// Create a bucket; creating an existing bucket is a no-op
    pub async fn create_bucket(&self, bucket: &str) {
        self.buckets
            .write()
            .await
            .entry(bucket.to_string())
            .or_default();
    }

    /// Number of objects stored in a bucket
    pub async fn object_count(&self, bucket: &str) -> usize {
        self.buckets
            .read()
            .await
            .get(bucket)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    fn no_such_bucket(bucket: &str) -> BackendError {
        BackendError::new(
            "NoSuchBucket",
            format!("The specified bucket does not exist ({})", bucket),
        )
        .with_status(404)
    }

    fn etag(body: &[u8]) -> String {
        let digest = Sha256::digest(body);
        digest[..16].iter().map(|b| format!("{:02x}", b)).collect()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_object(&self, request: PutObjectRequest) -> Result<(), BackendError> {
        let mut buckets = self.buckets.write().await;
        let objects = buckets
            .get_mut(&request.bucket)
            .ok_or_else(|| Self::no_such_bucket(&request.bucket))?;

        let stored = StoredObject {
            etag: Self::etag(&request.body),
            body: request.body,
            content_type: request.content_type,
            metadata: request.metadata.unwrap_or_default(),
            last_modified: Utc::now(),
        };
        objects.insert(request.key, stored);
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, BackendError> {
        let buckets = self.buckets.read().await;
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| Self::no_such_bucket(bucket))?;
        objects.get(key).map(|o| o.body.clone()).ok_or_else(|| {
            BackendError::new(
                "NoSuchKey",
                format!("The specified key does not exist ({})", key),
            )
            .with_status(404)
        })
    }

    async fn list_objects(&self, request: ListObjectsRequest) -> Result<ObjectPage, BackendError> {
        let buckets = self.buckets.read().await;
        let objects = buckets
            .get(&request.bucket)
            .ok_or_else(|| Self::no_such_bucket(&request.bucket))?;

        let prefix = request.prefix.as_deref().unwrap_or("");
        let limit = usize::try_from(request.max_keys.max(0)).unwrap_or(0);
        let mut matching = objects.iter().filter(|(key, _)| key.starts_with(prefix));

        let page: Vec<ObjectSummary> = matching
            .by_ref()
            .take(limit)
            .map(|(key, object)| ObjectSummary {
                key: key.clone(),
                size: object.body.len() as i64,
                last_modified: Some(object.last_modified),
                etag: Some(format!("\"{}\"", object.etag)),
            })
            .collect();
        let is_truncated = matching.next().is_some();

        Ok(ObjectPage {
            objects: page,
            is_truncated,
        })
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectHead, BackendError> {
        let buckets = self.buckets.read().await;
        // HEAD responses carry no body, so S3 reports both cases as a bare 404
        let object = buckets
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .ok_or_else(|| BackendError::new("NotFound", "Not Found").with_status(404))?;

        Ok(ObjectHead {
            size: object.body.len() as i64,
            last_modified: Some(object.last_modified),
            content_type: Some(object.content_type.clone()),
            etag: Some(format!("\"{}\"", object.etag)),
            metadata: object.metadata.clone(),
        })
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), BackendError> {
        let mut buckets = self.buckets.write().await;
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| Self::no_such_bucket(bucket))?;
        objects.remove(key);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory://".to_string()
    }
}
