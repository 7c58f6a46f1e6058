//! Named storage connections

use crate::storage::{MemoryObjectStore, ObjectStore};
use crate::transfer::TransferError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_REGION: &str = "us-east-1";

/// Name of the connection registered from the environment
pub const DEFAULT_CONNECTION: &str = "default";

/// Endpoint that selects the in-process store instead of S3
pub const MEMORY_ENDPOINT: &str = "memory://";

/// Settings for one storage connection
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Custom endpoint for S3-compatible services; `None` means AWS
    #[serde(default)]
    pub endpoint_url: Option<String>,
    #[serde(default)]
    pub access_key: String,
    #[serde(default, skip_serializing)]
    pub secret_key: String,
    #[serde(default)]
    pub region: Option<String>,
}

// Hand-written so the secret never ends up in logs
impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("endpoint_url", &self.endpoint_url)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .finish()
    }
}

impl ConnectionConfig {
    pub fn region_or_default(&self) -> &str {
        self.region
            .as_deref()
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_REGION)
    }

    pub fn is_memory(&self) -> bool {
        self.endpoint_url
            .as_deref()
            .is_some_and(|url| url.starts_with(MEMORY_ENDPOINT))
    }

    /// Buckets named after the memory scheme, e.g. `memory://decks,archive`
    pub fn memory_buckets(&self) -> Vec<&str> {
        self.endpoint_url
            .as_deref()
            .and_then(|url| url.strip_prefix(MEMORY_ENDPOINT))
            .map(|rest| {
                rest.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Build a store for a connection configuration.
///
/// Fails only when S3 support was compiled out and a non-memory endpoint is requested.
pub async fn connect(config: &ConnectionConfig) -> Result<Arc<dyn ObjectStore>, TransferError> {
    if config.is_memory() {
        return Ok(Arc::new(MemoryObjectStore::with_buckets(
            config.memory_buckets(),
        )));
    }

    connect_s3(config).await
}

#[cfg(feature = "s3")]
async fn connect_s3(config: &ConnectionConfig) -> Result<Arc<dyn ObjectStore>, TransferError> {
    Ok(Arc::new(crate::storage::S3ObjectStore::connect(config).await))
}

#[cfg(not(feature = "s3"))]
async fn connect_s3(_config: &ConnectionConfig) -> Result<Arc<dyn ObjectStore>, TransferError> {
    Err(TransferError::Backend {
        operation: "connect",
        code: "Unsupported".to_string(),
        message: "S3 support is not enabled. Rebuild with --features s3".to_string(),
    })
}

/// Connections available to one session, keyed by caller-chosen name
#[derive(Default, Clone)]
pub struct ConnectionRegistry {
    stores: HashMap<String, Arc<dyn ObjectStore>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a store under `name`, replacing any previous one.
    /// Returns true when an existing connection was replaced.
    pub fn register(&mut self, name: impl Into<String>, store: Arc<dyn ObjectStore>) -> bool {
        let name = name.into();
        info!("Registered connection '{}' ({})", name, store.describe());
        self.stores.insert(name, store).is_some()
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn ObjectStore>, TransferError> {
        self.stores
            .get(name)
            .cloned()
            .ok_or_else(|| TransferError::ConnectionNotConfigured {
                name: name.to_string(),
            })
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.stores.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("names", &self.names())
            .finish()
    }
}
