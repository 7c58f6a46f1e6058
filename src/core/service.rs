//! Main SlideKit service implementation

use crate::connections::{self, ConnectionConfig, ConnectionRegistry, DEFAULT_CONNECTION};
use crate::core::tool_calling::{ToolCallingService, ToolCallingServiceImpl};
use crate::security::PathSecurityError;
use crate::tools::{PathPolicy, ToolSession};
use crate::transfer::TransferError;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// HTTP server CORS configuration
#[derive(Debug, Clone, Default)]
pub struct HttpServerConfig {
    /// List of origins allowed for CORS (required when server is used)
    pub allowed_origins: Vec<String>,

    /// Optional: allow list of request headers
    /// Default: ["Content-Type", "Authorization"] if unset
    pub allowed_headers: Vec<String>,
}

/// Main service configuration
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Directory file-based tools are confined to (process working directory if unset)
    pub base_dir: Option<PathBuf>,

    /// Accept absolute paths as given instead of re-rooting them under `base_dir`
    pub allow_absolute_paths: bool,

    /// Connection registered as `default` when the service starts
    pub default_connection: Option<ConnectionConfig>,

    /// HTTP server configuration
    pub http_server: Option<HttpServerConfig>,
}

/// Main service error type
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Path error: {0}")]
    Path(#[from] PathSecurityError),

    #[error("Storage error: {0}")]
    Transfer(#[from] TransferError),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Main SlideKit service
///
/// Owns the tool session behind a mutex, so concurrent callers are served one
/// tool call at a time.
pub struct SlideKitService {
    config: ServiceConfig,

    tool_service: Arc<ToolCallingServiceImpl>,
}

impl SlideKitService {
    /// Create a new service instance
    pub async fn new(config: ServiceConfig) -> Result<Self, ServiceError> {
        crate::init_logging();

        info!("Initializing SlideKit service v{}", crate::VERSION);

        let base_dir = match &config.base_dir {
            Some(dir) => {
                let canonical = dir.canonicalize().map_err(|e| {
                    ServiceError::Config(format!(
                        "Base directory '{}' is not accessible: {}",
                        dir.display(),
                        e
                    ))
                })?;
                Some(canonical)
            }
            None => None,
        };

        let mut registry = ConnectionRegistry::new();
        if let Some(default_connection) = &config.default_connection {
            let store = connections::connect(default_connection).await?;
            registry.register(DEFAULT_CONNECTION, store);
        }

        if config.allow_absolute_paths {
            warn!("Absolute paths are accepted without containment checks");
        }

        let session = ToolSession::new(
            PathPolicy {
                base_dir,
                allow_absolute: config.allow_absolute_paths,
            },
            registry,
        );

        Ok(Self {
            config,
            tool_service: Arc::new(ToolCallingServiceImpl::new(session)),
        })
    }

    /// Get tool calling service
    pub fn tool_service(&self) -> Arc<dyn ToolCallingService> {
        self.tool_service.clone()
    }

    /// Get service configuration
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}
