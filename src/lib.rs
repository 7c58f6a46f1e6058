//! # SlideKit
//!
//! Presentation tools for agents, with S3-compatible object storage transfer.
//!
//! ## Architecture
//!
//! - [`security`]: path sanitization for every file-based tool
//! - [`document`]: the [`Document`] capability trait and a minimal `.pptx` [`Presentation`]
//! - [`storage`]: the [`ObjectStore`] trait with S3 and in-memory backends
//! - [`transfer`]: upload, download, list, delete and head with typed errors
//! - [`connections`]: named connections owned by a session
//! - [`tools`]: JSON-in, JSON-out tools over one [`ToolSession`]
//! - [`core`], [`http`]: service configuration and the HTTP tool endpoint
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use slidekit::{Document, MemoryObjectStore, Presentation};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemoryObjectStore::with_buckets(["decks"]);
//!
//!     let mut deck = Presentation::new("16:9");
//!     deck.add_slide(Some("Roadmap".to_string()), vec!["Q1".to_string()]);
//!
//!     let uploaded =
//!         slidekit::transfer::upload_document(&store, &deck, "decks", "roadmap.pptx", None)
//!             .await?;
//!     println!("Uploaded {} bytes", uploaded.size_bytes);
//!
//!     let downloaded = slidekit::transfer::download_document::<Presentation>(
//!         &store,
//!         "decks",
//!         "roadmap.pptx",
//!     )
//!     .await?;
//!     assert_eq!(downloaded.document.title(), Some("Roadmap"));
//!
//!     Ok(())
//! }
//! ```

pub mod connections;
pub mod core;
pub mod document;
pub mod http;
pub mod security;
pub mod storage;
pub mod tools;
pub mod transfer;

pub use connections::{ConnectionConfig, ConnectionRegistry};
pub use core::service::{HttpServerConfig, ServiceConfig, ServiceError, SlideKitService};
pub use core::tool_calling::{AvailableTool, ToolCallingService};
pub use document::{Document, DocumentError, Presentation};
pub use security::{sanitize_path, PathSecurityError};
pub use storage::{BackendError, MemoryObjectStore, ObjectStore};
#[cfg(feature = "s3")]
pub use storage::S3ObjectStore;
pub use tools::{Tool, ToolError, ToolSession};
pub use transfer::{ErrorKind, TransferError};

// Re-export commonly used types
pub use async_trait::async_trait;

/// Version of the service layer
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging for the service layer (safe for testing)
pub fn init_logging() {
    // Only initialize logging once
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "slidekit=warn".into());

        let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();

        // This will fail silently if already initialized
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_service_initialization() {
        let temp_dir = TempDir::new().unwrap();
        let config = ServiceConfig {
            base_dir: Some(temp_dir.path().to_path_buf()),
            ..Default::default()
        };

        let service = SlideKitService::new(config).await.unwrap();
        let tools = service.tool_service().get_available_tools().await.unwrap();
        assert_eq!(tools.len(), Tool::ALL.len());
    }
}
