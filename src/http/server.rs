//! Axum HTTP server implementation

use crate::core::service::{HttpServerConfig, SlideKitService};
use crate::http::handlers::{status, tools, AppState};
use axum::{
    http::{HeaderName, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing::{info, warn};

/// SlideKit HTTP server
pub struct SlideKitServer {
    service: Arc<SlideKitService>,
    addr: SocketAddr,
}

impl SlideKitServer {
    /// Create a new server instance
    pub fn new(service: Arc<SlideKitService>, host: &str, port: u16) -> Result<Self, String> {
        let addr = Self::parse_address(host, port)?;
        Ok(Self { service, addr })
    }

    /// Parse and normalize host:port into a SocketAddr
    fn parse_address(host: &str, port: u16) -> Result<SocketAddr, String> {
        let normalized_host = Self::normalize_host(host);

        // IPv6 addresses need brackets
        let addr_str = if normalized_host.contains(':') {
            format!("[{}]:{}", normalized_host, port)
        } else {
            format!("{}:{}", normalized_host, port)
        };

        addr_str.parse().map_err(|_| {
            format!(
                "Unable to parse address '{}'. Use IP addresses like '127.0.0.1', '0.0.0.0', '::1', or 'localhost'",
                addr_str
            )
        })
    }

    /// Normalize hostnames for SocketAddr compatibility
    fn normalize_host(host: &str) -> String {
        match host {
            "localhost" => "127.0.0.1".to_string(),
            "::1" | "[::1]" => "::1".to_string(),
            "::" | "[::]" => "::".to_string(),
            _ => host.to_string(),
        }
    }

    /// Start the server
    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error>> {
        let app = create_router(self.service.clone());

        info!("Starting SlideKit HTTP server on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        let actual_addr = listener.local_addr()?;
        info!("Server bound to {}", actual_addr);

        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Get server address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

/// Build the CORS layer; without configured origins any origin is allowed
fn cors_layer(config: Option<&HttpServerConfig>) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods([Method::GET, Method::POST]);

    let Some(config) = config.filter(|c| !c.allowed_origins.is_empty()) else {
        return layer.allow_headers(Any).allow_origin(Any);
    };

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    let headers: Vec<HeaderName> = if config.allowed_headers.is_empty() {
        vec![
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ]
    } else {
        config
            .allowed_headers
            .iter()
            .filter_map(|name| HeaderName::from_bytes(name.as_bytes()).ok())
            .collect()
    };

    layer
        .allow_origin(AllowOrigin::list(origins))
        .allow_headers(headers)
}

/// Create the Axum router with all routes
pub fn create_router(service: Arc<SlideKitService>) -> Router {
    let cors = cors_layer(service.config().http_server.as_ref());
    let state = AppState::new(service);

    Router::new()
        .route("/tools", get(tools::list_tools))
        .route("/tools/:name", post(tools::call_tool))
        .route("/api/status", get(status::status))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
        .with_state(state)
}

/// Convenience function to create and start a server
pub async fn serve(
    service: Arc<SlideKitService>,
    host: &str,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let server = SlideKitServer::new(service, host, port)?;
    server.serve().await
}
