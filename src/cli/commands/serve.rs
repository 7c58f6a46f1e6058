//! Serve command implementation

use crate::cli::error::{CliError, CliResult};
use crate::cli::utils::messages;
use clap::Args;
use slidekit::http::server::SlideKitServer;
use slidekit::SlideKitService;
use std::sync::Arc;
use tracing::info;

/// Serve the SlideKit tools via HTTP API
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Host to bind the server to
    #[arg(long, default_value = "localhost", help = "Host to bind the server to")]
    pub host: String,

    /// Port to bind the server to
    #[arg(long, default_value = "8080", help = "Port to bind the server to")]
    pub port: u16,
}

pub async fn execute_serve(service: Arc<SlideKitService>, args: ServeArgs) -> CliResult<()> {
    info!("Starting SlideKit HTTP server on {}:{}", args.host, args.port);

    let server = SlideKitServer::new(service, &args.host, args.port).map_err(CliError::Config)?;

    println!("{}", messages::info("SlideKit HTTP server starting..."));
    println!("  Listening on: http://{}", server.addr());
    println!("  Tools:        POST http://{}/tools/<name>", server.addr());

    // Blocks until shutdown
    server
        .serve()
        .await
        .map_err(|e| CliError::Server(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use slidekit::ServiceConfig;

    #[tokio::test]
    async fn test_invalid_host_is_config_error() {
        let service = Arc::new(SlideKitService::new(ServiceConfig::default()).await.unwrap());
        let args = ServeArgs {
            host: "not a host".to_string(),
            port: 0,
        };

        let result = execute_serve(service, args).await;
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
