//! Main CLI application structure

use clap::Parser;
use slidekit::SlideKitService;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::commands::{call, serve, tools, version, Commands};
use crate::cli::config::create_service_config;
use crate::cli::error::{CliError, CliResult};

/// SlideKit CLI - presentation tools with S3 transfer
#[derive(Debug, Parser)]
#[command(name = "slidekit")]
#[command(version = slidekit::VERSION)]
#[command(about = "SlideKit CLI - presentation tools with S3 transfer")]
#[command(long_about = "SlideKit exposes presentation tools over HTTP or one call at a time.\n\n\
                         Configuration is read from slidekit.toml (current directory or a parent)\n\
                         and the environment: SLIDEKIT_BASE_DIR, AWS_ACCESS_KEY_ID,\n\
                         AWS_SECRET_ACCESS_KEY, AWS_REGION, S3_ENDPOINT.\n\n\
                         Examples:\n\
                           slidekit serve --port 8080\n\
                           slidekit tools\n\
                           slidekit call create_presentation --args '{\"aspect_ratio\": \"4:3\"}'")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to slidekit.toml (overrides the upward search)
    #[arg(long, global = true, help = "Path to slidekit.toml")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> CliResult<()> {
        slidekit::init_logging();

        // Handle version command early (no service needed)
        let command = match self.command {
            Commands::Version(args) => return version::execute_version(args).await,
            command => command,
        };

        let config = create_service_config(self.config)?;

        if self.verbose {
            match &config.base_dir {
                Some(dir) => println!("Using base directory: {}", dir.display()),
                None => println!("Using base directory: current working directory"),
            }
            if config.default_connection.is_some() {
                println!("Default S3 connection configured from environment/config");
            }
        }

        let service = SlideKitService::new(config).await.map_err(CliError::Service)?;

        match command {
            Commands::Serve(args) => serve::execute_serve(Arc::new(service), args).await,
            Commands::Call(args) => call::execute_call(&service, args).await,
            Commands::Tools(args) => tools::execute_tools(&service, args).await,
            Commands::Version(_) => unreachable!("Handled above"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_call_command() {
        let cli = Cli::try_parse_from([
            "slidekit",
            "call",
            "add_slide",
            "--args",
            r#"{"title": "Hi"}"#,
            "--verbose",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Call(args) => {
                assert_eq!(args.tool, "add_slide");
                assert_eq!(args.args, r#"{"title": "Hi"}"#);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["slidekit", "serve"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.host, "localhost");
                assert_eq!(args.port, 8080);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
