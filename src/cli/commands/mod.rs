//! Command modules for CLI

pub mod call;
pub mod serve;
pub mod tools;
pub mod version;

use clap::Subcommand;

#[derive(Debug, Subcommand)]
#[command(about = "SlideKit CLI commands")]
pub enum Commands {
    /// Serve the tool API over HTTP
    #[command(about = "Serve the tool API over HTTP")]
    Serve(serve::ServeArgs),

    /// Run a single tool and print its JSON result
    #[command(about = "Run a single tool and print its JSON result")]
    Call(call::CallArgs),

    /// List available tools
    #[command(about = "List available tools")]
    Tools(tools::ToolsArgs),

    /// Show version information
    #[command(about = "Show version information")]
    Version(version::VersionArgs),
}
