//! Tools command implementation

use crate::cli::error::{CliError, CliResult};
use clap::Args;
use slidekit::{AvailableTool, SlideKitService};

/// List the tools a session exposes
#[derive(Debug, Args)]
pub struct ToolsArgs {
    /// Print as JSON instead of a table
    #[arg(long, help = "Print as JSON instead of a table")]
    pub json: bool,
}

fn format_table(tools: &[AvailableTool]) -> String {
    let width = tools.iter().map(|t| t.name.len()).max().unwrap_or(0);
    tools
        .iter()
        .map(|tool| format!("{:<width$}  {}", tool.name, tool.description, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn execute_tools(service: &SlideKitService, args: ToolsArgs) -> CliResult<()> {
    let tools = service.tool_service().get_available_tools().await?;

    if args.json {
        let rendered = serde_json::to_string_pretty(&tools)
            .map_err(|e| CliError::InvalidArguments(e.to_string()))?;
        println!("{}", rendered);
    } else {
        println!("{}", format_table(&tools));
    }
    Ok(())
}
