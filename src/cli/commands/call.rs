//! Call command implementation

use crate::cli::error::{CliError, CliResult};
use crate::cli::utils::messages;
use clap::Args;
use serde_json::Value;
use slidekit::SlideKitService;

/// Run one tool against a fresh session
#[derive(Debug, Args)]
pub struct CallArgs {
    /// Tool name (see `slidekit tools`)
    pub tool: String,

    /// Tool arguments as a JSON object
    #[arg(long, default_value = "{}", help = "Tool arguments as a JSON object")]
    pub args: String,
}

/// Parse `--args`; only JSON objects are accepted
pub fn parse_tool_args(raw: &str) -> CliResult<Value> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| CliError::InvalidArguments(format!("--args is not valid JSON: {}", e)))?;
    if !value.is_object() {
        return Err(CliError::InvalidArguments(
            "--args must be a JSON object".to_string(),
        ));
    }
    Ok(value)
}

pub async fn execute_call(service: &SlideKitService, args: CallArgs) -> CliResult<()> {
    let arguments = parse_tool_args(&args.args)?;
    let result = service
        .tool_service()
        .call_tool(&args.tool, arguments)
        .await;

    if let Some(message) = result.get("error").and_then(Value::as_str) {
        eprintln!("{}", messages::error(message));
        return Err(CliError::ToolFailed {
            tool: args.tool,
            message: message.to_string(),
        });
    }

    let rendered = serde_json::to_string_pretty(&result)
        .map_err(|e| CliError::InvalidArguments(e.to_string()))?;
    println!("{}", rendered);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use slidekit::ServiceConfig;
    use tempfile::TempDir;

    #[test]
    fn test_parse_tool_args() {
        assert!(parse_tool_args("{}").unwrap().is_object());
        assert!(matches!(
            parse_tool_args("[]"),
            Err(CliError::InvalidArguments(_))
        ));
        assert!(matches!(
            parse_tool_args("{oops"),
            Err(CliError::InvalidArguments(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_tool_maps_to_cli_error() {
        let temp_dir = TempDir::new().unwrap();
        let config = ServiceConfig {
            base_dir: Some(temp_dir.path().to_path_buf()),
            ..Default::default()
        };
        let service = SlideKitService::new(config).await.unwrap();

        let ok = execute_call(
            &service,
            CallArgs {
                tool: "create_presentation".to_string(),
                args: "{}".to_string(),
            },
        )
        .await;
        assert!(ok.is_ok());

        let err = execute_call(
            &service,
            CallArgs {
                tool: "open_presentation".to_string(),
                args: r#"{"file_path": "../../etc/passwd"}"#.to_string(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
