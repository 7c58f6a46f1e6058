//! CLI-specific error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Service error: {0}")]
    Service(#[from] slidekit::ServiceError),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool '{tool}' failed: {message}")]
    ToolFailed { tool: String, message: String },

    #[error("Server error: {0}")]
    Server(String),
}

impl CliError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::InvalidArguments(_) => 2,
            CliError::ToolFailed { .. } => 3,
            CliError::Io(_) | CliError::Service(_) | CliError::Server(_) => 1,
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Config("x".to_string()).exit_code(), 2);
        assert_eq!(
            CliError::ToolFailed {
                tool: "add_slide".to_string(),
                message: "nope".to_string()
            }
            .exit_code(),
            3
        );
        assert_eq!(CliError::Server("bind".to_string()).exit_code(), 1);
    }
}
