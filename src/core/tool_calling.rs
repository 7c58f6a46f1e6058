//! Tool calling service implementation

use crate::core::service::ServiceError;
use crate::tools::{Tool, ToolSession};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableTool {
    pub name: String,
    pub description: String,
}

impl From<Tool> for AvailableTool {
    fn from(tool: Tool) -> Self {
        Self {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
        }
    }
}

#[async_trait]
pub trait ToolCallingService: Send + Sync {
    async fn get_available_tools(&self) -> Result<Vec<AvailableTool>, ServiceError>;

    /// Run a tool; the returned object holds either success fields or `error`
    async fn call_tool(&self, name: &str, arguments: Value) -> Value;

    /// Names of the configured storage connections
    async fn connection_names(&self) -> Vec<String>;
}

/// Serializes all tool calls through one session
pub struct ToolCallingServiceImpl {
    session: Mutex<ToolSession>,
}

impl ToolCallingServiceImpl {
    pub fn new(session: ToolSession) -> Self {
        Self {
            session: Mutex::new(session),
        }
    }
}

#[async_trait]
impl ToolCallingService for ToolCallingServiceImpl {
    async fn get_available_tools(&self) -> Result<Vec<AvailableTool>, ServiceError> {
        Ok(Tool::ALL.into_iter().map(AvailableTool::from).collect())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Value {
        let mut session = self.session.lock().await;
        session.call_tool(name, arguments).await
    }

    async fn connection_names(&self) -> Vec<String> {
        self.session.lock().await.connections().names()
    }
}
