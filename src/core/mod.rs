//! Core service layer

pub mod service;
pub mod tool_calling;

pub use service::{HttpServerConfig, ServiceConfig, ServiceError, SlideKitService};
pub use tool_calling::{AvailableTool, ToolCallingService, ToolCallingServiceImpl};
