//! Status endpoint handler

use crate::core::service::SlideKitService;
use crate::http::errors::HttpResult;
use crate::http::models::{ApiResponse, StatusResponse};
use axum::extract::State;
use std::sync::Arc;
use std::time::SystemTime;

/// Shared state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SlideKitService>,
    pub start_time: SystemTime,
}

impl AppState {
    pub fn new(service: Arc<SlideKitService>) -> Self {
        Self {
            service,
            start_time: SystemTime::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(self.start_time)
            .unwrap_or_default()
            .as_secs()
    }
}

/// GET /api/status - Service status endpoint
pub async fn status(
    State(state): State<AppState>,
) -> HttpResult<axum::Json<ApiResponse<StatusResponse>>> {
    let tool_service = state.service.tool_service();
    let tools = tool_service.get_available_tools().await?;
    let connections = tool_service.connection_names().await;

    let config = state.service.config();

    let response = StatusResponse {
        status: "running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        tools_count: tools.len(),
        connections,
        base_dir: config
            .base_dir
            .as_ref()
            .map(|dir| dir.to_string_lossy().to_string()),
        allow_absolute_paths: config.allow_absolute_paths,
        uptime_seconds: state.uptime_seconds(),
    };

    Ok(axum::Json(ApiResponse::success(response)))
}
