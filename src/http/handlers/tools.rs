//! Tool endpoints

use crate::http::errors::{HttpError, HttpResult};
use crate::http::handlers::AppState;
use crate::http::models::{ApiResponse, ToolListResponse};
use crate::tools::Tool;
use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use tracing::info;

/// GET /tools - List tools with their descriptions
pub async fn list_tools(
    State(state): State<AppState>,
) -> HttpResult<Json<ApiResponse<ToolListResponse>>> {
    let tools = state.service.tool_service().get_available_tools().await?;
    let count = tools.len();
    Ok(Json(ApiResponse::success(ToolListResponse { tools, count })))
}

/// POST /tools/:name - Run a tool with a JSON object body.
///
/// Tool failures are part of the result map (`{"error": "..."}`) and come back
/// with 200; only unknown tools and unreadable bodies are HTTP errors.
pub async fn call_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> HttpResult<Json<Value>> {
    if Tool::from_name(&name).is_none() {
        return Err(HttpError::NotFound(format!("Unknown tool: {}", name)));
    }

    let arguments = parse_arguments(&body)?;
    info!("POST /tools/{}", name);

    let result = state
        .service
        .tool_service()
        .call_tool(&name, arguments)
        .await;
    Ok(Json(result))
}

/// An empty body means no arguments; anything else must be a JSON object
fn parse_arguments(body: &[u8]) -> Result<Value, HttpError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(serde_json::Map::new()));
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => Err(HttpError::BadRequest(
            "Tool arguments must be a JSON object".to_string(),
        )),
        Err(e) => Err(HttpError::BadRequest(format!("Invalid JSON body: {}", e))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arguments() {
        assert_eq!(parse_arguments(b"").unwrap(), serde_json::json!({}));
        assert_eq!(parse_arguments(b"  \n").unwrap(), serde_json::json!({}));
        assert!(parse_arguments(br#"{"id": "a"}"#).is_ok());
        assert!(parse_arguments(b"[1, 2]").is_err());
        assert!(parse_arguments(b"{not json").is_err());
    }
}
