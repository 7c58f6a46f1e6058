//! End-to-end tool session workflows
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use serde_json::{json, Value};
use slidekit::tools::PathPolicy;
use slidekit::{ConnectionRegistry, MemoryObjectStore, Tool, ToolSession};
use std::sync::Arc;
use tempfile::TempDir;

fn session(temp_dir: &TempDir) -> ToolSession {
    let mut registry = ConnectionRegistry::new();
    registry.register(
        "default",
        Arc::new(MemoryObjectStore::with_buckets(["decks"])),
    );
    ToolSession::new(
        PathPolicy {
            base_dir: Some(temp_dir.path().canonicalize().unwrap()),
            allow_absolute: false,
        },
        registry,
    )
}

/// A result is either a failure carrying only `error`, or carries no `error` at all
fn assert_well_formed(tool: &str, result: &Value) {
    let object = result
        .as_object()
        .unwrap_or_else(|| panic!("{} returned a non-object: {}", tool, result));
    if let Some(error) = object.get("error") {
        assert!(error.is_string(), "{}: {}", tool, result);
        assert_eq!(object.len(), 1, "{} mixed error and data: {}", tool, result);
    }
}

#[tokio::test]
async fn test_every_tool_result_is_well_formed() {
    let temp_dir = TempDir::new().unwrap();
    let mut session = session(&temp_dir);

    // Each tool once with no arguments, before anything exists
    for tool in Tool::ALL {
        let result = session.call_tool(tool.name(), json!({})).await;
        assert_well_formed(tool.name(), &result);
    }

    // And again with a presentation loaded
    session
        .call_tool("create_presentation", json!({"id": "deck"}))
        .await;
    for tool in Tool::ALL {
        let result = session.call_tool(tool.name(), Value::Null).await;
        assert_well_formed(tool.name(), &result);
    }
}

#[tokio::test]
async fn test_author_save_upload_download_cycle() {
    let temp_dir = TempDir::new().unwrap();
    let mut session = session(&temp_dir);

    let created = session
        .call_tool("create_presentation", json!({"aspect_ratio": "16:10"}))
        .await;
    assert_eq!(created["presentation_id"], "presentation_1");
    assert_eq!(created["aspect_ratio"], "Widescreen (16:10)");

    session
        .call_tool("add_slide", json!({"title": "Kickoff", "body": ["Goals", "Owners"]}))
        .await;
    session
        .call_tool(
            "set_core_properties",
            json!({"title": "Kickoff deck", "author": "PMO"}),
        )
        .await;

    let saved = session
        .call_tool("save_presentation", json!({"file_path": "kickoff.pptx"}))
        .await;
    assert!(saved.get("error").is_none(), "{}", saved);
    assert!(temp_dir.path().join("kickoff.pptx").exists());

    let uploaded = session
        .call_tool(
            "upload_presentation_to_s3",
            json!({
                "bucket_name": "decks",
                "object_key": "2024/kickoff.pptx",
                "metadata": {"team": "pmo"}
            }),
        )
        .await;
    assert_eq!(uploaded["success"], true, "{}", uploaded);
    assert_eq!(uploaded["presentation_id"], "presentation_1");

    let head = session
        .call_tool(
            "get_s3_presentation_info",
            json!({"bucket_name": "decks", "object_key": "2024/kickoff.pptx"}),
        )
        .await;
    assert_eq!(head["metadata"]["team"], "pmo");
    assert_eq!(head["size_bytes"], uploaded["size_bytes"]);

    let downloaded = session
        .call_tool(
            "download_presentation_from_s3",
            json!({"bucket_name": "decks", "object_key": "2024/kickoff.pptx"}),
        )
        .await;
    assert_eq!(downloaded["presentation_id"], "presentation_2");
    assert_eq!(downloaded["slide_count"], 1);

    let info = session
        .call_tool("get_presentation_info", json!({}))
        .await;
    assert_eq!(info["presentation_id"], "presentation_2");
    assert_eq!(info["core_properties"]["title"], "Kickoff deck");
    assert_eq!(info["slide_titles"], json!(["Kickoff"]));

    let listed = session.call_tool("list_presentations", json!({})).await;
    assert_eq!(listed["total_presentations"], 2);
    assert_eq!(listed["current_presentation_id"], "presentation_2");
}

#[tokio::test]
async fn test_argument_validation_errors() {
    let temp_dir = TempDir::new().unwrap();
    let mut session = session(&temp_dir);
    session.call_tool("create_presentation", json!({})).await;

    let bad_bucket = session
        .call_tool(
            "upload_presentation_to_s3",
            json!({"bucket_name": "Not_A_Bucket", "object_key": "a.pptx"}),
        )
        .await;
    assert!(bad_bucket["error"].is_string());

    let missing_key = session
        .call_tool("delete_s3_presentation", json!({"bucket_name": "decks"}))
        .await;
    assert!(missing_key["error"].as_str().unwrap().contains("object_key"));

    let too_many = session
        .call_tool(
            "list_s3_presentations",
            json!({"bucket_name": "decks", "max_keys": 0}),
        )
        .await;
    assert!(too_many["error"].is_string());
}

#[tokio::test]
async fn test_unknown_tool_and_missing_presentation() {
    let temp_dir = TempDir::new().unwrap();
    let mut session = session(&temp_dir);

    let unknown = session.call_tool("render_video", json!({})).await;
    assert!(unknown["error"].as_str().unwrap().contains("render_video"));

    let no_deck = session
        .call_tool(
            "upload_presentation_to_s3",
            json!({"bucket_name": "decks", "object_key": "a.pptx"}),
        )
        .await;
    assert_eq!(
        no_deck["error"],
        "No presentation is currently loaded or the specified ID is invalid"
    );
}

#[tokio::test]
async fn test_configured_connection_shadows_default() {
    let temp_dir = TempDir::new().unwrap();
    let mut session = session(&temp_dir);
    session.call_tool("create_presentation", json!({})).await;

    let configured = session
        .call_tool(
            "configure_s3_connection",
            json!({"connection_name": "default", "endpoint_url": "memory://fresh"}),
        )
        .await;
    assert_eq!(configured["success"], true);

    // The replacement store has no "decks" bucket
    let uploaded = session
        .call_tool(
            "upload_presentation_to_s3",
            json!({"bucket_name": "decks", "object_key": "a.pptx"}),
        )
        .await;
    assert!(uploaded["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to upload presentation: "));

    let uploaded = session
        .call_tool(
            "upload_presentation_to_s3",
            json!({"bucket_name": "fresh", "object_key": "a.pptx"}),
        )
        .await;
    assert_eq!(uploaded["success"], true);
}
