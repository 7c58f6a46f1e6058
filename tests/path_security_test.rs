//! Path sanitization against a real directory tree
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use slidekit::{sanitize_path, PathSecurityError};
use std::fs;
use tempfile::TempDir;

fn base() -> (TempDir, std::path::PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let canonical = temp_dir.path().canonicalize().unwrap();
    (temp_dir, canonical)
}

#[test]
fn test_relative_paths_stay_inside_base() {
    let (_guard, base) = base();
    fs::create_dir_all(base.join("decks")).unwrap();

    let resolved = sanitize_path("decks/q3.pptx", Some(&base), false).unwrap();
    assert_eq!(resolved, base.join("decks").join("q3.pptx"));

    let resolved = sanitize_path("decks/../notes/./plan.pptx", Some(&base), false).unwrap();
    assert_eq!(resolved, base.join("notes").join("plan.pptx"));
}

#[test]
fn test_escaping_paths_are_rejected() {
    let (_guard, base) = base();

    for attempt in ["../outside.pptx", "a/../../outside.pptx", "../../../../etc/passwd"] {
        match sanitize_path(attempt, Some(&base), false) {
            Err(PathSecurityError::PathTraversal { input, .. }) => assert_eq!(input, attempt),
            other => panic!("expected traversal error for {}: {:?}", attempt, other),
        }
    }
}

#[test]
fn test_absolute_path_is_rerooted_when_not_allowed() {
    let (_guard, base) = base();

    let resolved = sanitize_path("/var/tmp/report.pptx", Some(&base), false).unwrap();
    assert_eq!(resolved, base.join("report.pptx"));
}

#[test]
fn test_absolute_path_passes_when_allowed() {
    let (_guard, base) = base();
    let (_other_guard, other) = self::base();
    let target = other.join("report.pptx");

    let resolved = sanitize_path(target.to_str().unwrap(), Some(&base), true).unwrap();
    assert_eq!(resolved, target);
}

#[cfg(unix)]
#[test]
fn test_symlink_escape_is_rejected() {
    let (_guard, base) = base();
    let (_outside_guard, outside) = self::base();
    std::os::unix::fs::symlink(&outside, base.join("link")).unwrap();

    let result = sanitize_path("link/secret.pptx", Some(&base), false);
    assert!(matches!(result, Err(PathSecurityError::PathTraversal { .. })));
}

#[cfg(unix)]
#[tokio::test]
async fn test_save_through_dangling_symlink_is_refused() {
    use serde_json::json;
    use slidekit::tools::PathPolicy;
    use slidekit::{ConnectionRegistry, ToolSession};

    let (_guard, base) = base();
    let (_outside_guard, outside) = self::base();
    let planted = outside.join("planted.pptx");
    std::os::unix::fs::symlink(&planted, base.join("deck.pptx")).unwrap();

    let mut session = ToolSession::new(
        PathPolicy {
            base_dir: Some(base.clone()),
            allow_absolute: false,
        },
        ConnectionRegistry::new(),
    );
    session.call_tool("create_presentation", json!({})).await;
    let result = session
        .call_tool("save_presentation", json!({"file_path": "deck.pptx"}))
        .await;

    let message = result["error"].as_str().unwrap();
    assert!(message.contains("Path traversal detected"), "{}", message);
    assert!(!planted.exists());
}

#[test]
fn test_default_base_rejects_traversal() {
    let cwd = std::env::current_dir().unwrap().canonicalize().unwrap();
    assert_eq!(sanitize_path("", None, false).unwrap(), cwd);

    let result = sanitize_path("../../../../etc/passwd", None, false);
    assert!(matches!(result, Err(PathSecurityError::PathTraversal { .. })));
}

#[test]
fn test_error_message_names_both_paths() {
    let (_guard, base) = base();
    let err = sanitize_path("../x.pptx", Some(&base), false).unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Path traversal detected: '../x.pptx'"));
    assert!(message.contains(&base.display().to_string()));
}
