//! Path security utilities to prevent directory traversal attacks

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PathSecurityError {
    #[error(
        "Path traversal detected: '{input}' resolves to '{}' which is outside the allowed directory '{}'",
        .resolved.display(),
        .base.display()
    )]
    PathTraversal {
        input: String,
        resolved: PathBuf,
        base: PathBuf,
    },

    #[error("Path canonicalization failed: {0}")]
    CanonicalizationFailed(String),
}

/// Resolve `.` and `..` components of `tail` on top of an already absolute `root`
/// This function does not access the filesystem and works on non-existent paths
fn normalize_onto(root: PathBuf, tail: &Path) -> PathBuf {
    let mut result = root;
    for component in tail.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                result.push(component);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                // Popping past the filesystem root keeps the root
                result.pop();
            }
            Component::Normal(s) => {
                result.push(s);
            }
        }
    }
    result
}

/// Symlink hops followed through dangling links before giving up
const MAX_SYMLINK_HOPS: usize = 40;

/// Canonicalize an absolute path that may not exist yet.
///
/// The longest existing ancestor is canonicalized through the filesystem, which
/// resolves symlinks. A dangling symlink counts as present: its target is read
/// and resolved in turn, so a link to a not-yet-created file outside the base
/// still resolves outside it. The remaining components do not exist and are
/// normalized lexically.
pub fn canonicalize_lenient(path: &Path) -> Result<PathBuf, PathSecurityError> {
    resolve_lenient(path, 0)
}

fn resolve_lenient(path: &Path, hops: usize) -> Result<PathBuf, PathSecurityError> {
    for ancestor in path.ancestors() {
        if ancestor.as_os_str().is_empty() {
            continue;
        }
        let Ok(metadata) = ancestor.symlink_metadata() else {
            continue;
        };
        let rest = path.strip_prefix(ancestor).unwrap_or(Path::new(""));

        if metadata.file_type().is_symlink() && !ancestor.exists() {
            if hops >= MAX_SYMLINK_HOPS {
                return Err(PathSecurityError::CanonicalizationFailed(format!(
                    "Too many levels of symbolic links at '{}'",
                    ancestor.display()
                )));
            }
            let target = std::fs::read_link(ancestor).map_err(|e| {
                PathSecurityError::CanonicalizationFailed(format!(
                    "Failed to read symlink '{}': {}",
                    ancestor.display(),
                    e
                ))
            })?;
            let target = match ancestor.parent() {
                Some(parent) if target.is_relative() => parent.join(target),
                _ => target,
            };
            return resolve_lenient(&target.join(rest), hops + 1);
        }

        let canonical = ancestor.canonicalize().map_err(|e| {
            PathSecurityError::CanonicalizationFailed(format!(
                "Failed to canonicalize '{}': {}",
                ancestor.display(),
                e
            ))
        })?;

        return Ok(normalize_onto(canonical, rest));
    }

    // Nothing exists (not even the root); fall back to a purely lexical result
    Ok(normalize_onto(PathBuf::new(), path))
}

/// Sanitize a user-supplied file path against a base directory.
///
/// - `base_dir` defaults to the current working directory.
/// - With `allow_absolute`, an absolute input is canonicalized and returned
///   without any containment check.
/// - Without it, an absolute input keeps only its final segment, re-rooted under
///   `base_dir`: `/tmp/deck.pptx` becomes `<base_dir>/deck.pptx` instead of an error.
/// - Everything else is joined to `base_dir`, canonicalized, and must stay
///   within it.
pub fn sanitize_path(
    raw_path: &str,
    base_dir: Option<&Path>,
    allow_absolute: bool,
) -> Result<PathBuf, PathSecurityError> {
    let base = match base_dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().map_err(|e| {
            PathSecurityError::CanonicalizationFailed(format!(
                "Failed to get current directory: {}",
                e
            ))
        })?,
    };
    let base = if base.is_absolute() {
        base
    } else {
        std::env::current_dir()
            .map_err(|e| {
                PathSecurityError::CanonicalizationFailed(format!(
                    "Failed to get current directory: {}",
                    e
                ))
            })?
            .join(base)
    };
    let base_path = canonicalize_lenient(&base)?;

    let requested = Path::new(raw_path);

    if allow_absolute && requested.is_absolute() {
        return canonicalize_lenient(requested);
    }

    let candidate = if requested.is_absolute() {
        match requested.components().next_back() {
            Some(Component::Normal(name)) => base_path.join(name),
            Some(Component::ParentDir) => base_path.join(".."),
            _ => base_path.clone(),
        }
    } else {
        base_path.join(requested)
    };

    let resolved = canonicalize_lenient(&candidate)?;

    if !resolved.starts_with(&base_path) {
        return Err(PathSecurityError::PathTraversal {
            input: raw_path.to_string(),
            resolved,
            base: base_path,
        });
    }

    Ok(resolved)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn canonical_root(temp_dir: &TempDir) -> PathBuf {
        temp_dir.path().canonicalize().unwrap()
    }

    #[test]
    fn test_relative_path_resolves_under_base() {
        let temp_dir = TempDir::new().unwrap();
        let root = canonical_root(&temp_dir);

        let resolved = sanitize_path("templates/test.pptx", Some(temp_dir.path()), false).unwrap();
        assert_eq!(resolved, root.join("templates").join("test.pptx"));
    }

    #[test]
    fn test_empty_path_resolves_to_base() {
        let temp_dir = TempDir::new().unwrap();
        let resolved = sanitize_path("", Some(temp_dir.path()), false).unwrap();
        assert_eq!(resolved, canonical_root(&temp_dir));
    }

    #[test]
    fn test_parent_segments_are_rejected_at_any_depth() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("a").join("b");
        fs::create_dir_all(&base).unwrap();

        for depth in 1..6 {
            let raw = vec![".."; depth].join("/");
            let result = sanitize_path(&raw, Some(&base), false);
            assert!(
                matches!(result, Err(PathSecurityError::PathTraversal { .. })),
                "'{}' should be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_traversal_after_relative_prefix_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let result = sanitize_path("templates/../../../etc/passwd", Some(temp_dir.path()), false);
        assert!(matches!(result, Err(PathSecurityError::PathTraversal { .. })));
    }

    #[test]
    fn test_traversal_through_existing_directory_rejected() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("templates")).unwrap();

        let result = sanitize_path("templates/../../escape.pptx", Some(temp_dir.path()), false);
        assert!(matches!(result, Err(PathSecurityError::PathTraversal { .. })));
    }

    #[test]
    fn test_dot_dot_that_stays_inside_is_allowed() {
        let temp_dir = TempDir::new().unwrap();
        let root = canonical_root(&temp_dir);

        let resolved =
            sanitize_path("templates/../decks/q3.pptx", Some(temp_dir.path()), false).unwrap();
        assert_eq!(resolved, root.join("decks").join("q3.pptx"));
    }

    #[test]
    fn test_absolute_path_reroots_filename_when_not_allowed() {
        let temp_dir = TempDir::new().unwrap();
        let root = canonical_root(&temp_dir);

        let resolved = sanitize_path("/tmp/test.pptx", Some(temp_dir.path()), false).unwrap();
        assert_eq!(resolved, root.join("test.pptx"));
    }

    #[test]
    fn test_absolute_path_kept_when_allowed() {
        let temp_dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let target = outside.path().join("deck.pptx");

        let resolved =
            sanitize_path(target.to_str().unwrap(), Some(temp_dir.path()), true).unwrap();
        assert_eq!(resolved, canonical_root(&outside).join("deck.pptx"));
    }

    #[test]
    fn test_traversal_error_names_input_and_base() {
        let temp_dir = TempDir::new().unwrap();
        let err = sanitize_path("../outside.pptx", Some(temp_dir.path()), false).unwrap_err();
        let message = err.to_string();

        assert!(message.contains("../outside.pptx"));
        assert!(message.contains(&canonical_root(&temp_dir).display().to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), temp_dir.path().join("link")).unwrap();

        let result = sanitize_path("link/secret.pptx", Some(temp_dir.path()), false);
        assert!(matches!(result, Err(PathSecurityError::PathTraversal { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_escape_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let planted = outside.path().join("planted.pptx");
        std::os::unix::fs::symlink(&planted, temp_dir.path().join("deck.pptx")).unwrap();

        let result = sanitize_path("deck.pptx", Some(temp_dir.path()), false);
        match result {
            Err(PathSecurityError::PathTraversal { resolved, .. }) => {
                assert_eq!(resolved, canonical_root(&outside).join("planted.pptx"));
            }
            other => panic!("expected traversal error, got {:?}", other),
        }
        assert!(!planted.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_relative_symlink_inside_base_allowed() {
        let temp_dir = TempDir::new().unwrap();
        let root = canonical_root(&temp_dir);
        fs::create_dir_all(temp_dir.path().join("decks")).unwrap();
        std::os::unix::fs::symlink("decks/latest.pptx", temp_dir.path().join("current.pptx"))
            .unwrap();

        let resolved = sanitize_path("current.pptx", Some(temp_dir.path()), false).unwrap();
        assert_eq!(resolved, root.join("decks").join("latest.pptx"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_loop_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        std::os::unix::fs::symlink(temp_dir.path().join("b"), temp_dir.path().join("a")).unwrap();
        std::os::unix::fs::symlink(temp_dir.path().join("a"), temp_dir.path().join("b")).unwrap();

        let result = sanitize_path("a/deck.pptx", Some(temp_dir.path()), false);
        assert!(matches!(result, Err(PathSecurityError::CanonicalizationFailed(_))));
    }

    #[test]
    fn test_default_base_is_working_directory() {
        let cwd = std::env::current_dir().unwrap().canonicalize().unwrap();

        let resolved = sanitize_path("", None, false).unwrap();
        assert_eq!(resolved, cwd);

        if cwd.components().count() > 1 {
            let result = sanitize_path("../../../../etc/passwd", None, false);
            assert!(matches!(result, Err(PathSecurityError::PathTraversal { .. })));
        }
    }

    #[test]
    fn test_canonicalize_lenient_handles_missing_tail() {
        let temp_dir = TempDir::new().unwrap();
        let root = canonical_root(&temp_dir);

        let resolved = canonicalize_lenient(&temp_dir.path().join("x/./y/../z.pptx")).unwrap();
        assert_eq!(resolved, root.join("x").join("z.pptx"));
    }
}
