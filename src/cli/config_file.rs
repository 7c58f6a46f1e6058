//! Configuration file parsing for SlideKit CLI

use crate::cli::error::{CliError, CliResult};
use serde::{Deserialize, Serialize};
use slidekit::ConnectionConfig;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "slidekit.toml";

/// HTTP server section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfigToml {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default)]
    pub allowed_headers: Vec<String>,
}

/// Contents of slidekit.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlideKitConfig {
    /// Directory file-based tools are confined to; relative paths are
    /// resolved against the directory holding the config file
    #[serde(default)]
    pub base_dir: Option<PathBuf>,

    #[serde(default)]
    pub allow_absolute_paths: bool,

    /// Connection registered as `default`
    #[serde(default)]
    pub connection: Option<ConnectionConfig>,

    #[serde(default)]
    pub server: Option<ServerConfigToml>,
}

/// Find slidekit.toml in `start` or the nearest parent directory
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Parse a config file
pub fn load_config_from(path: &Path) -> CliResult<SlideKitConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CliError::Config(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let mut config: SlideKitConfig = toml::from_str(&content).map_err(|e| {
        CliError::Config(format!("Failed to parse {}: {}", path.display(), e))
    })?;

    if let (Some(base_dir), Some(parent)) = (&config.base_dir, path.parent()) {
        if base_dir.is_relative() {
            config.base_dir = Some(parent.join(base_dir));
        }
    }

    Ok(config)
}

/// Load slidekit.toml from the current directory or its parents
pub fn load_config() -> CliResult<Option<SlideKitConfig>> {
    let current_dir = std::env::current_dir()
        .map_err(|e| CliError::Config(format!("Failed to get current directory: {}", e)))?;

    find_config_file(&current_dir)
        .map(|path| load_config_from(&path))
        .transpose()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_walks_up() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();
        assert!(find_config_file(&nested).is_none());

        std::fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "").unwrap();
        assert_eq!(
            find_config_file(&nested).unwrap(),
            temp_dir.path().join(CONFIG_FILE_NAME)
        );
    }

    #[test]
    fn test_load_config_sections() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            r#"
base_dir = "decks"
allow_absolute_paths = true

[connection]
endpoint_url = "http://localhost:9000"
access_key = "minio"
secret_key = "minio123"

[server]
allowed_origins = ["http://localhost:3000"]
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.base_dir, Some(temp_dir.path().join("decks")));
        assert!(config.allow_absolute_paths);
        let connection = config.connection.unwrap();
        assert_eq!(connection.access_key, "minio");
        assert_eq!(connection.region_or_default(), "us-east-1");
        assert_eq!(config.server.unwrap().allowed_origins.len(), 1);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "base_dir = [").unwrap();
        assert!(matches!(load_config_from(&path), Err(CliError::Config(_))));
    }
}
