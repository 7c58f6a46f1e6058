//! Service configuration assembly for the CLI

use crate::cli::config_file::{self, SlideKitConfig};
use crate::cli::error::CliResult;
use slidekit::{ConnectionConfig, HttpServerConfig, ServiceConfig};
use std::env;
use std::path::PathBuf;
use tracing::debug;

/// Build the service configuration from slidekit.toml and the environment.
///
/// `config_path` overrides the upward search for slidekit.toml. Environment
/// variables win over file values.
pub fn create_service_config(config_path: Option<PathBuf>) -> CliResult<ServiceConfig> {
    let file_config = match config_path {
        Some(path) => Some(config_file::load_config_from(&path)?),
        None => config_file::load_config()?,
    };

    Ok(merge_config(file_config.unwrap_or_default(), |name| {
        env::var(name).ok()
    }))
}

/// Combine file settings with environment lookups
pub fn merge_config<F>(file: SlideKitConfig, lookup: F) -> ServiceConfig
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

    let base_dir = var("SLIDEKIT_BASE_DIR").map(PathBuf::from).or(file.base_dir);

    let mut connection = file.connection;
    if let (Some(access_key), Some(secret_key)) =
        (var("AWS_ACCESS_KEY_ID"), var("AWS_SECRET_ACCESS_KEY"))
    {
        let from_file = connection.take().unwrap_or_default();
        connection = Some(ConnectionConfig {
            access_key,
            secret_key,
            ..from_file
        });
    }
    if let Some(connection) = connection.as_mut() {
        if let Some(endpoint) = var("S3_ENDPOINT") {
            connection.endpoint_url = Some(endpoint);
        }
        if let Some(region) = var("AWS_REGION") {
            connection.region = Some(region);
        }
    }

    if let Some(connection) = &connection {
        debug!("Default connection configured: {:?}", connection);
    }

    let http_server = file.server.map(|server| HttpServerConfig {
        allowed_origins: server.allowed_origins,
        allowed_headers: server.allowed_headers,
    });

    ServiceConfig {
        base_dir,
        allow_absolute_paths: file.allow_absolute_paths,
        default_connection: connection,
        http_server,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_no_credentials_means_no_default_connection() {
        let config = merge_config(
            SlideKitConfig::default(),
            lookup(&[("S3_ENDPOINT", "http://minio:9000")]),
        );
        assert!(config.default_connection.is_none());
        assert!(config.base_dir.is_none());
    }

    #[test]
    fn test_env_credentials_build_default_connection() {
        let config = merge_config(
            SlideKitConfig::default(),
            lookup(&[
                ("AWS_ACCESS_KEY_ID", "AKIA"),
                ("AWS_SECRET_ACCESS_KEY", "secret"),
                ("S3_ENDPOINT", "http://minio:9000"),
            ]),
        );
        let connection = config.default_connection.unwrap();
        assert_eq!(connection.access_key, "AKIA");
        assert_eq!(connection.endpoint_url.as_deref(), Some("http://minio:9000"));
        assert_eq!(connection.region_or_default(), "us-east-1");
    }

    #[test]
    fn test_env_overrides_file() {
        let file = SlideKitConfig {
            base_dir: Some(PathBuf::from("/srv/decks")),
            connection: Some(ConnectionConfig {
                endpoint_url: Some("http://file:9000".to_string()),
                access_key: "file-key".to_string(),
                secret_key: "file-secret".to_string(),
                region: Some("eu-west-1".to_string()),
            }),
            ..Default::default()
        };
        let config = merge_config(
            file,
            lookup(&[("SLIDEKIT_BASE_DIR", "/tmp/decks"), ("AWS_REGION", "us-west-2")]),
        );

        assert_eq!(config.base_dir, Some(PathBuf::from("/tmp/decks")));
        let connection = config.default_connection.unwrap();
        assert_eq!(connection.access_key, "file-key");
        assert_eq!(connection.endpoint_url.as_deref(), Some("http://file:9000"));
        assert_eq!(connection.region.as_deref(), Some("us-west-2"));
    }
}
