//! Tool argument types

use crate::connections::DEFAULT_CONNECTION;
use crate::document::CorePropertiesUpdate;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::LazyLock;
use validator::{Validate, ValidationError};

static BUCKET_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-z0-9][a-z0-9.-]{1,61}[a-z0-9]$").expect("Invalid bucket name regex")
});

pub const DEFAULT_MAX_KEYS: usize = 100;

fn default_connection() -> String {
    DEFAULT_CONNECTION.to_string()
}

fn default_max_keys() -> usize {
    DEFAULT_MAX_KEYS
}

fn validate_bucket_name(name: &str) -> Result<(), ValidationError> {
    if BUCKET_NAME_REGEX.is_match(name) && !name.contains("..") {
        return Ok(());
    }
    let mut err = ValidationError::new("bucket_name");
    err.message = Some(
        "must be 3-63 characters of lowercase letters, digits, '.' or '-', starting and ending with a letter or digit"
            .into(),
    );
    Err(err)
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreatePresentationArgs {
    pub aspect_ratio: Option<String>,
    #[validate(length(min = 1, max = 128))]
    pub id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct OpenPresentationArgs {
    #[validate(length(min = 1))]
    pub file_path: String,
    #[validate(length(min = 1, max = 128))]
    pub id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SavePresentationArgs {
    #[validate(length(min = 1))]
    pub file_path: String,
    pub presentation_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TemplateArgs {
    #[validate(length(min = 1))]
    pub template_path: String,
    #[validate(length(min = 1, max = 128))]
    pub id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TemplateInfoArgs {
    #[validate(length(min = 1))]
    pub template_path: String,
}

/// Arguments naming a presentation; `None` selects the current one
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PresentationRef {
    pub presentation_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct SetCorePropertiesArgs {
    pub presentation_id: Option<String>,
    #[serde(flatten)]
    pub properties: CorePropertiesUpdate,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct AddSlideArgs {
    pub presentation_id: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub body: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SwitchPresentationArgs {
    #[validate(length(min = 1))]
    pub presentation_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ConfigureConnectionArgs {
    #[validate(length(min = 1, max = 64))]
    pub connection_name: String,
    /// Omit for AWS; `memory://` (optionally `memory://bucket,...`) selects the in-process store
    pub endpoint_url: Option<String>,
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub secret_key: String,
    pub region: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UploadArgs {
    #[validate(custom(function = "validate_bucket_name"))]
    pub bucket_name: String,
    #[validate(length(min = 1, max = 1024))]
    pub object_key: String,
    #[serde(default = "default_connection")]
    pub connection_name: String,
    pub presentation_id: Option<String>,
    pub metadata: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DownloadArgs {
    #[validate(custom(function = "validate_bucket_name"))]
    pub bucket_name: String,
    #[validate(length(min = 1, max = 1024))]
    pub object_key: String,
    #[serde(default = "default_connection")]
    pub connection_name: String,
    #[validate(length(min = 1, max = 128))]
    pub id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ListObjectsArgs {
    #[validate(custom(function = "validate_bucket_name"))]
    pub bucket_name: String,
    #[serde(default = "default_connection")]
    pub connection_name: String,
    pub prefix: Option<String>,
    #[serde(default = "default_max_keys")]
    #[validate(range(min = 1, max = 1000))]
    pub max_keys: usize,
}

/// Arguments for tools that address a single object
#[derive(Debug, Deserialize, Validate)]
pub struct ObjectArgs {
    #[validate(custom(function = "validate_bucket_name"))]
    pub bucket_name: String,
    #[validate(length(min = 1, max = 1024))]
    pub object_key: String,
    #[serde(default = "default_connection")]
    pub connection_name: String,
}
