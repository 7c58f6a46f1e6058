//! Remote-callable tools
//!
//! A [`ToolSession`] owns the open presentations, the connection registry and
//! the path policy for one caller. [`ToolSession::call_tool`] takes JSON
//! arguments and always answers with a JSON object holding either the tool's
//! success fields or a single `error` string.

pub mod args;
mod presentation;
mod storage;

use crate::connections::ConnectionRegistry;
use crate::document::{DocumentError, Presentation};
use crate::security::PathSecurityError;
use crate::transfer::{ErrorKind, TransferError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use validator::Validate;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{0}")]
    PresentationNotFound(String),

    #[error(transparent)]
    Path(#[from] PathSecurityError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Failed to render result: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ToolError {
    /// Transfer error kind, for failures that have one
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ToolError::Path(_) => Some(ErrorKind::PathTraversal),
            ToolError::Transfer(err) => Some(err.kind()),
            _ => None,
        }
    }

    /// Whether the message is already self-explanatory without the tool's failure prefix
    fn is_self_describing(&self) -> bool {
        matches!(
            self,
            ToolError::UnknownTool(_)
                | ToolError::InvalidArguments(_)
                | ToolError::PresentationNotFound(_)
                | ToolError::Path(PathSecurityError::PathTraversal { .. })
        ) || matches!(
            self.kind(),
            Some(ErrorKind::NotFound | ErrorKind::ConnectionNotConfigured)
        )
    }
}

/// Every tool a session can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    CreatePresentation,
    OpenPresentation,
    SavePresentation,
    CreatePresentationFromTemplate,
    GetTemplateInfo,
    GetPresentationInfo,
    SetCoreProperties,
    AddSlide,
    ListPresentations,
    SwitchPresentation,
    ConfigureS3Connection,
    ListS3Connections,
    UploadPresentationToS3,
    DownloadPresentationFromS3,
    ListS3Presentations,
    DeleteS3Presentation,
    GetS3PresentationInfo,
}

impl Tool {
    pub const ALL: [Tool; 17] = [
        Tool::CreatePresentation,
        Tool::OpenPresentation,
        Tool::SavePresentation,
        Tool::CreatePresentationFromTemplate,
        Tool::GetTemplateInfo,
        Tool::GetPresentationInfo,
        Tool::SetCoreProperties,
        Tool::AddSlide,
        Tool::ListPresentations,
        Tool::SwitchPresentation,
        Tool::ConfigureS3Connection,
        Tool::ListS3Connections,
        Tool::UploadPresentationToS3,
        Tool::DownloadPresentationFromS3,
        Tool::ListS3Presentations,
        Tool::DeleteS3Presentation,
        Tool::GetS3PresentationInfo,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tool::CreatePresentation => "create_presentation",
            Tool::OpenPresentation => "open_presentation",
            Tool::SavePresentation => "save_presentation",
            Tool::CreatePresentationFromTemplate => "create_presentation_from_template",
            Tool::GetTemplateInfo => "get_template_info",
            Tool::GetPresentationInfo => "get_presentation_info",
            Tool::SetCoreProperties => "set_core_properties",
            Tool::AddSlide => "add_slide",
            Tool::ListPresentations => "list_presentations",
            Tool::SwitchPresentation => "switch_presentation",
            Tool::ConfigureS3Connection => "configure_s3_connection",
            Tool::ListS3Connections => "list_s3_connections",
            Tool::UploadPresentationToS3 => "upload_presentation_to_s3",
            Tool::DownloadPresentationFromS3 => "download_presentation_from_s3",
            Tool::ListS3Presentations => "list_s3_presentations",
            Tool::DeleteS3Presentation => "delete_s3_presentation",
            Tool::GetS3PresentationInfo => "get_s3_presentation_info",
        }
    }

    pub fn from_name(name: &str) -> Option<Tool> {
        Tool::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            Tool::CreatePresentation => {
                "Create a new presentation. Args: aspect_ratio ('16:9', '4:3', '16:10', 'a4'), id"
            }
            Tool::OpenPresentation => "Open a presentation from a file. Args: file_path, id",
            Tool::SavePresentation => {
                "Save a presentation to a file. Args: file_path, presentation_id"
            }
            Tool::CreatePresentationFromTemplate => {
                "Create a presentation from a .pptx or .potx template. Args: template_path, id"
            }
            Tool::GetTemplateInfo => "Inspect a template file. Args: template_path",
            Tool::GetPresentationInfo => {
                "Get slide count, dimensions and core properties. Args: presentation_id"
            }
            Tool::SetCoreProperties => {
                "Set title, subject, author, keywords or comments. Args: presentation_id, title, subject, author, keywords, comments"
            }
            Tool::AddSlide => "Append a slide. Args: presentation_id, title, body",
            Tool::ListPresentations => "List presentations open in this session",
            Tool::SwitchPresentation => "Select the current presentation. Args: presentation_id",
            Tool::ConfigureS3Connection => {
                "Configure a named S3-compatible connection. Args: connection_name, endpoint_url, access_key, secret_key, region"
            }
            Tool::ListS3Connections => "List configured S3 connections",
            Tool::UploadPresentationToS3 => {
                "Upload a presentation to S3. Args: bucket_name, object_key, connection_name, presentation_id, metadata"
            }
            Tool::DownloadPresentationFromS3 => {
                "Download a presentation from S3 into the session. Args: bucket_name, object_key, connection_name, id"
            }
            Tool::ListS3Presentations => {
                "List objects in a bucket. Args: bucket_name, connection_name, prefix, max_keys (1-1000)"
            }
            Tool::DeleteS3Presentation => {
                "Delete an object from S3. Args: bucket_name, object_key, connection_name"
            }
            Tool::GetS3PresentationInfo => {
                "Get metadata for an object in S3. Args: bucket_name, object_key, connection_name"
            }
        }
    }

    /// Prefix for error messages that need context
    fn failure_context(self) -> &'static str {
        match self {
            Tool::CreatePresentation => "Failed to create presentation",
            Tool::OpenPresentation => "Failed to open presentation",
            Tool::SavePresentation => "Failed to save presentation",
            Tool::CreatePresentationFromTemplate => "Failed to create presentation from template",
            Tool::GetTemplateInfo => "Failed to get template info",
            Tool::GetPresentationInfo => "Failed to get presentation info",
            Tool::SetCoreProperties => "Failed to set core properties",
            Tool::AddSlide => "Failed to add slide",
            Tool::ListPresentations => "Failed to list presentations",
            Tool::SwitchPresentation => "Failed to switch presentation",
            Tool::ConfigureS3Connection => "Failed to configure S3 connection",
            Tool::ListS3Connections => "Failed to list S3 connections",
            Tool::UploadPresentationToS3 => "Failed to upload presentation",
            Tool::DownloadPresentationFromS3 => "Failed to download presentation",
            Tool::ListS3Presentations => "Failed to list S3 objects",
            Tool::DeleteS3Presentation => "Failed to delete S3 object",
            Tool::GetS3PresentationInfo => "Failed to get S3 object metadata",
        }
    }
}

/// Path handling for file-based tools
#[derive(Debug, Clone, Default)]
pub struct PathPolicy {
    /// `None` means the process working directory
    pub base_dir: Option<PathBuf>,
    pub allow_absolute: bool,
}

/// State of one tool caller
#[derive(Debug, Default)]
pub struct ToolSession {
    presentations: BTreeMap<String, Presentation>,
    current_id: Option<String>,
    connections: ConnectionRegistry,
    path_policy: PathPolicy,
}

impl ToolSession {
    pub fn new(path_policy: PathPolicy, connections: ConnectionRegistry) -> Self {
        Self {
            presentations: BTreeMap::new(),
            current_id: None,
            connections,
            path_policy,
        }
    }

    pub fn connections(&self) -> &ConnectionRegistry {
        &self.connections
    }

    pub fn connections_mut(&mut self) -> &mut ConnectionRegistry {
        &mut self.connections
    }

    pub fn path_policy(&self) -> &PathPolicy {
        &self.path_policy
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    pub fn presentation(&self, id: &str) -> Option<&Presentation> {
        self.presentations.get(id)
    }

    pub fn presentation_count(&self) -> usize {
        self.presentations.len()
    }

    /// Run a tool by name.
    ///
    /// Never fails: unknown tools, bad arguments and operation failures all
    /// come back as `{"error": "..."}`.
    pub async fn call_tool(&mut self, name: &str, arguments: Value) -> Value {
        let Some(tool) = Tool::from_name(name) else {
            let err = ToolError::UnknownTool(name.to_string());
            warn!("{}", err);
            return error_value(err.to_string());
        };

        debug!("Calling tool {}", name);
        match self.dispatch(tool, arguments).await {
            Ok(value) => value,
            Err(err) => {
                let message = if err.is_self_describing() {
                    err.to_string()
                } else {
                    format!("{}: {}", tool.failure_context(), err)
                };
                warn!("Tool {} failed: {}", name, message);
                error_value(message)
            }
        }
    }

    async fn dispatch(&mut self, tool: Tool, arguments: Value) -> Result<Value, ToolError> {
        match tool {
            Tool::CreatePresentation => self.create_presentation(parse_args(arguments)?),
            Tool::OpenPresentation => self.open_presentation(parse_args(arguments)?).await,
            Tool::SavePresentation => self.save_presentation(parse_args(arguments)?).await,
            Tool::CreatePresentationFromTemplate => {
                self.create_from_template(parse_args(arguments)?).await
            }
            Tool::GetTemplateInfo => self.get_template_info(parse_args(arguments)?).await,
            Tool::GetPresentationInfo => self.get_presentation_info(parse_args(arguments)?),
            Tool::SetCoreProperties => self.set_core_properties(parse_args(arguments)?),
            Tool::AddSlide => self.add_slide(parse_args(arguments)?),
            Tool::ListPresentations => Ok(self.list_presentations()),
            Tool::SwitchPresentation => self.switch_presentation(parse_args(arguments)?),
            Tool::ConfigureS3Connection => self.configure_connection(parse_args(arguments)?).await,
            Tool::ListS3Connections => Ok(self.list_connections()),
            Tool::UploadPresentationToS3 => self.upload(parse_args(arguments)?).await,
            Tool::DownloadPresentationFromS3 => self.download(parse_args(arguments)?).await,
            Tool::ListS3Presentations => self.list_objects(parse_args(arguments)?).await,
            Tool::DeleteS3Presentation => self.delete_object(parse_args(arguments)?).await,
            Tool::GetS3PresentationInfo => self.head_object(parse_args(arguments)?).await,
        }
    }

    fn sanitize(&self, raw_path: &str) -> Result<PathBuf, ToolError> {
        let base_dir = self.path_policy.base_dir.as_deref();
        Ok(crate::security::sanitize_path(
            raw_path,
            base_dir,
            self.path_policy.allow_absolute,
        )?)
    }

    /// Resolve an explicit id or fall back to the current presentation
    fn resolve_id(&self, requested: Option<&str>) -> Result<String, ToolError> {
        let id = requested.or(self.current_id.as_deref());
        match id {
            Some(id) if self.presentations.contains_key(id) => Ok(id.to_string()),
            _ => Err(ToolError::PresentationNotFound(
                "No presentation is currently loaded or the specified ID is invalid".to_string(),
            )),
        }
    }

    /// Store a presentation and make it current
    fn insert_presentation(&mut self, id: Option<String>, presentation: Presentation) -> String {
        let id = id.unwrap_or_else(|| self.next_id());
        self.presentations.insert(id.clone(), presentation);
        self.current_id = Some(id.clone());
        id
    }

    fn next_id(&self) -> String {
        let mut n = self.presentations.len() + 1;
        loop {
            let candidate = format!("presentation_{}", n);
            if !self.presentations.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Decode and validate tool arguments; a missing body counts as `{}`
fn parse_args<T>(arguments: Value) -> Result<T, ToolError>
where
    T: DeserializeOwned + Validate,
{
    let arguments = match arguments {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };
    let args: T = serde_json::from_value(arguments)
        .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
    args.validate()
        .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
    Ok(args)
}

/// Serialize a result struct into a JSON object and add extra fields to it
fn object_with<T: Serialize>(value: &T, extra: Value) -> Result<Value, ToolError> {
    let mut value = serde_json::to_value(value)?;
    if let (Value::Object(object), Value::Object(extra)) = (&mut value, extra) {
        object.extend(extra);
    }
    Ok(value)
}

fn error_value(message: String) -> Value {
    json!({ "error": message })
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}
