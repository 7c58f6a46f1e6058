//! Object storage tools

use super::args::{ConfigureConnectionArgs, DownloadArgs, ListObjectsArgs, ObjectArgs, UploadArgs};
use super::{object_with, ToolError, ToolSession};
use crate::connections::{self, ConnectionConfig};
use crate::document::Presentation;
use crate::transfer::{self, DownloadResult};
use serde_json::{json, Value};
use tracing::info;

impl ToolSession {
    pub(super) async fn configure_connection(
        &mut self,
        args: ConfigureConnectionArgs,
    ) -> Result<Value, ToolError> {
        let config = ConnectionConfig {
            endpoint_url: args.endpoint_url.filter(|url| !url.is_empty()),
            access_key: args.access_key,
            secret_key: args.secret_key,
            region: args.region,
        };
        let store = connections::connect(&config).await?;
        if self.connections.register(args.connection_name.clone(), store) {
            info!("Replaced S3 connection '{}'", args.connection_name);
        }

        Ok(json!({
            "success": true,
            "connection_name": args.connection_name,
            "endpoint_url": config.endpoint_url,
            "region": config.region_or_default(),
            "message": format!("S3 connection '{}' configured successfully", args.connection_name),
        }))
    }

    pub(super) fn list_connections(&self) -> Value {
        json!({
            "connections": self.connections.names(),
            "count": self.connections.len(),
        })
    }

    pub(super) async fn upload(&self, args: UploadArgs) -> Result<Value, ToolError> {
        let store = self.connections.get(&args.connection_name)?;
        let id = self.resolve_id(args.presentation_id.as_deref())?;
        let presentation = self.presentation_ref(&id)?;

        let result = transfer::upload_document(
            store.as_ref(),
            presentation,
            &args.bucket_name,
            &args.object_key,
            args.metadata,
        )
        .await?;

        object_with(
            &result,
            json!({ "presentation_id": id, "connection_name": args.connection_name }),
        )
    }

    pub(super) async fn download(&mut self, args: DownloadArgs) -> Result<Value, ToolError> {
        let store = self.connections.get(&args.connection_name)?;
        let DownloadResult {
            document,
            bucket,
            key,
            slide_count,
            size_bytes,
        } = transfer::download_document::<Presentation>(
            store.as_ref(),
            &args.bucket_name,
            &args.object_key,
        )
        .await?;

        let id = self.insert_presentation(args.id, document);

        Ok(json!({
            "success": true,
            "presentation_id": id,
            "bucket": bucket,
            "key": key,
            "connection_name": args.connection_name,
            "slide_count": slide_count,
            "size_bytes": size_bytes,
            "message": format!("Successfully downloaded presentation from s3://{}/{}", bucket, key),
        }))
    }

    pub(super) async fn list_objects(&self, args: ListObjectsArgs) -> Result<Value, ToolError> {
        let store = self.connections.get(&args.connection_name)?;
        let listing = transfer::list_objects(
            store.as_ref(),
            &args.bucket_name,
            args.prefix.as_deref(),
            args.max_keys,
        )
        .await?;

        object_with(&listing, json!({ "connection_name": args.connection_name }))
    }

    pub(super) async fn delete_object(&self, args: ObjectArgs) -> Result<Value, ToolError> {
        let store = self.connections.get(&args.connection_name)?;
        let result =
            transfer::delete_object(store.as_ref(), &args.bucket_name, &args.object_key).await?;

        object_with(&result, json!({ "connection_name": args.connection_name }))
    }

    pub(super) async fn head_object(&self, args: ObjectArgs) -> Result<Value, ToolError> {
        let store = self.connections.get(&args.connection_name)?;
        let info =
            transfer::head_object(store.as_ref(), &args.bucket_name, &args.object_key).await?;

        object_with(&info, json!({ "connection_name": args.connection_name }))
    }
}
