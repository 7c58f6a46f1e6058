//! S3 object store (supports AWS S3 and S3-compatible services via endpoint)

use super::{
    BackendError, ListObjectsRequest, ObjectHead, ObjectPage, ObjectStore, ObjectSummary,
    PutObjectRequest,
};
use crate::connections::ConnectionConfig;
use async_trait::async_trait;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::{ByteStream, DateTime as AwsDateTime};
use chrono::{DateTime, Utc};
use tracing::debug;

pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    endpoint: Option<String>,
    region: String,
}

impl S3ObjectStore {
    /// Build a client from a connection configuration.
    ///
    /// Static credentials are used when both keys are present; otherwise the
    /// AWS default provider chain applies. A custom endpoint switches to
    /// path-style addressing, which MinIO and most S3-compatible services need.
    pub async fn connect(config: &ConnectionConfig) -> Self {
        use aws_config::meta::region::RegionProviderChain;
        use aws_config::Region;
        use aws_sdk_s3::config::Credentials;

        let region = config.region_or_default().to_string();

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(RegionProviderChain::first_try(Region::new(region.clone())));

        if let Some(endpoint_url) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint_url.clone());
        }

        if !config.access_key.is_empty() && !config.secret_key.is_empty() {
            let credentials = Credentials::new(
                config.access_key.clone(),
                config.secret_key.clone(),
                None,
                None,
                "slidekit",
            );
            loader = loader.credentials_provider(credentials);
        }

        let shared = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(config.endpoint_url.is_some())
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            endpoint: config.endpoint_url.clone(),
            region,
        }
    }
}

/// Codes the SDK reports when it never got far enough to receive a response
fn transport_code<E, R>(err: &SdkError<E, R>) -> &'static str {
    match err {
        SdkError::ConstructionFailure(_) => "ConstructionFailure",
        SdkError::TimeoutError(_) => "RequestTimeout",
        SdkError::DispatchFailure(_) => "DispatchFailure",
        SdkError::ResponseError(_) => "ResponseError",
        _ => "Unknown",
    }
}

/// Convert an SDK error into a backend error, keeping the service code and message
fn backend_error<E>(err: SdkError<E, HttpResponse>) -> BackendError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let status = err.raw_response().map(|response| response.status().as_u16());
    let context = DisplayErrorContext(&err).to_string();

    let code = match (err.code(), status) {
        (Some(code), _) => code.to_string(),
        (None, Some(404)) => "NotFound".to_string(),
        // Identity resolution fails before a request is sent
        (None, _) if context.to_lowercase().contains("credentials") => {
            "CredentialsNotLoaded".to_string()
        }
        (None, _) => transport_code(&err).to_string(),
    };
    let message = err
        .message()
        .map(str::to_string)
        .unwrap_or(context);

    BackendError {
        code,
        message,
        status,
    }
}

fn to_chrono(value: &AwsDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(value.secs(), value.subsec_nanos())
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(&self, request: PutObjectRequest) -> Result<(), BackendError> {
        debug!(
            "PUT s3://{}/{} ({} bytes)",
            request.bucket,
            request.key,
            request.body.len()
        );

        self.client
            .put_object()
            .bucket(request.bucket)
            .key(request.key)
            .content_type(request.content_type)
            .body(ByteStream::from(request.body))
            .set_metadata(request.metadata)
            .send()
            .await
            .map_err(backend_error)?;

        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, BackendError> {
        let result = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(backend_error)?;

        let mut body = result.body;
        let mut data = Vec::new();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| {
                BackendError::new(
                    "ResponseStreamError",
                    format!("Failed to read S3 response: {}", e),
                )
            })?;
            data.extend_from_slice(&chunk);
        }

        Ok(data)
    }

    async fn list_objects(&self, request: ListObjectsRequest) -> Result<ObjectPage, BackendError> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(request.bucket)
            .max_keys(request.max_keys)
            .set_prefix(request.prefix)
            .send()
            .await
            .map_err(backend_error)?;

        let objects = output
            .contents()
            .iter()
            .map(|object| ObjectSummary {
                key: object.key().unwrap_or_default().to_string(),
                size: object.size().unwrap_or(0),
                last_modified: object.last_modified().and_then(to_chrono),
                etag: object.e_tag().map(str::to_string),
            })
            .collect();

        Ok(ObjectPage {
            objects,
            is_truncated: output.is_truncated().unwrap_or(false),
        })
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectHead, BackendError> {
        let output = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(backend_error)?;

        Ok(ObjectHead {
            size: output.content_length().unwrap_or(0),
            last_modified: output.last_modified().and_then(to_chrono),
            content_type: output.content_type().map(str::to_string),
            etag: output.e_tag().map(str::to_string),
            metadata: output.metadata().cloned().unwrap_or_default(),
        })
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), BackendError> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(backend_error)?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!(
            "s3 endpoint='{}' region='{}'",
            self.endpoint.as_deref().unwrap_or("<aws>"),
            self.region
        )
    }
}
