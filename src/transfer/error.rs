//! Transfer error taxonomy

use crate::document::DocumentError;
use crate::storage::BackendError;
use serde::Serialize;
use thiserror::Error;

/// Codes a backend uses when it rejects the caller's identity
const CREDENTIAL_CODES: &[&str] = &[
    "InvalidAccessKeyId",
    "SignatureDoesNotMatch",
    "ExpiredToken",
    "InvalidToken",
    "TokenRefreshRequired",
    "InvalidClientTokenId",
    "CredentialsNotLoaded",
];

/// Codes a backend uses for an absent object or bucket
const NOT_FOUND_CODES: &[&str] = &["NoSuchKey", "NoSuchBucket", "NotFound", "404"];

/// Error kinds callers can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    PathTraversal,
    CredentialError,
    NotFound,
    TransferError,
    ConnectionNotConfigured,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::PathTraversal => "PathTraversal",
            ErrorKind::CredentialError => "CredentialError",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::TransferError => "TransferError",
            ErrorKind::ConnectionNotConfigured => "ConnectionNotConfigured",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Invalid S3 credentials ({code}): {message}")]
    Credential { code: String, message: String },

    #[error("{}", not_found_message(.code, .bucket, .key.as_deref()))]
    NotFound {
        code: String,
        bucket: String,
        key: Option<String>,
    },

    #[error("S3 {operation} failed ({code}): {message}")]
    Backend {
        operation: &'static str,
        code: String,
        message: String,
    },

    #[error("S3 connection '{name}' not found. Please configure it first using configure_s3_connection.")]
    ConnectionNotConfigured { name: String },

    #[error("Presentation could not be processed: {0}")]
    Document(#[from] DocumentError),
}

fn not_found_message(code: &str, bucket: &str, key: Option<&str>) -> String {
    match key {
        Some(key) if code != "NoSuchBucket" => {
            format!("Object not found: s3://{}/{}", bucket, key)
        }
        _ => format!("Bucket not found: {}", bucket),
    }
}

impl TransferError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransferError::Credential { .. } => ErrorKind::CredentialError,
            TransferError::NotFound { .. } => ErrorKind::NotFound,
            TransferError::ConnectionNotConfigured { .. } => ErrorKind::ConnectionNotConfigured,
            TransferError::Backend { .. } | TransferError::Document(_) => {
                ErrorKind::TransferError
            }
        }
    }

    /// Backend error code, when the failure came from the backend
    pub fn code(&self) -> Option<&str> {
        match self {
            TransferError::Credential { code, .. }
            | TransferError::NotFound { code, .. }
            | TransferError::Backend { code, .. } => Some(code),
            _ => None,
        }
    }
}

pub(crate) fn is_not_found(err: &BackendError) -> bool {
    NOT_FOUND_CODES.contains(&err.code.as_str())
}

pub(crate) fn is_credential_failure(err: &BackendError) -> bool {
    CREDENTIAL_CODES.contains(&err.code.as_str())
}

/// Translate a backend error for an operation on `bucket`/`key`.
///
/// `not_found_is_absence` controls whether not-found codes become
/// [`TransferError::NotFound`]; operations that never report absence get a
/// generic backend error instead.
pub(crate) fn classify(
    operation: &'static str,
    err: BackendError,
    bucket: &str,
    key: Option<&str>,
    not_found_is_absence: bool,
) -> TransferError {
    if is_credential_failure(&err) {
        return TransferError::Credential {
            code: err.code,
            message: err.message,
        };
    }

    if not_found_is_absence && is_not_found(&err) {
        return TransferError::NotFound {
            code: err.code,
            bucket: bucket.to_string(),
            key: key.map(str::to_string),
        };
    }

    TransferError::Backend {
        operation,
        code: err.code,
        message: err.message,
    }
}
