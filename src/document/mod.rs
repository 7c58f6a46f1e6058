//! Presentation documents as opaque serializable handles
//!
//! The transfer layer only needs a narrow capability set from a document:
//! turn it into bytes, build it back from bytes, and report slide count and
//! first-slide title. Everything else stays on the concrete type.

pub mod package;
pub mod presentation;

pub use presentation::{
    CoreProperties, CorePropertiesUpdate, Presentation, PresentationInfo, Slide, SlideSize,
    TemplateInfo,
};

use thiserror::Error;

/// MIME type of an OOXML presentation (.pptx)
pub const PRESENTATION_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Invalid presentation package: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Malformed XML in '{part}': {message}")]
    Xml { part: String, message: String },

    #[error("Presentation package is missing part '{0}'")]
    MissingPart(String),

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Capability set required to move a document through object storage
pub trait Document: Sized {
    /// Content type sent with the serialized bytes
    const CONTENT_TYPE: &'static str;

    /// Serialize into an in-memory buffer
    fn to_bytes(&self) -> Result<Vec<u8>, DocumentError>;

    /// Deserialize from an in-memory buffer
    fn from_bytes(bytes: &[u8]) -> Result<Self, DocumentError>;

    fn slide_count(&self) -> usize;

    /// Title text of the first slide, if any
    fn title(&self) -> Option<&str>;
}

impl Document for Presentation {
    const CONTENT_TYPE: &'static str = PRESENTATION_CONTENT_TYPE;

    fn to_bytes(&self) -> Result<Vec<u8>, DocumentError> {
        package::write_package(self)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, DocumentError> {
        package::read_package(bytes)
    }

    fn slide_count(&self) -> usize {
        self.slides().len()
    }

    fn title(&self) -> Option<&str> {
        self.slides().first().and_then(|slide| slide.title.as_deref())
    }
}
