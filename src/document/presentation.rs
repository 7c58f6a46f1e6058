//! In-memory presentation model

use super::{Document, DocumentError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// English Metric Units per inch
pub const EMU_PER_INCH: f64 = 914_400.0;

fn inches(value: f64) -> i64 {
    (value * EMU_PER_INCH) as i64
}

/// Slide dimensions in EMU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideSize {
    pub width: i64,
    pub height: i64,
}

impl SlideSize {
    /// Resolve a named aspect ratio ("4:3", "16:9", "16:10", "a4").
    /// Unknown names fall back to 16:9.
    pub fn for_aspect_ratio(aspect_ratio: &str) -> (Self, &'static str) {
        match aspect_ratio.trim().to_lowercase().as_str() {
            "4:3" => (
                Self {
                    width: inches(10.0),
                    height: inches(7.5),
                },
                "Standard (4:3)",
            ),
            "16:10" => (
                Self {
                    width: inches(10.0),
                    height: inches(6.25),
                },
                "Widescreen (16:10)",
            ),
            "a4" => (
                Self {
                    width: inches(10.833),
                    height: inches(7.5),
                },
                "A4 Paper",
            ),
            _ => (
                Self {
                    width: inches(13.333),
                    height: inches(7.5),
                },
                "Widescreen (16:9)",
            ),
        }
    }
}

impl Default for SlideSize {
    fn default() -> Self {
        Self::for_aspect_ratio("16:9").0
    }
}

/// Core document properties (docProps/core.xml)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreProperties {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub author: Option<String>,
    pub keywords: Option<String>,
    pub comments: Option<String>,
    pub last_modified_by: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
}

/// Partial update of core properties; `None` fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorePropertiesUpdate {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub author: Option<String>,
    pub keywords: Option<String>,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub title: Option<String>,
    pub body: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Presentation {
    slide_size: SlideSize,
    slides: Vec<Slide>,
    core: CoreProperties,
}

/// Summary returned by `get_presentation_info`
#[derive(Debug, Clone, Serialize)]
pub struct PresentationInfo {
    pub slide_count: usize,
    pub slide_width: i64,
    pub slide_height: i64,
    pub slide_titles: Vec<Option<String>>,
    pub core_properties: CoreProperties,
}

/// Summary returned by `get_template_info`
#[derive(Debug, Clone, Serialize)]
pub struct TemplateInfo {
    pub template_path: String,
    pub file_size_bytes: u64,
    pub slide_count: usize,
    pub core_properties: CoreProperties,
}

impl Default for Presentation {
    fn default() -> Self {
        Self::new("16:9")
    }
}

impl Presentation {
    /// Create an empty presentation with the given aspect ratio
    pub fn new(aspect_ratio: &str) -> Self {
        let (slide_size, _) = SlideSize::for_aspect_ratio(aspect_ratio);
        let now = Utc::now();
        Self {
            slide_size,
            slides: Vec::new(),
            core: CoreProperties {
                created: Some(now),
                modified: Some(now),
                ..Default::default()
            },
        }
    }

    pub(crate) fn from_parts(
        slide_size: SlideSize,
        slides: Vec<Slide>,
        core: CoreProperties,
    ) -> Self {
        Self {
            slide_size,
            slides,
            core,
        }
    }

    pub fn slide_size(&self) -> SlideSize {
        self.slide_size
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn core_properties(&self) -> &CoreProperties {
        &self.core
    }

    /// Append a slide and return its index
    pub fn add_slide(&mut self, title: Option<String>, body: Vec<String>) -> usize {
        self.slides.push(Slide { title, body });
        self.slides.len() - 1
    }

    pub fn set_core_properties(&mut self, update: CorePropertiesUpdate) {
        if let Some(title) = update.title {
            self.core.title = Some(title);
        }
        if let Some(subject) = update.subject {
            self.core.subject = Some(subject);
        }
        if let Some(author) = update.author {
            self.core.author = Some(author);
        }
        if let Some(keywords) = update.keywords {
            self.core.keywords = Some(keywords);
        }
        if let Some(comments) = update.comments {
            self.core.comments = Some(comments);
        }
        self.core.modified = Some(Utc::now());
    }

    pub fn info(&self) -> PresentationInfo {
        PresentationInfo {
            slide_count: self.slides.len(),
            slide_width: self.slide_size.width,
            slide_height: self.slide_size.height,
            slide_titles: self.slides.iter().map(|s| s.title.clone()).collect(),
            core_properties: self.core.clone(),
        }
    }

    /// Open a presentation file
    pub async fn open(path: &Path) -> Result<Self, DocumentError> {
        let bytes = tokio::fs::read(path).await?;
        debug!("Read {} bytes from {}", bytes.len(), path.display());
        Self::from_bytes(&bytes)
    }

    /// Save to a file, creating parent directories as needed
    pub async fn save(&self, path: &Path) -> Result<u64, DocumentError> {
        let bytes = self.to_bytes()?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, &bytes).await?;
        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(bytes.len() as u64)
    }

    /// Load a presentation from a .pptx or .potx template file
    pub async fn from_template(path: &Path) -> Result<Self, DocumentError> {
        check_template_path(path)?;
        Self::open(path).await.map_err(|e| {
            DocumentError::InvalidTemplate(format!(
                "Failed to load template file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Inspect a template file without adding it to a session
    pub async fn template_info(path: &Path) -> Result<TemplateInfo, DocumentError> {
        check_template_path(path)?;
        let metadata = tokio::fs::metadata(path).await?;
        let presentation = Self::open(path).await?;

        Ok(TemplateInfo {
            template_path: path.display().to_string(),
            file_size_bytes: metadata.len(),
            slide_count: presentation.slides.len(),
            core_properties: presentation.core,
        })
    }
}

fn check_template_path(path: &Path) -> Result<(), DocumentError> {
    if !path.exists() {
        return Err(DocumentError::InvalidTemplate(format!(
            "Template file not found: {}",
            path.display()
        )));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("pptx") | Some("potx") => Ok(()),
        _ => Err(DocumentError::InvalidTemplate(
            "Template file must be a .pptx or .potx file".to_string(),
        )),
    }
}
