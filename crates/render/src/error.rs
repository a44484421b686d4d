use std::path::PathBuf;

use thiserror::Error;

/// Rendering errors. Everything except `TemplateNotFound` is a render
/// failure of the artifact itself; none of them leave a file behind.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The configured template file does not exist.
    #[error("template not found: {}", .path.display())]
    TemplateNotFound { path: PathBuf },
    /// The template opened but is not a usable presentation.
    #[error("invalid template: {0}")]
    InvalidTemplate(String),
    #[error("render failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("render failed: archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("render failed: XML error: {0}")]
    Xml(String),
}

impl RenderError {
    pub fn is_template_missing(&self) -> bool {
        matches!(self, Self::TemplateNotFound { .. })
    }
}
