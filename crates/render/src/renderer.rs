use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use defensebot_core::AnnouncementData;

use crate::error::RenderError;
use crate::placeholders::Placeholders;
use crate::pptx;

/// Indent placed before every committee line.
pub const COMMITTEE_INDENT: &str = "    ";

/// A rendered announcement on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactHandle {
    pub filename: String,
    pub path: PathBuf,
}

impl ArtifactHandle {
    /// Public URL under `base_url`, which may or may not end in `/`.
    pub fn url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.filename)
    }
}

/// `defense_<student>_<record>.pptx`. Characters outside `[A-Za-z0-9_-]`
/// in the student id become `_` so the name cannot escape the output dir.
pub fn artifact_filename(student_id: &str, record_id: i64) -> String {
    let safe: String = student_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("defense_{}_{}.pptx", safe, record_id)
}

/// Renders announcements from one template into one output directory.
#[derive(Debug, Clone)]
pub struct Renderer {
    template_path: PathBuf,
    output_dir: PathBuf,
    committee_indent: String,
}

impl Renderer {
    pub fn new(template_path: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            template_path: template_path.into(),
            output_dir: output_dir.into(),
            committee_indent: COMMITTEE_INDENT.to_string(),
        }
    }

    pub fn with_committee_indent(mut self, indent: impl Into<String>) -> Self {
        self.committee_indent = indent.into();
        self
    }

    /// Render `data` for history record `record_id`.
    ///
    /// The artifact is written to a `.partial` sibling and renamed into
    /// place, so a failed render never leaves a truncated file under the
    /// final name. Rendering the same record twice overwrites.
    pub fn render(&self, data: &AnnouncementData, record_id: i64) -> Result<ArtifactHandle, RenderError> {
        let placeholders = Placeholders::from_announcement(data, &self.committee_indent);

        let template = File::open(&self.template_path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => RenderError::TemplateNotFound {
                path: self.template_path.clone(),
            },
            _ => RenderError::Io(e),
        })?;
        let mut archive = ZipArchive::new(template).map_err(|e| {
            RenderError::InvalidTemplate(format!("{}: {}", self.template_path.display(), e))
        })?;

        fs::create_dir_all(&self.output_dir)?;
        let filename = artifact_filename(&data.student_id, record_id);
        let path = self.output_dir.join(&filename);
        let partial = self.output_dir.join(format!("{}.partial", filename));

        let written = write_partial(&mut archive, &partial, &placeholders)
            .and_then(|paragraphs| fs::rename(&partial, &path).map(|_| paragraphs).map_err(RenderError::from));

        let paragraphs = match written {
            Ok(n) => n,
            Err(e) => {
                let _ = fs::remove_file(&partial);
                return Err(e);
            }
        };

        if paragraphs == 0 {
            tracing::warn!(template = %self.template_path.display(), "template has no placeholders");
        }
        tracing::info!(path = %path.display(), paragraphs, "announcement rendered");

        Ok(ArtifactHandle { filename, path })
    }
}

fn write_partial(
    archive: &mut ZipArchive<File>,
    partial: &Path,
    placeholders: &Placeholders,
) -> Result<usize, RenderError> {
    let out = BufWriter::new(File::create(partial)?);
    pptx::render_presentation(archive, out, placeholders)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_embeds_student_and_record() {
        assert_eq!(artifact_filename("M11402165", 7), "defense_M11402165_7.pptx");
    }

    #[test]
    fn filename_neutralizes_path_characters() {
        assert_eq!(artifact_filename("../etc/x", 1), "defense____etc_x_1.pptx");
    }

    #[test]
    fn url_joins_with_single_slash() {
        let handle = ArtifactHandle {
            filename: "defense_M1_1.pptx".into(),
            path: PathBuf::from("downloads/defense_M1_1.pptx"),
        };
        assert_eq!(handle.url("http://localhost:8088/downloads/"), "http://localhost:8088/downloads/defense_M1_1.pptx");
        assert_eq!(handle.url("http://localhost:8088/downloads"), "http://localhost:8088/downloads/defense_M1_1.pptx");
    }
}
