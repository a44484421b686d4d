//! Request layer: the operations an agent (or the CLI) performs.
//!
//! Reconciliation and rendering stay pure; this module is the only place
//! that reads the store, decides what to persist and wires the renderer's
//! output back into history.

use serde::Serialize;
use thiserror::Error;

use defensebot_core::{AnnouncementData, CanonicalRecord, Directory, DraftRecord, NewHistoryEntry, Student};
use defensebot_recon::{
    lookup_location, reconcile, search_professors, LocationOutcome, NameMatcher, ProfessorCandidate,
    ReconConfig, SequenceRatio, ValidationError,
};
use defensebot_render::{ArtifactHandle, RenderError, Renderer};
use defensebot_store::{Store, StoreError};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("student '{0}' not found")]
    UnknownStudent(String),
    #[error("no saved defense record for student '{0}'")]
    NoHistory(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

// ----------------------------------------------------------------------------
// Lookup tools
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentSummary {
    pub student_id: String,
    pub student_name: String,
    pub thesis_title_zh: String,
    pub thesis_title_en: String,
    pub advisor_full_text: String,
}

impl From<&Student> for StudentSummary {
    fn from(s: &Student) -> Self {
        Self {
            student_id: s.id.clone(),
            student_name: s.name.clone(),
            thesis_title_zh: s.thesis_title_zh.clone(),
            thesis_title_en: s.thesis_title_en.clone(),
            advisor_full_text: s.advisor_full_text(),
        }
    }
}

/// Students matching an id or name fragment.
pub fn lookup_student(store: &Store, query: &str) -> Result<Vec<StudentSummary>, WorkflowError> {
    let students = store.lookup_students(query)?;
    Ok(students.iter().map(StudentSummary::from).collect())
}

/// Professor candidates scored 0-100 against `query`.
pub fn search_professor(
    directory: &dyn Directory,
    config: &ReconConfig,
    query: &str,
    threshold: u8,
) -> Vec<ProfessorCandidate> {
    let matcher = NameMatcher::new(Box::new(SequenceRatio), config.similarity_cutoff);
    search_professors(directory, query, threshold, &matcher)
}

/// Confirm a location keyword: resolved, ambiguous with suggestions, or
/// not found. Independent of the reconciliation mode.
pub fn search_location(directory: &dyn Directory, config: &ReconConfig, keyword: &str) -> LocationOutcome {
    lookup_location(directory, keyword, config.max_location_suggestions)
}

// ----------------------------------------------------------------------------
// Save
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedDraft {
    pub log_id: i64,
    #[serde(flatten)]
    pub record: CanonicalRecord,
}

/// Reconcile `draft` for `student_id` and persist the canonical record.
///
/// Nothing is written unless reconciliation succeeds.
pub fn save_draft(
    store: &Store,
    directory: &dyn Directory,
    config: &ReconConfig,
    student_id: &str,
    draft: &DraftRecord,
) -> Result<SavedDraft, WorkflowError> {
    let student = store
        .find_student(student_id)?
        .ok_or_else(|| WorkflowError::UnknownStudent(student_id.to_string()))?;

    let record = match reconcile(config, draft, &student, directory) {
        Ok(record) => record,
        Err(err) => {
            tracing::info!(student = %student_id, error = %err, "draft rejected");
            return Err(err.into());
        }
    };

    let log_id = store.create_history(&NewHistoryEntry::from_record(&student.id, &record))?;
    tracing::info!(student = %student_id, log_id, "draft saved");
    Ok(SavedDraft { log_id, record })
}

// ----------------------------------------------------------------------------
// Generate
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedAnnouncement {
    pub log_id: i64,
    pub filename: String,
    pub download_url: String,
}

/// Render the student's latest saved record and attach the download URL
/// to it.
pub fn generate_announcement(
    store: &Store,
    renderer: &Renderer,
    student_id: &str,
    base_url: &str,
) -> Result<(GeneratedAnnouncement, ArtifactHandle), WorkflowError> {
    let student = store
        .find_student(student_id)?
        .ok_or_else(|| WorkflowError::UnknownStudent(student_id.to_string()))?;
    let entry = store
        .latest_history(student_id)?
        .ok_or_else(|| WorkflowError::NoHistory(student_id.to_string()))?;

    let data = AnnouncementData::new(&student, &entry.to_record());
    let handle = renderer.render(&data, entry.log_id)?;
    let download_url = handle.url(base_url);
    if let Err(err) = store.set_artifact(entry.log_id, &download_url) {
        // no history row points at it, so it must not stay downloadable
        if let Err(e) = std::fs::remove_file(&handle.path) {
            tracing::warn!(path = %handle.path.display(), error = %e, "failed to remove orphaned artifact");
        }
        return Err(err.into());
    }

    Ok((
        GeneratedAnnouncement {
            log_id: entry.log_id,
            filename: handle.filename.clone(),
            download_url,
        },
        handle,
    ))
}
