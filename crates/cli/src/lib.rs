//! `defensebot-cli` library half: the request-layer workflow behind the
//! `defbot` binary, usable from other front ends.

pub mod workflow;

pub use workflow::{
    generate_announcement, lookup_student, save_draft, search_location, search_professor,
    GeneratedAnnouncement, SavedDraft, StudentSummary, WorkflowError,
};
