//! `defensebot-core`: shared types for defense announcements.
//!
//! Reference directory entries, the transient draft, the canonical record the
//! reconciliation engine produces and the payload the renderer consumes.
//! No IO dependencies.

pub mod directory;
pub mod model;

pub use directory::{Directory, MemoryDirectory};
pub use model::{
    AnnouncementData, CanonicalRecord, CommitteeInput, DefenseLocation, DraftRecord, HistoryEntry,
    NewHistoryEntry, Professor, Student,
};
