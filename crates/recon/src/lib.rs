//! `defensebot-recon`: reconciliation of defense drafts.
//!
//! Pure engine crate: receives a draft, the student and read-only directories,
//! returns a canonical record or a structured validation error.
//! No CLI or IO dependencies.

pub mod committee;
pub mod config;
pub mod date;
pub mod engine;
pub mod error;
pub mod location;
pub mod search;
pub mod similarity;

pub use config::{ReconConfig, ReconMode};
pub use engine::{reconcile, Reconciler};
pub use error::{ReconError, ValidationError};
pub use location::{lookup_location, LocationOutcome};
pub use search::{search_professors, ProfessorCandidate};
pub use similarity::{NameMatcher, SequenceRatio, Similarity};
