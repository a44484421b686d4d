//! `defensebot-render`: renders an announcement into a presentation.
//!
//! Loads a single-slide PPTX template, substitutes `{{token}}` placeholders
//! and writes a new artifact. Trusts its input verbatim; no reconciliation
//! policy lives here.

pub mod error;
pub mod placeholders;
pub mod pptx;
pub mod reassemble;
pub mod renderer;

pub use error::RenderError;
pub use placeholders::Placeholders;
pub use renderer::{artifact_filename, ArtifactHandle, Renderer};
