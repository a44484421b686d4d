use serde::Serialize;

use defensebot_core::Directory;

use crate::config::ReconMode;
use crate::error::ValidationError;

/// What a location keyword resolves to, before any mode policy is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LocationOutcome {
    Resolved {
        location_id: String,
        full_name: String,
    },
    Ambiguous {
        keyword: String,
        /// Full names of the first few candidates, directory order.
        suggestions: Vec<String>,
    },
    NotFound {
        keyword: String,
    },
}

/// Look a keyword up against room code, building name and full name.
pub fn lookup_location(
    directory: &dyn Directory,
    keyword: &str,
    max_suggestions: usize,
) -> LocationOutcome {
    if keyword.trim().is_empty() {
        return LocationOutcome::NotFound { keyword: keyword.to_string() };
    }
    let hits = directory.find_locations_by_keyword(keyword);
    match hits.as_slice() {
        [] => LocationOutcome::NotFound { keyword: keyword.to_string() },
        [only] => LocationOutcome::Resolved {
            location_id: only.id.clone(),
            full_name: only.full_name.clone(),
        },
        many => LocationOutcome::Ambiguous {
            keyword: keyword.to_string(),
            suggestions: many
                .iter()
                .take(max_suggestions)
                .map(|l| l.full_name.clone())
                .collect(),
        },
    }
}

/// Location text for the canonical record.
///
/// Inline mode keeps the raw keyword whenever there is not exactly one match.
/// Strict mode turns those cases into errors.
pub fn resolve_location(
    directory: &dyn Directory,
    keyword: &str,
    mode: ReconMode,
    max_suggestions: usize,
) -> Result<String, ValidationError> {
    match lookup_location(directory, keyword, max_suggestions) {
        LocationOutcome::Resolved { full_name, .. } => Ok(full_name),
        LocationOutcome::Ambiguous { keyword, suggestions } => match mode {
            ReconMode::Inline => {
                tracing::debug!(%keyword, candidates = suggestions.len(), "ambiguous location, keeping keyword");
                Ok(keyword)
            }
            ReconMode::Strict => Err(ValidationError::LocationAmbiguous { keyword, suggestions }),
        },
        LocationOutcome::NotFound { keyword } => match mode {
            ReconMode::Inline => {
                tracing::debug!(%keyword, "unknown location, keeping keyword");
                Ok(keyword)
            }
            ReconMode::Strict => Err(ValidationError::LocationNotFound { keyword }),
        },
    }
}
