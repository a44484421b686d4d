use serde::Serialize;
use thiserror::Error;

/// Errors loading a reconciliation config.
#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (cutoff out of range, zero sizes, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
}

/// A draft that cannot become a canonical record.
///
/// Every variant carries enough detail for a conversational caller to ask a
/// corrective follow-up question. Serializes with a `reason` tag.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ValidationError {
    /// Fewer committee members than the configured minimum.
    #[error("committee has {current} member(s), {required} required ({missing} more needed)")]
    InsufficientCommittee {
        current: usize,
        required: usize,
        missing: usize,
    },
    /// Strict mode only: keyword matched several locations.
    #[error("location '{keyword}' is ambiguous, candidates: {}", .suggestions.join(", "))]
    LocationAmbiguous {
        keyword: String,
        suggestions: Vec<String>,
    },
    /// Strict mode only: keyword matched nothing.
    #[error("location '{keyword}' not found")]
    LocationNotFound { keyword: String },
    /// Strict mode only: fragments with no directory match above the cutoff.
    #[error("no directory match for: {}", .unmatched.join(", "))]
    CommitteeUnmatched {
        unmatched: Vec<String>,
        resolved: Vec<String>,
    },
}

impl ValidationError {
    pub fn insufficient(current: usize, required: usize) -> Self {
        Self::InsufficientCommittee {
            current,
            required,
            missing: required.saturating_sub(current),
        }
    }

    /// True when the caller should re-prompt the user rather than give up.
    pub fn needs_clarification(&self) -> bool {
        !matches!(self, Self::InsufficientCommittee { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_carries_deficit() {
        let err = ValidationError::insufficient(1, 3);
        assert_eq!(
            err,
            ValidationError::InsufficientCommittee { current: 1, required: 3, missing: 2 }
        );
        assert_eq!(err.to_string(), "committee has 1 member(s), 3 required (2 more needed)");
        assert!(!err.needs_clarification());
    }

    #[test]
    fn serializes_with_reason_tag() {
        let err = ValidationError::LocationAmbiguous {
            keyword: "T2".into(),
            suggestions: vec!["A".into(), "B".into()],
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["reason"], "location_ambiguous");
        assert_eq!(json["suggestions"][1], "B");
        assert!(err.needs_clarification());
    }
}
