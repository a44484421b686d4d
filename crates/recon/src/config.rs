use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    pub mode: ReconMode,
    pub min_committee_size: usize,
    /// Minimum similarity ratio for a directory match, in (0, 1].
    pub similarity_cutoff: f64,
    pub max_location_suggestions: usize,
    #[serde(default)]
    pub calendar: CalendarConfig,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            mode: ReconMode::Inline,
            min_committee_size: 3,
            similarity_cutoff: 0.6,
            max_location_suggestions: 3,
            calendar: CalendarConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// How unresolved locations and committee names are handled.
///
/// `Inline` is the auto-save path: it guesses (raw keyword as location,
/// "<name> 教授" for unknown members). `Strict` is the confirm-before-commit
/// tool path: anything unresolved comes back as a `ValidationError` so the
/// agent can re-ask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconMode {
    #[default]
    Inline,
    Strict,
}

impl std::fmt::Display for ReconMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inline => write!(f, "inline"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

/// Epoch-relative year display. Defaults to the Minguo calendar (1912 = 1).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub epoch_year: i32,
    pub era_label: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            epoch_year: 1911,
            era_label: "民國".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if !(self.similarity_cutoff > 0.0 && self.similarity_cutoff <= 1.0) {
            return Err(ReconError::ConfigValidation(format!(
                "similarity_cutoff must be in (0, 1], got {}",
                self.similarity_cutoff
            )));
        }

        if self.min_committee_size == 0 {
            return Err(ReconError::ConfigValidation(
                "min_committee_size must be at least 1".into(),
            ));
        }

        if self.max_location_suggestions == 0 {
            return Err(ReconError::ConfigValidation(
                "max_location_suggestions must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Same config with the mode replaced.
    pub fn with_mode(mut self, mode: ReconMode) -> Self {
        self.mode = mode;
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = ReconConfig::from_toml("").unwrap();
        assert_eq!(config.mode, ReconMode::Inline);
        assert_eq!(config.min_committee_size, 3);
        assert_eq!(config.similarity_cutoff, 0.6);
        assert_eq!(config.max_location_suggestions, 3);
        assert_eq!(config.calendar.epoch_year, 1911);
        assert_eq!(config.calendar.era_label, "民國");
    }

    #[test]
    fn parse_strict_with_overrides() {
        let config = ReconConfig::from_toml(
            r#"
mode = "strict"
min_committee_size = 5
similarity_cutoff = 0.75

[calendar]
epoch_year = 0
era_label = "西元"
"#,
        )
        .unwrap();
        assert_eq!(config.mode, ReconMode::Strict);
        assert_eq!(config.min_committee_size, 5);
        assert_eq!(config.similarity_cutoff, 0.75);
        assert_eq!(config.calendar.epoch_year, 0);
        assert_eq!(config.calendar.era_label, "西元");
    }

    #[test]
    fn reject_unknown_mode() {
        let err = ReconConfig::from_toml(r#"mode = "lenient""#).unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn reject_cutoff_out_of_range() {
        for bad in ["similarity_cutoff = 0.0", "similarity_cutoff = 1.5"] {
            let err = ReconConfig::from_toml(bad).unwrap_err();
            assert!(matches!(err, ReconError::ConfigValidation(_)), "{bad}");
        }
    }

    #[test]
    fn reject_zero_sizes() {
        assert!(ReconConfig::from_toml("min_committee_size = 0").is_err());
        assert!(ReconConfig::from_toml("max_location_suggestions = 0").is_err());
    }
}
