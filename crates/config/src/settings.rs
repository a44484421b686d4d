// Application settings
// Loaded from ~/.config/defensebot/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use defensebot_recon::ReconConfig;

use crate::error::ConfigError;

/// Overrides the settings file location.
pub const CONFIG_ENV: &str = "DEFENSEBOT_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Paths
    #[serde(rename = "paths.database")]
    pub database: PathBuf,

    #[serde(rename = "paths.templateFile")]
    pub template_file: PathBuf,

    #[serde(rename = "paths.downloadsDir")]
    pub downloads_dir: PathBuf,

    // Downloads
    #[serde(rename = "downloads.baseUrl")]
    pub base_url: String,

    // Reconciliation
    #[serde(rename = "recon.configFile")]
    pub recon_config_file: Option<PathBuf>,  // None = built-in policy
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: Self::default_database_path(),
            template_file: PathBuf::from("templates/defense_template.pptx"),
            downloads_dir: PathBuf::from("downloads"),
            base_url: "http://localhost:8088/downloads".into(),
            recon_config_file: None,
        }
    }
}

impl Settings {
    /// Get the settings file path. `DEFENSEBOT_CONFIG` wins when set.
    pub fn config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("defensebot")
            .join("settings.json")
    }

    pub fn default_database_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("defensebot")
            .join("defense.db")
    }

    /// Load settings from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`. A missing file means defaults; a file that
    /// exists but does not parse is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// Parse settings JSON. Lines starting with `//` are comments.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        serde_json::from_str(&cleaned)
    }

    /// Reconciliation policy: the configured TOML file, or built-in defaults.
    pub fn recon_config(&self) -> Result<ReconConfig, ConfigError> {
        let Some(path) = &self.recon_config_file else {
            return Ok(ReconConfig::default());
        };

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        ReconConfig::from_toml(&contents).map_err(|source| ConfigError::Recon {
            path: path.clone(),
            source,
        })
    }

    /// Commented settings file with every key at its default.
    pub fn default_file_contents() -> String {
        let defaults = Self::default();
        format!(
            r#"{{
    // Where the SQLite database lives
    "paths.database": {database},

    // Announcement template and output directory
    "paths.templateFile": {template},
    "paths.downloadsDir": {downloads},

    // Public prefix for rendered files
    "downloads.baseUrl": {base_url},

    // Optional reconciliation policy (TOML); null = built-in defaults
    "recon.configFile": null
}}
"#,
            database = json_path(&defaults.database),
            template = json_path(&defaults.template_file),
            downloads = json_path(&defaults.downloads_dir),
            base_url = serde_json::Value::String(defaults.base_url.clone()),
        )
    }
}

fn json_path(path: &Path) -> serde_json::Value {
    serde_json::Value::String(path.to_string_lossy().into_owned())
}
