use std::path::PathBuf;

use thiserror::Error;

use defensebot_recon::ReconError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed settings file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("reconciliation config {}: {source}", .path.display())]
    Recon {
        path: PathBuf,
        #[source]
        source: ReconError,
    },
}
