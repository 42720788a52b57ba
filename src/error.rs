// src/error.rs
//
// Only failures on our own side end up here: the credential, the config file,
// and the files a stage owns. Remote failures never do; they are folded into
// `api::Fetch` and collapsed per call site.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("API key file {path} unusable: {reason}")]
    Credential { path: PathBuf, reason: String },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("checkpoint {path}: {reason}")]
    Checkpoint { path: PathBuf, reason: String },
}

impl HarvestError {
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        HarvestError::Io { path: path.as_ref().to_path_buf(), source }
    }
}

pub type Result<T> = std::result::Result<T, HarvestError>;
