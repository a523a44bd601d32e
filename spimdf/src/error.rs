use std::path::PathBuf;

use spimcore::error::SpimError;
use thiserror::Error;

/// Errors raised while loading a dataset or running a workflow on it.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse dataset document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid dataset: {0}")]
    Invalid(String),

    #[error("unknown channel id {0}")]
    UnknownChannel(u32),

    #[error("label '{label}' is not available for channel '{channel}'")]
    UnknownLabel { channel: String, label: String },

    #[error(transparent)]
    Selection(#[from] SpimError),
}

pub type Result<T> = std::result::Result<T, DatasetError>;
