use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("prediction vector is empty")]
    EmptyPrediction,

    #[error("illustration not found: {0}")]
    AssetMissing(PathBuf),

    #[error("invalid label catalog {path}: {source}")]
    LabelCatalog {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
