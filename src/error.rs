use std::path::PathBuf;
use thiserror::Error;

/// Failures reading or writing the persisted dataset. Both are fatal to a run.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("dataset at {path} is unavailable")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dataset at {path} is corrupt")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
