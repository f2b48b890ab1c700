use std::path::PathBuf;

use thiserror::Error;

use stockcast_core::EngineError;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl DatasetError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
