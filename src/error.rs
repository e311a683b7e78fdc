use std::path::PathBuf;
use thiserror::Error;

/// Failure to load a bigram weight table. Always fatal for a run.
#[derive(Debug, Error)]
pub enum WeightsError {
    #[error("failed to read bigram weights from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Per-item failures during a scan. These are reported and the item skipped.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error reading {path} after {words_read} words: {source}")]
    Read {
        path: PathBuf,
        words_read: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("access error for {}: {message}", path.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "<unknown>".to_string()))]
    Walk {
        path: Option<PathBuf>,
        message: String,
    },

    #[error("worker for {path} did not complete: {message}")]
    Worker { path: PathBuf, message: String },
}

impl ScanError {
    /// Path of the item that failed, when one is known.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ScanError::Open { path, .. }
            | ScanError::Read { path, .. }
            | ScanError::Worker { path, .. } => Some(path),
            ScanError::Walk { path, .. } => path.as_ref(),
        }
    }
}

impl From<walkdir::Error> for ScanError {
    fn from(err: walkdir::Error) -> Self {
        ScanError::Walk {
            path: err.path().map(|p| p.to_path_buf()),
            message: err.to_string(),
        }
    }
}
